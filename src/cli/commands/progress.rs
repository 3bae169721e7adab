use anyhow::Context;
use clap::Args;
use reqwest::StatusCode;
use serde_json::Value;
use std::io::Read;

use crate::cli::{utils, OutputFormat};
use crate::progress::{GroupedProgress, LevelEntry};

#[derive(Args, Debug)]
pub struct RemoteArgs {
    #[arg(long, default_value = "http://localhost:3000", help = "Base URL of a running server")]
    pub server: String,

    #[arg(long, help = "Bearer token to authenticate with")]
    pub token: String,
}

impl RemoteArgs {
    fn progress_url(&self) -> String {
        format!("{}/api/progress", self.server.trim_end_matches('/'))
    }
}

/// Read one record from stdin and POST it
pub async fn submit(args: RemoteArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read record from stdin")?;
    let record: Value = serde_json::from_str(&input).context("stdin is not valid JSON")?;

    let response = reqwest::Client::new()
        .post(args.progress_url())
        .bearer_auth(&args.token)
        .json(&record)
        .send()
        .await
        .with_context(|| format!("failed to reach {}", args.server))?;

    let status = response.status();
    let body: Value = response.json().await.context("server returned a non-JSON body")?;

    if status != StatusCode::CREATED {
        return fail(&output_format, status, &body);
    }

    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Academic progress recorded");
    utils::output_success(&output_format, message, Some(body.clone()))
}

/// GET the grouped view and print it
pub async fn show(args: RemoteArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let response = reqwest::Client::new()
        .get(args.progress_url())
        .bearer_auth(&args.token)
        .send()
        .await
        .with_context(|| format!("failed to reach {}", args.server))?;

    let status = response.status();
    let body: Value = response.json().await.context("server returned a non-JSON body")?;

    if status != StatusCode::OK {
        return fail(&output_format, status, &body);
    }

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&body)?),
        OutputFormat::Text => {
            let grouped: GroupedProgress =
                serde_json::from_value(body).context("unexpected progress payload")?;
            print!("{}", render_text(&grouped));
        }
    }
    Ok(())
}

fn fail(output_format: &OutputFormat, status: StatusCode, body: &Value) -> anyhow::Result<()> {
    let message = body
        .get("error")
        .and_then(Value::as_str)
        .unwrap_or("request failed");
    let code = body.get("code").and_then(Value::as_str);

    utils::output_error(output_format, message, code)?;
    anyhow::bail!("server responded with {}", status)
}

fn render_text(grouped: &GroupedProgress) -> String {
    let mut out = format!("Student {} (tenant {})\n", grouped.user_id, grouped.tenant_id);
    for (level, entry) in &grouped.academic_progress {
        match entry {
            LevelEntry::Empty(message) => out.push_str(&format!("Level {:>2}: {}\n", level, message)),
            LevelEntry::Courses(courses) => {
                out.push_str(&format!("Level {:>2}:\n", level));
                for course in courses {
                    out.push_str(&format!(
                        "  {} {} | credits {} | grade {} | {} | {}\n",
                        course.course_id,
                        course.course_name,
                        course.credits,
                        course.grade,
                        course.status,
                        course.period
                    ));
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{group_by_level, ProgressRecord};
    use serde_json::json;

    #[test]
    fn progress_url_strips_trailing_slash() {
        let args = RemoteArgs {
            server: "http://localhost:3000/".to_string(),
            token: "t".to_string(),
        };
        assert_eq!(args.progress_url(), "http://localhost:3000/api/progress");
    }

    #[test]
    fn renders_levels_in_order() {
        let record = ProgressRecord {
            tenant_id: "t1".to_string(),
            user_id: "u1".to_string(),
            level: 3,
            course_id: "C101".to_string(),
            course_name: "Algebra".to_string(),
            credits: 4.0,
            grade: json!(85),
            status: "completed".to_string(),
            period: "2024-1".to_string(),
        };
        let grouped = GroupedProgress {
            tenant_id: "t1".to_string(),
            user_id: "u1".to_string(),
            academic_progress: group_by_level(vec![record]),
        };

        let text = render_text(&grouped);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 12);
        assert!(lines[3].starts_with("Level  3:"));
        assert!(lines[4].contains("C101 Algebra"));
        assert!(lines[11].starts_with("Level 10:"));
    }
}
