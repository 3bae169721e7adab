//! Academic progress records and the two pipelines built on them.

pub mod payload;
pub mod reader;
pub mod writer;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::ops::RangeInclusive;

pub use payload::{parse_submission, PayloadError, REQUIRED_FIELDS};
pub use reader::{group_by_level, read_progress, GroupedProgress, LevelEntry};
pub use writer::submit_progress;

/// Curriculum levels tracked per student
pub const LEVELS: RangeInclusive<i64> = 1..=10;

/// Placed in a level slot that holds no courses
pub const EMPTY_LEVEL_MESSAGE: &str = "student has not taken a course at this level";

/// One course taken by one student. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub tenant_id: String,
    pub user_id: String,
    pub level: i64,
    pub course_id: String,
    pub course_name: String,
    pub credits: f64,
    /// Numeric or categorical; zero and `false` are real grades
    pub grade: Value,
    pub status: String,
    pub period: String,
}

/// Per-course projection returned by the reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSummary {
    pub course_id: String,
    pub course_name: String,
    pub credits: f64,
    pub grade: Value,
    pub status: String,
    pub period: String,
}

pub fn partition_key(tenant_id: &str, user_id: &str) -> String {
    format!("{}#{}", tenant_id, user_id)
}

pub fn sort_key(level: i64, course_id: &str) -> String {
    format!("{}#{}", level, course_id)
}

impl ProgressRecord {
    pub fn partition_key(&self) -> String {
        partition_key(&self.tenant_id, &self.user_id)
    }

    pub fn sort_key(&self) -> String {
        sort_key(self.level, &self.course_id)
    }

    pub fn summary(&self) -> CourseSummary {
        CourseSummary {
            course_id: self.course_id.clone(),
            course_name: self.course_name.clone(),
            credits: self.credits,
            grade: self.grade.clone(),
            status: self.status.clone(),
            period: self.period.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn composite_keys_join_with_hash() {
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

        assert_eq!(record.partition_key(), "t1#u1");
        assert_eq!(record.sort_key(), "3#C101");
        assert_eq!(record.summary().course_id, "C101");
    }
}
