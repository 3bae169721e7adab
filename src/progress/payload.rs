use serde_json::{Map, Value};
use thiserror::Error;

use super::{ProgressRecord, LEVELS};

/// Every field a submission must carry
pub const REQUIRED_FIELDS: [&str; 9] = [
    "tenant_id",
    "user_id",
    "level",
    "course_id",
    "course_name",
    "credits",
    "grade",
    "status",
    "period",
];

#[derive(Debug, Error, PartialEq)]
pub enum PayloadError {
    #[error("Request body is not valid JSON: {0}")]
    Malformed(String),

    #[error("Request body must be a JSON object")]
    NotAnObject,

    /// Carries the fields that were actually missing, for logging
    #[error("Missing required fields: {}", REQUIRED_FIELDS.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Field '{field}' must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Field 'level' must be between 1 and 10, got {0}")]
    LevelOutOfRange(i64),
}

impl PayloadError {
    /// Missing or ill-typed fields are the caller's fault; a body that is not
    /// a JSON object at all is treated as an unexpected shape.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, PayloadError::Malformed(_) | PayloadError::NotAnObject)
    }
}

/// Parse and validate a raw submission body
pub fn parse_submission(body: &[u8]) -> Result<ProgressRecord, PayloadError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| PayloadError::Malformed(e.to_string()))?;

    // Some gateways forward the body as a JSON string holding the object
    let value = match value {
        Value::String(encoded) => {
            serde_json::from_str(&encoded).map_err(|e| PayloadError::Malformed(e.to_string()))?
        }
        other => other,
    };

    let fields = match value {
        Value::Object(map) => map,
        _ => return Err(PayloadError::NotAnObject),
    };

    check_required(&fields)?;

    let level = whole_number(&fields["level"])
        .ok_or(PayloadError::InvalidField { field: "level", expected: "an integer" })?;
    if !LEVELS.contains(&level) {
        return Err(PayloadError::LevelOutOfRange(level));
    }

    let credits = fields["credits"]
        .as_f64()
        .ok_or(PayloadError::InvalidField { field: "credits", expected: "a number" })?;

    let grade = fields["grade"].clone();
    if !matches!(grade, Value::Number(_) | Value::String(_) | Value::Bool(_)) {
        return Err(PayloadError::InvalidField {
            field: "grade",
            expected: "a number, string or boolean",
        });
    }

    Ok(ProgressRecord {
        tenant_id: string_field(&fields, "tenant_id")?,
        user_id: string_field(&fields, "user_id")?,
        level,
        course_id: string_field(&fields, "course_id")?,
        course_name: string_field(&fields, "course_name")?,
        credits,
        grade,
        status: string_field(&fields, "status")?,
        period: string_field(&fields, "period")?,
    })
}

fn check_required(fields: &Map<String, Value>) -> Result<(), PayloadError> {
    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|name| match fields.get(*name) {
            None | Some(Value::Null) => true,
            // grade only has to be present
            Some(_) if *name == "grade" => false,
            Some(value) => is_falsy(value),
        })
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PayloadError::MissingFields(missing))
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Integers, including whole-valued floats such as `3.0`
fn whole_number(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

fn string_field(fields: &Map<String, Value>, name: &'static str) -> Result<String, PayloadError> {
    fields[name]
        .as_str()
        .map(str::to_string)
        .ok_or(PayloadError::InvalidField { field: name, expected: "a string" })
}
