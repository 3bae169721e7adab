/// Shared types used across the codebase

use axum::http::Method;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request pipelines exposed by the service.
/// Used as the `operation` field on every log line a pipeline emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    SubmitProgress,
    ReadProgress,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::SubmitProgress => "submit_progress",
            Operation::ReadProgress => "read_progress",
        }
    }

    /// Pipeline served by a method on the progress resource
    pub fn for_method(method: &Method) -> Option<Self> {
        match *method {
            Method::POST => Some(Operation::SubmitProgress),
            Method::GET => Some(Operation::ReadProgress),
            _ => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
