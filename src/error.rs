// HTTP API Error Types
use axum::response::IntoResponse;
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::database::StoreError;
use crate::middleware::response::ResponseFrame;
use crate::progress::PayloadError;

/// Outcome kinds a pipeline can fail with.
///
/// The first four carry user-facing messages; the last two always carry a
/// generic message and the real cause is only logged.
#[derive(Debug)]
pub enum ApiError {
    // 401 Unauthorized
    Unauthenticated(String),

    // 400 Bad Request
    InvalidInput(String),

    // 403 Forbidden
    Forbidden(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error (store failures)
    StorageUnavailable(String),

    // 500 Internal Server Error
    InternalError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Unauthenticated(_) => 401,
            ApiError::InvalidInput(_) => 400,
            ApiError::Forbidden(_) => 403,
            ApiError::Conflict(_) => 409,
            ApiError::StorageUnavailable(_) => 500,
            ApiError::InternalError(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Unauthenticated(msg) => msg,
            ApiError::InvalidInput(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::StorageUnavailable(msg) => msg,
            ApiError::InternalError(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::StorageUnavailable(_) => "STORAGE_UNAVAILABLE",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        ApiError::Unauthenticated(message.into())
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        ApiError::InvalidInput(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        ApiError::StorageUnavailable(message.into())
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        ApiError::InternalError(message.into())
    }
}

// Convert other error types to ApiError
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::unauthenticated(err.user_message())
    }
}

impl From<PayloadError> for ApiError {
    fn from(err: PayloadError) -> Self {
        if err.is_client_error() {
            ApiError::invalid_input(err.to_string())
        } else {
            // Body could not be read as an object at all
            ApiError::internal_error("Failed to process request body")
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists { .. } => {
                ApiError::conflict("Academic progress record already exists")
            }
            // Don't expose store internals to clients
            StoreError::Unavailable(_) | StoreError::Database(_) => {
                ApiError::storage_unavailable("Academic progress storage is unavailable")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        ResponseFrame::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseError;

    #[test]
    fn maps_kinds_to_status_codes() {
        assert_eq!(ApiError::unauthenticated("x").status_code(), 401);
        assert_eq!(ApiError::invalid_input("x").status_code(), 400);
        assert_eq!(ApiError::forbidden("x").status_code(), 403);
        assert_eq!(ApiError::conflict("x").status_code(), 409);
        assert_eq!(ApiError::storage_unavailable("x").status_code(), 500);
        assert_eq!(ApiError::internal_error("x").status_code(), 500);
    }

    #[test]
    fn store_failures_do_not_leak_detail() {
        let err: ApiError = StoreError::Database(DatabaseError::MalformedRow(
            "password authentication failed for user progress".to_string(),
        ))
        .into();
        assert!(matches!(err, ApiError::StorageUnavailable(_)));
        assert!(!err.message().contains("password"));

        let err: ApiError = StoreError::AlreadyExists {
            partition_key: "t1#u1".to_string(),
            sort_key: "3#C101".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), 409);
    }

    #[test]
    fn malformed_body_is_internal_error() {
        let err: ApiError = PayloadError::Malformed("EOF while parsing".to_string()).into();
        assert!(matches!(err, ApiError::InternalError(_)));
        assert!(!err.message().contains("EOF"));

        let err: ApiError = PayloadError::MissingFields(vec!["grade"]).into();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn body_shape_has_error_and_code() {
        let body = ApiError::forbidden("nope").to_json();
        assert_eq!(body["error"], "nope");
        assert_eq!(body["code"], "FORBIDDEN");
    }
}
