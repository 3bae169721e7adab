use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ApiError;

/// Status code and JSON body of one pipeline outcome.
///
/// Successes and failures of both pipelines are framed through this type, so
/// the mapping is a pure function of the outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFrame {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: Value,
}

/// Successful pipeline result with its status code
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self::with_status(data, StatusCode::OK)
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self { data, status_code }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

impl From<ApiError> for ResponseFrame {
    fn from(err: ApiError) -> Self {
        Self {
            status_code: err.status_code(),
            body: err.to_json(),
        }
    }
}

impl<T: Serialize> From<ApiResponse<T>> for ResponseFrame {
    fn from(response: ApiResponse<T>) -> Self {
        match serde_json::to_value(&response.data) {
            Ok(body) => Self {
                status_code: response.status_code.as_u16(),
                body,
            },
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                ApiError::internal_error("Failed to serialize response data").into()
            }
        }
    }
}

/// Frame the outcome of either pipeline
pub fn frame<T: Serialize>(result: ApiResult<T>) -> ResponseFrame {
    match result {
        Ok(response) => response.into(),
        Err(err) => err.into(),
    }
}

impl IntoResponse for ResponseFrame {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body)).into_response()
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        ResponseFrame::from(self).into_response()
    }
}

/// Confirmation body for a created record
pub fn created_message(message: &str) -> Value {
    json!({ "message": message })
}

// Convenience type alias
pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;
