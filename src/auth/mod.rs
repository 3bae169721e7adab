pub mod remote;

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use remote::RemoteTokenValidator;

/// Message used whenever the validator gives no reason of its own
pub const GENERIC_AUTH_FAILURE: &str = "invalid or expired token";

/// Verified identity produced by the auth gate.
///
/// This is the only source of `tenant_id`/`user_id` trusted for authorization;
/// values in request bodies are compared against it, never substituted for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaim {
    pub tenant_id: String,
    pub user_id: String,
}

impl IdentityClaim {
    pub fn new(tenant_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            user_id: user_id.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization token not provided")]
    MissingCredential,

    #[error("Malformed Authorization header: {0}")]
    MalformedHeader(&'static str),

    /// The validator answered with a non-success status
    #[error("Token rejected: {}", .0.as_deref().unwrap_or(GENERIC_AUTH_FAILURE))]
    Rejected(Option<String>),

    /// Network failure or timeout reaching the validator
    #[error("Token validator unavailable: {0}")]
    Unavailable(String),

    #[error("Unexpected token validator response: {0}")]
    InvalidResponse(String),
}

impl AuthError {
    /// Client-facing text. Only the validator's own rejection reason is passed
    /// through; transport details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::MissingCredential => "Authorization token not provided".to_string(),
            AuthError::MalformedHeader(msg) => msg.to_string(),
            AuthError::Rejected(Some(reason)) => reason.clone(),
            AuthError::Rejected(None)
            | AuthError::Unavailable(_)
            | AuthError::InvalidResponse(_) => GENERIC_AUTH_FAILURE.to_string(),
        }
    }
}

/// Remote authority that turns a bearer token into an identity claim.
///
/// Implementations must make exactly one validation attempt per call and must
/// not cache results.
#[async_trait]
pub trait TokenValidator: Send + Sync {
    async fn validate(&self, token: &str) -> Result<IdentityClaim, AuthError>;
}

/// Extract the bearer token from the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::MalformedHeader("Invalid Authorization header format"))?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err(AuthError::MissingCredential),
        None => Err(AuthError::MalformedHeader(
            "Authorization header must use Bearer token format",
        )),
    }
}
