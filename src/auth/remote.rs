use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::{AuthError, IdentityClaim, TokenValidator};
use crate::config::AuthConfig;

/// Envelope returned by the validation capability
#[derive(Debug, Deserialize)]
struct ValidatorEnvelope {
    #[serde(rename = "statusCode")]
    status_code: u16,
    #[serde(default)]
    body: Value,
}

/// Token validator that delegates to a remote HTTP endpoint.
///
/// The client is built once and shared by every request.
#[derive(Debug, Clone)]
pub struct RemoteTokenValidator {
    client: reqwest::Client,
    url: String,
}

impl RemoteTokenValidator {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Unavailable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, AuthError> {
        Self::new(config.validator_url.clone(), config.validator_timeout())
    }
}

#[async_trait]
impl TokenValidator for RemoteTokenValidator {
    async fn validate(&self, token: &str) -> Result<IdentityClaim, AuthError> {
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "token": token }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "token validator request failed");
                AuthError::Unavailable(e.to_string())
            })?;

        let raw: Value = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "token validator returned a non-JSON payload");
            AuthError::InvalidResponse(e.to_string())
        })?;

        parse_validator_response(raw)
    }
}

/// Interpret a `{statusCode, body}` envelope from the validator.
///
/// `body` may be an object or a JSON-encoded string of one.
pub fn parse_validator_response(raw: Value) -> Result<IdentityClaim, AuthError> {
    let envelope: ValidatorEnvelope = serde_json::from_value(raw)
        .map_err(|e| AuthError::InvalidResponse(format!("missing statusCode: {}", e)))?;

    if envelope.status_code != 200 {
        // A rejection body that cannot be decoded still means rejection
        let reason = decode_body(envelope.body)
            .ok()
            .and_then(|body| body.get("error").and_then(Value::as_str).map(str::to_string))
            .filter(|reason| !reason.is_empty());
        return Err(AuthError::Rejected(reason));
    }

    let body = decode_body(envelope.body)?;
    serde_json::from_value(body)
        .map_err(|e| AuthError::InvalidResponse(format!("identity claim: {}", e)))
}

fn decode_body(body: Value) -> Result<Value, AuthError> {
    match body {
        Value::String(encoded) => serde_json::from_str(&encoded)
            .map_err(|e| AuthError::InvalidResponse(format!("body is not valid JSON: {}", e))),
        other => Ok(other),
    }
}
