use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::auth::{extract_bearer_token, AuthError, IdentityClaim, TokenValidator};
use crate::error::ApiError;
use crate::types::Operation;

/// Authentication middleware that validates the bearer token with the remote
/// validator and injects the resulting `IdentityClaim` into the request.
pub async fn auth_gate_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Owned copy so no borrow of the request is held across the remote call
    let headers = request.headers().clone();

    let claim = authenticate(state.validator.as_ref(), &headers)
        .await
        .map_err(|err| {
            let operation = Operation::for_method(request.method()).map(|op| op.as_str());
            tracing::warn!(
                operation = operation.unwrap_or("unknown"),
                method = %request.method(),
                path = %request.uri().path(),
                error = %err,
                "authentication failed"
            );
            ApiError::from(err)
        })?;

    tracing::debug!(
        tenant_id = %claim.tenant_id,
        user_id = %claim.user_id,
        "request authenticated"
    );

    request.extensions_mut().insert(claim);
    Ok(next.run(request).await)
}

/// Resolve the caller's identity. No remote call is made when the header does
/// not carry a bearer token. Failures are logged once, by the caller.
pub async fn authenticate(
    validator: &dyn TokenValidator,
    headers: &HeaderMap,
) -> Result<IdentityClaim, AuthError> {
    let token = extract_bearer_token(headers)?;
    validator.validate(token).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::{header::AUTHORIZATION, HeaderValue};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct DownValidator {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TokenValidator for DownValidator {
        async fn validate(&self, _token: &str) -> Result<IdentityClaim, AuthError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(AuthError::Unavailable("connect timeout".to_string()))
        }
    }

    #[tokio::test]
    async fn keeps_validator_failure_detail_for_logging() {
        let validator = DownValidator { calls: AtomicUsize::new(0) };
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));

        let err = authenticate(&validator, &headers).await.unwrap_err();
        assert!(err.to_string().contains("connect timeout"));
        assert_eq!(validator.calls.load(Ordering::SeqCst), 1);

        let api_err = ApiError::from(err);
        assert_eq!(api_err.status_code(), 401);
        assert!(!api_err.message().contains("connect timeout"));
    }

    #[tokio::test]
    async fn missing_header_skips_validator() {
        let validator = DownValidator { calls: AtomicUsize::new(0) };

        let err = authenticate(&validator, &HeaderMap::new()).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredential));
        assert_eq!(validator.calls.load(Ordering::SeqCst), 0);
    }
}
