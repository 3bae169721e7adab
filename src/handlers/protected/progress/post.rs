use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::StatusCode,
    Extension,
};

use crate::app::AppState;
use crate::auth::IdentityClaim;
use crate::error::ApiError;
use crate::middleware::response::{created_message, frame, ApiResponse, ResponseFrame};
use crate::progress::submit_progress;
use crate::types::Operation;

/// POST /api/progress - record one course for a student
///
/// The body is read raw so a malformed or oversized payload is framed by our
/// own error taxonomy instead of the extractor's rejection.
pub async fn progress_post(
    State(state): State<AppState>,
    Extension(claim): Extension<IdentityClaim>,
    body: Result<Bytes, BytesRejection>,
) -> ResponseFrame {
    let result = match body {
        Ok(body) => submit_progress(state.store.as_ref(), &claim, &body).await,
        Err(rejection) => Err(body_rejection(&claim, rejection)),
    };

    frame(result.map(|_| {
        ApiResponse::created(created_message("Academic progress recorded successfully"))
    }))
}

fn body_rejection(claim: &IdentityClaim, rejection: BytesRejection) -> ApiError {
    tracing::warn!(
        operation = %Operation::SubmitProgress,
        tenant_id = %claim.tenant_id,
        user_id = %claim.user_id,
        error = %rejection.body_text(),
        "request body rejected"
    );

    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::invalid_input("Request body too large")
    } else {
        ApiError::internal_error("Failed to process request body")
    }
}
