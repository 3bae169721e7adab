use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::auth::IdentityClaim;
use crate::middleware::response::{frame, ApiResponse, ResponseFrame};
use crate::progress::read_progress;

/// GET /api/progress - all courses of the authenticated student, by level
pub async fn progress_get(
    State(state): State<AppState>,
    Extension(claim): Extension<IdentityClaim>,
) -> ResponseFrame {
    frame(
        read_progress(state.store.as_ref(), &claim)
            .await
            .map(ApiResponse::success),
    )
}
