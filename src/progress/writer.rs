use super::{parse_submission, ProgressRecord};
use crate::auth::IdentityClaim;
use crate::database::{ProgressStore, StoreError};
use crate::error::ApiError;
use crate::types::Operation;

/// Write pipeline: validate a submission, enforce tenant isolation and insert
/// it only if no record exists under the same composite key.
pub async fn submit_progress(
    store: &dyn ProgressStore,
    claim: &IdentityClaim,
    body: &[u8],
) -> Result<ProgressRecord, ApiError> {
    let operation = Operation::SubmitProgress;

    let record = parse_submission(body).map_err(|e| {
        tracing::warn!(
            %operation,
            tenant_id = %claim.tenant_id,
            user_id = %claim.user_id,
            error = %e,
            "rejected progress submission"
        );
        ApiError::from(e)
    })?;

    if record.tenant_id != claim.tenant_id {
        tracing::warn!(
            %operation,
            tenant_id = %claim.tenant_id,
            user_id = %claim.user_id,
            payload_tenant_id = %record.tenant_id,
            "payload tenant does not match authenticated tenant"
        );
        return Err(ApiError::forbidden(
            "You do not have permission to record progress in this tenant",
        ));
    }

    match store.put_if_absent(&record).await {
        Ok(()) => {
            tracing::info!(
                %operation,
                tenant_id = %claim.tenant_id,
                user_id = %claim.user_id,
                partition_key = %record.partition_key(),
                sort_key = %record.sort_key(),
                "academic progress recorded"
            );
            Ok(record)
        }
        Err(e @ StoreError::AlreadyExists { .. }) => {
            tracing::warn!(
                %operation,
                tenant_id = %claim.tenant_id,
                user_id = %claim.user_id,
                error = %e,
                "duplicate progress submission"
            );
            Err(ApiError::from(e))
        }
        Err(e) => {
            tracing::error!(
                %operation,
                tenant_id = %claim.tenant_id,
                user_id = %claim.user_id,
                error = %e,
                "failed to store academic progress"
            );
            Err(ApiError::from(e))
        }
    }
}
