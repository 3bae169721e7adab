pub mod manager;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::progress::ProgressRecord;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryProgressStore;
pub use postgres::PgProgressStore;

/// Errors from a progress store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The conditional insert found a record under the same composite key
    #[error("Record already exists: {partition_key} / {sort_key}")]
    AlreadyExists {
        partition_key: String,
        sort_key: String,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(DatabaseError::Sqlx(err))
    }
}

/// Keyed store holding progress records under `(tenant_id#user_id, level#course_id)`.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Insert `record` only if nothing exists under its composite key.
    ///
    /// Must be a single atomic operation; a duplicate is reported as
    /// [`StoreError::AlreadyExists`].
    async fn put_if_absent(&self, record: &ProgressRecord) -> Result<(), StoreError>;

    /// Every record under one partition key, ordered by sort key
    async fn query_partition(&self, partition_key: &str) -> Result<Vec<ProgressRecord>, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}
