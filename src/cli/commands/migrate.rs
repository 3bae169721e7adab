use serde_json::json;

use crate::cli::{utils, OutputFormat};
use crate::config::{self, StorageBackend};
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let storage = &config::config().storage;

    if storage.backend != StorageBackend::Postgres {
        anyhow::bail!("migrate requires STORAGE_BACKEND=postgres");
    }

    let pool = DatabaseManager::connect(storage).await?;
    DatabaseManager::ensure_schema(&pool, &storage.table_name).await?;
    pool.close().await;

    utils::output_success(
        &output_format,
        &format!("Progress table '{}' is ready", storage.table_name),
        Some(json!({ "table": storage.table_name })),
    )
}
