use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::{is_valid_table_name, StorageConfig};

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Stored row is malformed: {0}")]
    MalformedRow(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Builds the process-wide Postgres pool and owns the progress table DDL
pub struct DatabaseManager;

impl DatabaseManager {
    /// Open the connection pool. Called once at startup; the pool is then
    /// cloned into every store handle.
    pub async fn connect(config: &StorageConfig) -> Result<PgPool, DatabaseError> {
        let connection_string = Self::connection_string(config)?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .connect(&connection_string)
            .await?;

        info!(max_connections = config.max_connections, "Created database pool");
        Ok(pool)
    }

    fn connection_string(config: &StorageConfig) -> Result<String, DatabaseError> {
        let base = config
            .database_url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let url = url::Url::parse(base).map_err(|_| DatabaseError::InvalidDatabaseUrl)?;
        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(DatabaseError::InvalidDatabaseUrl);
        }
        Ok(url.into())
    }

    /// Create the progress table if it does not exist.
    ///
    /// The primary key on `(partition_key, sort_key)` is what makes the
    /// conditional insert atomic.
    pub async fn ensure_schema(pool: &PgPool, table_name: &str) -> Result<(), DatabaseError> {
        let ddl = Self::create_table_sql(table_name)?;
        sqlx::query(&ddl).execute(pool).await?;
        info!(table = table_name, "Progress table ready");
        Ok(())
    }

    fn create_table_sql(table_name: &str) -> Result<String, DatabaseError> {
        if !is_valid_table_name(table_name) {
            return Err(DatabaseError::InvalidTableName(table_name.to_string()));
        }

        Ok(format!(
            r#"CREATE TABLE IF NOT EXISTS {} (
                partition_key TEXT NOT NULL,
                sort_key TEXT NOT NULL,
                tenant_id TEXT NOT NULL,
                user_id TEXT NOT NULL,
                level INTEGER NOT NULL,
                course_id TEXT NOT NULL,
                course_name TEXT NOT NULL,
                credits DOUBLE PRECISION NOT NULL,
                grade JSONB NOT NULL,
                status TEXT NOT NULL,
                period TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                PRIMARY KEY (partition_key, sort_key)
            )"#,
            Self::quote_identifier(table_name)
        ))
    }

    /// Quote SQL identifier to prevent injection
    pub fn quote_identifier(name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}
