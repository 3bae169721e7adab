use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{types::Json, FromRow, PgPool};

use super::{DatabaseError, DatabaseManager, ProgressStore, StoreError};
use crate::progress::ProgressRecord;

#[derive(Debug, FromRow)]
struct ProgressRow {
    tenant_id: String,
    user_id: String,
    level: i32,
    course_id: String,
    course_name: String,
    credits: f64,
    grade: Json<Value>,
    status: String,
    period: String,
    #[allow(dead_code)]
    created_at: DateTime<Utc>,
}

impl From<ProgressRow> for ProgressRecord {
    fn from(row: ProgressRow) -> Self {
        Self {
            tenant_id: row.tenant_id,
            user_id: row.user_id,
            level: i64::from(row.level),
            course_id: row.course_id,
            course_name: row.course_name,
            credits: row.credits,
            grade: row.grade.0,
            status: row.status,
            period: row.period,
        }
    }
}

/// Progress store backed by one Postgres table
#[derive(Clone)]
pub struct PgProgressStore {
    pool: PgPool,
    insert_sql: String,
    query_sql: String,
}

impl PgProgressStore {
    pub fn new(pool: PgPool, table_name: &str) -> Result<Self, DatabaseError> {
        if !crate::config::is_valid_table_name(table_name) {
            return Err(DatabaseError::InvalidTableName(table_name.to_string()));
        }
        let table = DatabaseManager::quote_identifier(table_name);

        // ON CONFLICT DO NOTHING against the primary key is the atomic
        // compare-and-insert; zero affected rows means the key was taken.
        let insert_sql = format!(
            "INSERT INTO {} (partition_key, sort_key, tenant_id, user_id, level, course_id, \
             course_name, credits, grade, status, period) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             ON CONFLICT (partition_key, sort_key) DO NOTHING",
            table
        );
        let query_sql = format!(
            "SELECT tenant_id, user_id, level, course_id, course_name, credits, grade, status, \
             period, created_at FROM {} WHERE partition_key = $1 ORDER BY sort_key",
            table
        );

        Ok(Self {
            pool,
            insert_sql,
            query_sql,
        })
    }
}

#[async_trait]
impl ProgressStore for PgProgressStore {
    async fn put_if_absent(&self, record: &ProgressRecord) -> Result<(), StoreError> {
        let level = i32::try_from(record.level)
            .map_err(|_| DatabaseError::MalformedRow(format!("level {} out of range", record.level)))?;
        let partition_key = record.partition_key();
        let sort_key = record.sort_key();

        let result = sqlx::query(&self.insert_sql)
            .bind(&partition_key)
            .bind(&sort_key)
            .bind(&record.tenant_id)
            .bind(&record.user_id)
            .bind(level)
            .bind(&record.course_id)
            .bind(&record.course_name)
            .bind(record.credits)
            .bind(Json(&record.grade))
            .bind(&record.status)
            .bind(&record.period)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists {
                partition_key,
                sort_key,
            });
        }
        Ok(())
    }

    async fn query_partition(&self, partition_key: &str) -> Result<Vec<ProgressRecord>, StoreError> {
        let rows = sqlx::query_as::<_, ProgressRow>(&self.query_sql)
            .bind(partition_key)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ProgressRecord::from).collect())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        DatabaseManager::health_check(&self.pool).await?;
        Ok(())
    }
}
