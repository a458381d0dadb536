//! Record store clients.
//!
//! `RecordStore` is the seam between the calculators and whatever remote
//! collection holds `health_records`. `AppState` carries an
//! `Arc<dyn RecordStore>` chosen at startup from config.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::models::record::{MetricRecord, NewRecord, RecordType};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Payload serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(e.to_string())
            }
            other => StoreError::Database(other),
        }
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Appends a record. Existing rows are never touched.
    async fn insert(&self, record: NewRecord) -> Result<MetricRecord, StoreError>;

    /// Up to `limit` records for one owner and type, newest record date
    /// first, ties broken by store insertion order (newest first).
    async fn query(
        &self,
        owner_id: Uuid,
        record_type: RecordType,
        limit: usize,
    ) -> Result<Vec<MetricRecord>, StoreError>;
}

/// PostgreSQL-backed store over the `health_records` table.
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, record: NewRecord) -> Result<MetricRecord, StoreError> {
        let row = sqlx::query_as::<_, MetricRecord>(
            r#"
            INSERT INTO health_records (owner_id, record_type, record_date, data)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, record_type, record_date, data, created_at
            "#,
        )
        .bind(record.owner_id)
        .bind(record.record_type.as_str())
        .bind(record.record_date)
        .bind(&record.data)
        .fetch_one(&self.pool)
        .await?;

        debug!(
            "Inserted {} record {} for owner {}",
            row.record_type, row.id, row.owner_id
        );
        Ok(row)
    }

    async fn query(
        &self,
        owner_id: Uuid,
        record_type: RecordType,
        limit: usize,
    ) -> Result<Vec<MetricRecord>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        Ok(sqlx::query_as::<_, MetricRecord>(
            r#"
            SELECT id, owner_id, record_type, record_date, data, created_at
            FROM health_records
            WHERE owner_id = $1 AND record_type = $2
            ORDER BY record_date DESC, created_at DESC, seq DESC
            LIMIT $3
            "#,
        )
        .bind(owner_id)
        .bind(record_type.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }
}
