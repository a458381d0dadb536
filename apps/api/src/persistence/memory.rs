use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::record::{MetricRecord, NewRecord, RecordType};
use crate::persistence::store::{RecordStore, StoreError};

/// Process-local store used when no database is configured.
/// Records are lost on restart.
#[derive(Default)]
pub struct InMemoryRecordStore {
    // Insertion order doubles as the tie-breaker for equal record dates.
    records: RwLock<Vec<MetricRecord>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(&self, record: NewRecord) -> Result<MetricRecord, StoreError> {
        let row = MetricRecord {
            id: Uuid::new_v4(),
            owner_id: record.owner_id,
            record_type: record.record_type.as_str().to_string(),
            record_date: record.record_date,
            data: record.data,
            created_at: Utc::now(),
        };
        self.records.write().await.push(row.clone());
        Ok(row)
    }

    async fn query(
        &self,
        owner_id: Uuid,
        record_type: RecordType,
        limit: usize,
    ) -> Result<Vec<MetricRecord>, StoreError> {
        let records = self.records.read().await;
        let mut matching: Vec<(usize, &MetricRecord)> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.owner_id == owner_id && r.record_type == record_type.as_str())
            .collect();
        matching.sort_by(|(seq_a, a), (seq_b, b)| {
            b.record_date
                .cmp(&a.record_date)
                .then_with(|| seq_b.cmp(seq_a))
        });
        Ok(matching
            .into_iter()
            .take(limit)
            .map(|(_, r)| r.clone())
            .collect())
    }
}
