use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::info;

use crate::models::record::{MetricRecord, NewRecord, RecordPayload, RecordType};
use crate::persistence::store::{RecordStore, StoreError};
use crate::session::Session;

/// Most recent BMI records shown beside the calculator.
pub const BMI_HISTORY_LIMIT: usize = 5;
/// The water calculator only restores its latest preferences.
pub const WATER_PREFERENCE_LIMIT: usize = 1;

/// Translates computed results into stored records and reads them back for
/// the current identity. Guests get no-ops rather than errors.
#[derive(Clone)]
pub struct RecordAdapter {
    store: Arc<dyn RecordStore>,
}

impl RecordAdapter {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Appends a new record dated today. `Ok(None)` for guests.
    pub async fn save_record(
        &self,
        session: &Session,
        payload: &RecordPayload,
    ) -> Result<Option<MetricRecord>, StoreError> {
        self.save_record_on(session, payload, Utc::now().date_naive())
            .await
    }

    pub async fn save_record_on(
        &self,
        session: &Session,
        payload: &RecordPayload,
        record_date: NaiveDate,
    ) -> Result<Option<MetricRecord>, StoreError> {
        let Some(owner_id) = session.owner_id() else {
            return Ok(None);
        };

        let record = self
            .store
            .insert(NewRecord {
                owner_id,
                record_type: payload.record_type(),
                record_date,
                data: payload.to_value()?,
            })
            .await?;

        info!(
            "Saved {} record {} for owner {owner_id}",
            record.record_type, record.id
        );
        Ok(Some(record))
    }

    /// Up to `limit` records, most recent first. Empty for guests.
    pub async fn load_history(
        &self,
        session: &Session,
        record_type: RecordType,
        limit: usize,
    ) -> Result<Vec<MetricRecord>, StoreError> {
        match session.owner_id() {
            Some(owner_id) => self.store.query(owner_id, record_type, limit).await,
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::BmiCategory;
    use crate::models::record::BmiPayload;
    use crate::persistence::memory::InMemoryRecordStore;
    use uuid::Uuid;

    fn bmi(weight: f64) -> RecordPayload {
        RecordPayload::Bmi(BmiPayload {
            weight,
            height: 180.0,
            bmi: weight / 3.24,
            category: BmiCategory::Normal,
        })
    }

    #[tokio::test]
    async fn test_guest_save_and_load_are_noops() {
        let store = Arc::new(InMemoryRecordStore::new());
        let adapter = RecordAdapter::new(store.clone());
        let guest = Session::guest();

        assert!(adapter.save_record(&guest, &bmi(70.0)).await.unwrap().is_none());
        assert!(adapter
            .load_history(&guest, RecordType::Bmi, BMI_HISTORY_LIMIT)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_saved_record_is_first_in_history() {
        let adapter = RecordAdapter::new(Arc::new(InMemoryRecordStore::new()));
        let session = Session::for_user(Uuid::new_v4());

        for w in [60.0, 65.0, 70.0, 75.0, 80.0, 85.0] {
            adapter.save_record(&session, &bmi(w)).await.unwrap();
        }
        let saved = adapter
            .save_record(&session, &bmi(90.0))
            .await
            .unwrap()
            .unwrap();

        let history = adapter
            .load_history(&session, RecordType::Bmi, BMI_HISTORY_LIMIT)
            .await
            .unwrap();
        assert_eq!(history.len(), BMI_HISTORY_LIMIT);
        assert_eq!(history[0].id, saved.id);
        assert_eq!(history[0].bmi_payload().unwrap().weight, 90.0);
    }

    #[tokio::test]
    async fn test_newer_record_date_wins_over_insertion_order() {
        let adapter = RecordAdapter::new(Arc::new(InMemoryRecordStore::new()));
        let session = Session::for_user(Uuid::new_v4());
        let later = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        let earlier = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();

        adapter.save_record_on(&session, &bmi(70.0), later).await.unwrap();
        adapter.save_record_on(&session, &bmi(71.0), earlier).await.unwrap();

        let history = adapter
            .load_history(&session, RecordType::Bmi, BMI_HISTORY_LIMIT)
            .await
            .unwrap();
        assert_eq!(history[0].record_date, later);
        assert_eq!(history[1].record_date, earlier);
    }

    #[tokio::test]
    async fn test_history_is_owner_scoped() {
        let adapter = RecordAdapter::new(Arc::new(InMemoryRecordStore::new()));
        let alice = Session::for_user(Uuid::new_v4());
        let bob = Session::for_user(Uuid::new_v4());

        adapter.save_record(&alice, &bmi(70.0)).await.unwrap();

        assert!(adapter
            .load_history(&bob, RecordType::Bmi, BMI_HISTORY_LIMIT)
            .await
            .unwrap()
            .is_empty());
    }
}
