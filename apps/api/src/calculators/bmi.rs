use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::metrics::{compute_bmi, BmiCategory, BmiResult};
use crate::models::record::{BmiPayload, MetricRecord, RecordPayload, RecordType};
use crate::persistence::{RecordAdapter, BMI_HISTORY_LIMIT};
use crate::session::Session;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BmiHistoryEntry {
    pub id: Uuid,
    pub record_date: NaiveDate,
    pub bmi: f64,
    pub category: BmiCategory,
}

impl BmiHistoryEntry {
    fn from_record(record: &MetricRecord) -> Option<Self> {
        let payload = record.bmi_payload()?;
        Some(Self {
            id: record.id,
            record_date: record.record_date,
            bmi: payload.bmi,
            category: payload.category,
        })
    }
}

/// BMI calculator state: the latest result plus recent history.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BmiCalculatorView {
    pub result: Option<BmiResult>,
    pub history: Vec<BmiHistoryEntry>,
    /// Whether the latest calculation was stored.
    pub saved: bool,
}

impl BmiCalculatorView {
    /// Refreshes history. On a store failure the previous history stays.
    pub async fn load(&mut self, records: &RecordAdapter, session: &Session) {
        match records
            .load_history(session, RecordType::Bmi, BMI_HISTORY_LIMIT)
            .await
        {
            Ok(rows) => {
                self.history = rows.iter().filter_map(BmiHistoryEntry::from_record).collect();
            }
            Err(e) => warn!("Keeping previous BMI history, load failed: {e}"),
        }
    }

    /// Computes, stores for signed-in users and refreshes history after a
    /// save. Invalid input leaves the view untouched and returns `None`.
    pub async fn calculate(
        &mut self,
        records: &RecordAdapter,
        session: &Session,
        weight_kg: Option<f64>,
        height_cm: Option<f64>,
    ) -> Option<BmiResult> {
        let (weight, height) = weight_kg.zip(height_cm)?;
        let result = compute_bmi(weight, height)?;
        self.result = Some(result);
        self.saved = false;

        let payload = RecordPayload::Bmi(BmiPayload {
            weight,
            height,
            bmi: result.bmi,
            category: result.category,
        });
        match records.save_record(session, &payload).await {
            Ok(Some(_)) => {
                self.saved = true;
                self.load(records, session).await;
            }
            Ok(None) => {}
            Err(e) => warn!("BMI result shown but not saved: {e}"),
        }

        Some(result)
    }
}
