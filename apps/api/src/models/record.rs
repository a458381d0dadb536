use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

use crate::metrics::{ActivityLevel, BmiCategory};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    Bmi,
    WaterIntake,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::Bmi => "bmi",
            RecordType::WaterIntake => "water_intake",
        }
    }
}

/// One stored observation. Rows are append-only and never updated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MetricRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub record_type: String,
    pub record_date: NaiveDate,
    pub data: Value,
    pub created_at: DateTime<Utc>,
}

impl MetricRecord {
    pub fn bmi_payload(&self) -> Option<BmiPayload> {
        if self.record_type != RecordType::Bmi.as_str() {
            return None;
        }
        serde_json::from_value(self.data.clone()).ok()
    }

    pub fn water_intake_payload(&self) -> Option<WaterIntakePayload> {
        if self.record_type != RecordType::WaterIntake.as_str() {
            return None;
        }
        serde_json::from_value(self.data.clone()).ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BmiPayload {
    /// Kilograms.
    pub weight: f64,
    /// Centimeters.
    pub height: f64,
    pub bmi: f64,
    pub category: BmiCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaterIntakePayload {
    pub weight: f64,
    pub activity_level: ActivityLevel,
    /// Whole liters per day.
    pub daily_intake: u32,
    pub reminders_enabled: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordPayload {
    Bmi(BmiPayload),
    WaterIntake(WaterIntakePayload),
}

impl RecordPayload {
    pub fn record_type(&self) -> RecordType {
        match self {
            RecordPayload::Bmi(_) => RecordType::Bmi,
            RecordPayload::WaterIntake(_) => RecordType::WaterIntake,
        }
    }

    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        match self {
            RecordPayload::Bmi(p) => serde_json::to_value(p),
            RecordPayload::WaterIntake(p) => serde_json::to_value(p),
        }
    }
}

/// Insert parameters for a record store.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub owner_id: Uuid,
    pub record_type: RecordType,
    pub record_date: NaiveDate,
    pub data: Value,
}
