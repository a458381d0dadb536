pub mod bmi;
pub mod handlers;
pub mod water;

use serde::Deserialize;

use crate::metrics::parse_measurement;

pub use bmi::BmiCalculatorView;
pub use water::WaterIntakeCalculatorView;

/// A form measurement, sent either as a JSON number or as the raw text of
/// the input field.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MeasurementInput {
    Number(f64),
    Text(String),
}

impl MeasurementInput {
    pub fn value(&self) -> Option<f64> {
        match self {
            MeasurementInput::Number(n) => Some(*n).filter(|n| n.is_finite()),
            MeasurementInput::Text(s) => parse_measurement(s),
        }
    }
}
