//! Wellness metric formulas.
//!
//! Pure and deterministic. Invalid input never produces a value: every
//! function returns `None` instead, and callers skip persistence.

use serde::{Deserialize, Serialize};

/// Liters of water per kilogram of body weight before activity adjustment.
const WATER_LITERS_PER_KG: f64 = 0.033;

const UNDERWEIGHT_BELOW: f64 = 18.5;
const NORMAL_BELOW: f64 = 25.0;
const OVERWEIGHT_BELOW: f64 = 30.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Half-open bands: the lower boundary of each band belongs to it.
    pub fn classify(bmi: f64) -> Self {
        match bmi {
            b if b < UNDERWEIGHT_BELOW => BmiCategory::Underweight,
            b if b < NORMAL_BELOW => BmiCategory::Normal,
            b if b < OVERWEIGHT_BELOW => BmiCategory::Overweight,
            _ => BmiCategory::Obese,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BmiResult {
    pub bmi: f64,
    pub category: BmiCategory,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    #[default]
    Moderate,
    Active,
}

impl ActivityLevel {
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.0,
            ActivityLevel::Moderate => 1.2,
            ActivityLevel::Active => 1.4,
        }
    }

    /// Case-insensitive parse of the form value.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sedentary" => Some(ActivityLevel::Sedentary),
            "moderate" => Some(ActivityLevel::Moderate),
            "active" => Some(ActivityLevel::Active),
            _ => None,
        }
    }
}

/// BMI from weight in kilograms and height in centimeters.
pub fn compute_bmi(weight_kg: f64, height_cm: f64) -> Option<BmiResult> {
    if !is_positive(weight_kg) || !is_positive(height_cm) {
        return None;
    }
    let height_m = height_cm / 100.0;
    let bmi = weight_kg / (height_m * height_m);
    if !bmi.is_finite() {
        return None;
    }
    Some(BmiResult {
        bmi,
        category: BmiCategory::classify(bmi),
    })
}

/// Recommended daily water intake, rounded to whole liters.
pub fn compute_water_intake(weight_kg: f64, activity_level: ActivityLevel) -> Option<u32> {
    if !is_positive(weight_kg) {
        return None;
    }
    let liters = (weight_kg * WATER_LITERS_PER_KG * activity_level.multiplier()).round();
    if !liters.is_finite() || liters > u32::MAX as f64 {
        return None;
    }
    Some(liters as u32)
}

/// Parses a form field the way a lenient float parse does: surrounding
/// whitespace is ignored and the longest numeric prefix wins (`"70kg"` is 70).
pub fn parse_measurement(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    let prefix = &trimmed[..numeric_prefix_len(trimmed)];
    prefix.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        digits += j - frac_start;
        if digits > 0 {
            i = j;
        }
    }
    if digits == 0 {
        return 0;
    }
    // Exponent only counts when at least one digit follows it.
    if i < bytes.len() && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if matches!(bytes.get(j), Some(b'+') | Some(b'-')) {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    i
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
