use axum::{extract::State, Json};
use serde::Deserialize;

use crate::calculators::{BmiCalculatorView, MeasurementInput, WaterIntakeCalculatorView};
use crate::errors::AppError;
use crate::metrics::ActivityLevel;
use crate::reminders::local_now;
use crate::session::Session;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct BmiRequest {
    pub weight: MeasurementInput,
    pub height: MeasurementInput,
}

#[derive(Debug, Deserialize)]
pub struct WaterIntakeRequest {
    /// Falls back to the restored weight when omitted.
    pub weight: Option<MeasurementInput>,
    pub activity_level: Option<String>,
    /// The reminders checkbox. Flipping it requests permission or turns
    /// future arming off before the calculation runs.
    pub reminders_enabled: Option<bool>,
}

/// GET /api/v1/calculators/bmi
pub async fn handle_get_bmi(
    State(state): State<AppState>,
    session: Session,
) -> Json<BmiCalculatorView> {
    let mut view = BmiCalculatorView::default();
    view.load(&state.records, &session).await;
    Json(view)
}

/// POST /api/v1/calculators/bmi
pub async fn handle_calculate_bmi(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<BmiRequest>,
) -> Result<Json<BmiCalculatorView>, AppError> {
    let mut view = BmiCalculatorView::default();
    view.load(&state.records, &session).await;

    view.calculate(
        &state.records,
        &session,
        req.weight.value(),
        req.height.value(),
    )
    .await
    .ok_or_else(|| {
        AppError::Validation("Weight and height must be positive numbers".to_string())
    })?;

    Ok(Json(view))
}

/// GET /api/v1/calculators/water-intake
pub async fn handle_get_water_intake(
    State(state): State<AppState>,
    session: Session,
) -> Json<WaterIntakeCalculatorView> {
    let mut view = WaterIntakeCalculatorView::default();
    view.load(&state.records, &state.reminders, &session, local_now())
        .await;
    Json(view)
}

/// POST /api/v1/calculators/water-intake
pub async fn handle_calculate_water_intake(
    State(state): State<AppState>,
    session: Session,
    Json(req): Json<WaterIntakeRequest>,
) -> Result<Json<WaterIntakeCalculatorView>, AppError> {
    let now = local_now();
    let mut view = WaterIntakeCalculatorView::default();
    view.load(&state.records, &state.reminders, &session, now)
        .await;

    let activity_level = match req.activity_level.as_deref() {
        Some(raw) => ActivityLevel::parse(raw).ok_or_else(|| {
            AppError::Validation(format!(
                "Unknown activity level '{raw}'; expected sedentary, moderate or active"
            ))
        })?,
        None => view.activity_level,
    };
    let weight = match &req.weight {
        Some(input) => input.value(),
        None => view.weight,
    };

    // After load the view mirrors the live scheduler, so a checked box only
    // goes through the permission flow when reminders are not already on.
    match req.reminders_enabled {
        Some(true) if !view.reminders_enabled => {
            view.toggle_reminders(&state.reminders, &session, true, now)
                .await;
        }
        Some(false) => {
            view.toggle_reminders(&state.reminders, &session, false, now)
                .await;
        }
        _ => {}
    }

    view.calculate(
        &state.records,
        &state.reminders,
        &session,
        weight,
        activity_level,
        now,
    )
    .await
    .ok_or_else(|| AppError::Validation("Weight must be a positive number".to_string()))?;

    Ok(Json(view))
}
