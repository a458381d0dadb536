use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::reminders::{local_now, ReminderStatus};
use crate::session::Session;
use crate::state::AppState;

/// GET /api/v1/reminders
pub async fn handle_reminder_status(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<ReminderStatus>, AppError> {
    let owner_id = session.owner_id().ok_or(AppError::Unauthorized)?;
    Ok(Json(state.reminders.status(owner_id, local_now()).await))
}

/// POST /api/v1/reminders/enable
pub async fn handle_enable_reminders(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<ReminderStatus>, AppError> {
    let owner_id = session.owner_id().ok_or(AppError::Unauthorized)?;
    Ok(Json(state.reminders.enable(owner_id, local_now()).await))
}

/// POST /api/v1/reminders/disable
pub async fn handle_disable_reminders(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<ReminderStatus>, AppError> {
    let owner_id = session.owner_id().ok_or(AppError::Unauthorized)?;
    Ok(Json(state.reminders.disable(owner_id, local_now()).await))
}
