pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::calculators::handlers;
use crate::reminders::handlers as reminder_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Calculators
        .route(
            "/api/v1/calculators/bmi",
            get(handlers::handle_get_bmi).post(handlers::handle_calculate_bmi),
        )
        .route(
            "/api/v1/calculators/water-intake",
            get(handlers::handle_get_water_intake).post(handlers::handle_calculate_water_intake),
        )
        // Reminders
        .route(
            "/api/v1/reminders",
            get(reminder_handlers::handle_reminder_status),
        )
        .route(
            "/api/v1/reminders/enable",
            post(reminder_handlers::handle_enable_reminders),
        )
        .route(
            "/api/v1/reminders/disable",
            post(reminder_handlers::handle_disable_reminders),
        )
        .with_state(state)
}
