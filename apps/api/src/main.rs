mod calculators;
mod config;
mod db;
mod errors;
mod metrics;
mod models;
mod persistence;
mod reminders;
mod routes;
mod session;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::persistence::{InMemoryRecordStore, PgRecordStore, RecordAdapter, RecordStore};
use crate::reminders::{NotificationSurface, ReminderRegistry, UnavailableNotifier, WebhookNotifier};
use crate::routes::build_router;
use crate::session::HeaderIdentityProvider;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Wellness API v{}", env!("CARGO_PKG_VERSION"));

    // Record store: PostgreSQL when configured, process memory otherwise
    let store: Arc<dyn RecordStore> = match &config.database_url {
        Some(url) => Arc::new(PgRecordStore::new(create_pool(url).await?)),
        None => {
            warn!("DATABASE_URL not set; records are kept in memory and lost on restart");
            Arc::new(InMemoryRecordStore::new())
        }
    };

    // Notification surface for water reminders
    let surface: Arc<dyn NotificationSurface> = match &config.notify_webhook_url {
        Some(url) => {
            info!("Water reminders delivered via webhook");
            Arc::new(WebhookNotifier::new(url.clone()))
        }
        None => {
            info!("NOTIFY_WEBHOOK_URL not set; water reminders unavailable");
            Arc::new(UnavailableNotifier)
        }
    };

    let state = AppState {
        records: RecordAdapter::new(store),
        identity: Arc::new(HeaderIdentityProvider::new(config.identity_header.clone())),
        reminders: Arc::new(ReminderRegistry::new(surface)),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
