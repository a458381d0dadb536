use anyhow::{Context, Result};
use axum::http::HeaderName;

const DEFAULT_IDENTITY_HEADER: &str = "x-user-id";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absent means records live in process memory only.
    pub database_url: Option<String>,
    /// Header carrying the user id stamped by the identity gateway.
    pub identity_header: HeaderName,
    /// Absent means reminders are unavailable.
    pub notify_webhook_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let identity_header = optional_env("IDENTITY_HEADER")
            .unwrap_or_else(|| DEFAULT_IDENTITY_HEADER.to_string());

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            identity_header: HeaderName::try_from(identity_header.to_ascii_lowercase())
                .with_context(|| format!("IDENTITY_HEADER '{identity_header}' is not a valid header name"))?,
            notify_webhook_url: optional_env("NOTIFY_WEBHOOK_URL"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Unset and blank variables are treated the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
