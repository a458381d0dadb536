use std::sync::Arc;

use crate::config::Config;
use crate::persistence::RecordAdapter;
use crate::reminders::ReminderRegistry;
use crate::session::IdentityProvider;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub records: RecordAdapter,
    /// Pluggable identity resolution. Default: trusted gateway header.
    pub identity: Arc<dyn IdentityProvider>,
    pub reminders: Arc<ReminderRegistry>,
    pub config: Config,
}
