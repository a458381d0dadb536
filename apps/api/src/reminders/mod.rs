pub mod handlers;
pub mod notify;
pub mod scheduler;

use chrono::{Local, NaiveDateTime};

pub use notify::{NotificationSurface, UnavailableNotifier, WebhookNotifier};
pub use scheduler::{PermissionState, ReminderRegistry, ReminderStatus};

/// Reminders follow the server's local wall clock.
pub fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}
