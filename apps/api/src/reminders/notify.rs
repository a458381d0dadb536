//! Notification surfaces.
//!
//! A surface exposes a permission state, a permission request, and a
//! "show this alert now" primitive. Delivery is best effort.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationPermission {
    Default,
    Granted,
    Denied,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Notification {
    pub title: &'static str,
    pub body: &'static str,
    pub icon: &'static str,
}

pub const WATER_REMINDER: Notification = Notification {
    title: "Water Intake Reminder",
    body: "Time to drink water! Stay hydrated.",
    icon: "/water-drop.png",
};

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notifications are unavailable")]
    Unavailable,

    #[error("Notification permission not granted for {0}")]
    NotPermitted(Uuid),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait NotificationSurface: Send + Sync {
    /// `false` when the platform has no notification capability at all.
    fn is_available(&self) -> bool;

    fn permission(&self, owner_id: Uuid) -> NotificationPermission;

    async fn request_permission(&self, owner_id: Uuid) -> NotificationPermission;

    async fn notify(&self, owner_id: Uuid, notification: &Notification) -> Result<(), NotifyError>;
}

/// Used when no delivery channel is configured. Every request is denied.
pub struct UnavailableNotifier;

#[async_trait]
impl NotificationSurface for UnavailableNotifier {
    fn is_available(&self) -> bool {
        false
    }

    fn permission(&self, _owner_id: Uuid) -> NotificationPermission {
        NotificationPermission::Denied
    }

    async fn request_permission(&self, _owner_id: Uuid) -> NotificationPermission {
        NotificationPermission::Denied
    }

    async fn notify(&self, _owner_id: Uuid, _notification: &Notification) -> Result<(), NotifyError> {
        Err(NotifyError::Unavailable)
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    owner_id: Uuid,
    title: &'a str,
    body: &'a str,
    icon: &'a str,
}

/// Posts notifications as JSON to a push gateway. Opting in grants
/// permission for that owner until the process restarts.
pub struct WebhookNotifier {
    client: Client,
    url: String,
    granted: Mutex<HashSet<Uuid>>,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Self {
        Self {
            client: Client::new(),
            url,
            granted: Mutex::new(HashSet::new()),
        }
    }

    fn is_granted(&self, owner_id: Uuid) -> bool {
        self.granted
            .lock()
            .map(|g| g.contains(&owner_id))
            .unwrap_or(false)
    }
}

#[async_trait]
impl NotificationSurface for WebhookNotifier {
    fn is_available(&self) -> bool {
        true
    }

    fn permission(&self, owner_id: Uuid) -> NotificationPermission {
        if self.is_granted(owner_id) {
            NotificationPermission::Granted
        } else {
            NotificationPermission::Default
        }
    }

    async fn request_permission(&self, owner_id: Uuid) -> NotificationPermission {
        match self.granted.lock() {
            Ok(mut granted) => {
                granted.insert(owner_id);
                info!("Notification permission granted for {owner_id}");
                NotificationPermission::Granted
            }
            Err(_) => NotificationPermission::Denied,
        }
    }

    async fn notify(&self, owner_id: Uuid, notification: &Notification) -> Result<(), NotifyError> {
        if !self.is_granted(owner_id) {
            return Err(NotifyError::NotPermitted(owner_id));
        }

        let payload = WebhookPayload {
            owner_id,
            title: notification.title,
            body: notification.body,
            icon: notification.icon,
        };
        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        debug!("Delivered '{}' to {owner_id}", notification.title);
        Ok(())
    }
}
