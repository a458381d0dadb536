//! Water reminder scheduling.
//!
//! Timers are fire-once tasks for the current calendar day only. Nothing
//! re-arms them for the next day, and disabling reminders does not retract
//! timers that are already armed.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::reminders::notify::{NotificationPermission, NotificationSurface, WATER_REMINDER};

const FIRST_REMINDER_HOUR: u32 = 8;
const LAST_REMINDER_HOUR: u32 = 20;
const REMINDER_INTERVAL_HOURS: usize = 2;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    Unrequested,
    PermissionRequested,
    Granted,
    Denied,
}

impl From<NotificationPermission> for PermissionState {
    fn from(permission: NotificationPermission) -> Self {
        match permission {
            NotificationPermission::Default => PermissionState::Unrequested,
            NotificationPermission::Granted => PermissionState::Granted,
            NotificationPermission::Denied => PermissionState::Denied,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReminderStatus {
    pub available: bool,
    pub permission: PermissionState,
    pub enabled: bool,
    /// Armed instants that have not fired yet.
    pub pending: Vec<NaiveDateTime>,
}

/// Today's reminder instants (every two hours from 08:00 through 20:00)
/// that are strictly after `now`.
pub fn reminder_instants(now: NaiveDateTime) -> Vec<NaiveDateTime> {
    let today = now.date();
    (FIRST_REMINDER_HOUR..=LAST_REMINDER_HOUR)
        .step_by(REMINDER_INTERVAL_HOURS)
        .filter_map(|hour| NaiveTime::from_hms_opt(hour, 0, 0))
        .map(|time| today.and_time(time))
        .filter(|instant| *instant > now)
        .collect()
}

/// Reminder state for a single owner.
pub struct ReminderScheduler {
    owner_id: Uuid,
    surface: Arc<dyn NotificationSurface>,
    state: PermissionState,
    enabled: bool,
    armed: Vec<NaiveDateTime>,
}

impl ReminderScheduler {
    /// Picks up a permission granted earlier; the toggle starts on in that case.
    pub fn new(owner_id: Uuid, surface: Arc<dyn NotificationSurface>) -> Self {
        let state = if surface.is_available() {
            PermissionState::from(surface.permission(owner_id))
        } else {
            PermissionState::Denied
        };
        Self {
            owner_id,
            surface,
            state,
            enabled: state == PermissionState::Granted,
            armed: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> PermissionState {
        self.state
    }

    #[cfg(test)]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Requests permission when needed and arms today's remaining timers.
    /// Returns whether reminders ended up enabled.
    pub async fn enable(&mut self, now: NaiveDateTime) -> bool {
        if !self.surface.is_available() {
            debug!("Notifications unavailable; reminders stay off for {}", self.owner_id);
            self.state = PermissionState::Denied;
            self.enabled = false;
            return false;
        }

        if self.state != PermissionState::Granted {
            self.state = PermissionState::PermissionRequested;
            debug!("Requesting notification permission for {}", self.owner_id);
            let answer = self.surface.request_permission(self.owner_id).await;
            self.state = PermissionState::from(answer);
        }

        if self.state != PermissionState::Granted {
            info!("Reminder permission not granted for {}", self.owner_id);
            self.enabled = false;
            return false;
        }

        self.enabled = true;
        self.arm(now);
        true
    }

    /// Stops future arming only.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Spawns one fire-once timer per remaining instant today. A no-op
    /// unless permission is granted. Returns the number of timers armed.
    pub fn arm(&mut self, now: NaiveDateTime) -> usize {
        if self.state != PermissionState::Granted || !self.surface.is_available() {
            return 0;
        }

        let instants = reminder_instants(now);
        for instant in &instants {
            let Ok(delay) = (*instant - now).to_std() else {
                continue;
            };
            let surface = self.surface.clone();
            let owner_id = self.owner_id;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if let Err(e) = surface.notify(owner_id, &WATER_REMINDER).await {
                    warn!("Water reminder for {owner_id} not delivered: {e}");
                }
            });
        }

        info!(
            "Armed {} water reminders for {} on {}",
            instants.len(),
            self.owner_id,
            now.date()
        );
        // Fired instants are dropped so the list holds at most one day.
        self.armed.retain(|instant| *instant > now);
        self.armed.extend(instants.iter().copied());
        instants.len()
    }

    pub fn status(&self, now: NaiveDateTime) -> ReminderStatus {
        ReminderStatus {
            available: self.surface.is_available(),
            permission: self.state,
            enabled: self.enabled,
            pending: self.armed.iter().copied().filter(|i| *i > now).collect(),
        }
    }
}

/// One scheduler per identity.
pub struct ReminderRegistry {
    surface: Arc<dyn NotificationSurface>,
    schedulers: Mutex<HashMap<Uuid, ReminderScheduler>>,
}

impl ReminderRegistry {
    pub fn new(surface: Arc<dyn NotificationSurface>) -> Self {
        Self {
            surface,
            schedulers: Mutex::new(HashMap::new()),
        }
    }

    pub async fn enable(&self, owner_id: Uuid, now: NaiveDateTime) -> ReminderStatus {
        let mut schedulers = self.schedulers.lock().await;
        let scheduler = self.scheduler_for(&mut schedulers, owner_id);
        scheduler.enable(now).await;
        scheduler.status(now)
    }

    pub async fn disable(&self, owner_id: Uuid, now: NaiveDateTime) -> ReminderStatus {
        let mut schedulers = self.schedulers.lock().await;
        let scheduler = self.scheduler_for(&mut schedulers, owner_id);
        scheduler.disable();
        scheduler.status(now)
    }

    /// Owners without a scheduler are only tracked once there is
    /// something to arm for them.
    pub async fn arm(&self, owner_id: Uuid, now: NaiveDateTime) -> usize {
        let mut schedulers = self.schedulers.lock().await;
        if let Some(scheduler) = schedulers.get_mut(&owner_id) {
            return scheduler.arm(now);
        }
        let mut scheduler = ReminderScheduler::new(owner_id, self.surface.clone());
        let armed = scheduler.arm(now);
        if armed > 0 {
            schedulers.insert(owner_id, scheduler);
        }
        armed
    }

    /// Read-only: an untracked owner gets the status a fresh scheduler
    /// would report.
    pub async fn status(&self, owner_id: Uuid, now: NaiveDateTime) -> ReminderStatus {
        let schedulers = self.schedulers.lock().await;
        match schedulers.get(&owner_id) {
            Some(scheduler) => scheduler.status(now),
            None => ReminderScheduler::new(owner_id, self.surface.clone()).status(now),
        }
    }

    #[cfg(test)]
    pub async fn tracked(&self) -> usize {
        self.schedulers.lock().await.len()
    }

    fn scheduler_for<'a>(
        &self,
        schedulers: &'a mut HashMap<Uuid, ReminderScheduler>,
        owner_id: Uuid,
    ) -> &'a mut ReminderScheduler {
        schedulers
            .entry(owner_id)
            .or_insert_with(|| ReminderScheduler::new(owner_id, self.surface.clone()))
    }
}
