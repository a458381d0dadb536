use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, warn};

use crate::metrics::{compute_water_intake, ActivityLevel};
use crate::models::record::{RecordPayload, RecordType, WaterIntakePayload};
use crate::persistence::{RecordAdapter, WATER_PREFERENCE_LIMIT};
use crate::reminders::{PermissionState, ReminderRegistry};
use crate::session::Session;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct WaterIntakeResult {
    /// Whole liters per day.
    pub daily_intake: u32,
    pub reminder: bool,
}

/// Water intake calculator state. Preferences are restored from the
/// latest stored record.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WaterIntakeCalculatorView {
    pub weight: Option<f64>,
    pub activity_level: ActivityLevel,
    pub reminders_enabled: bool,
    pub result: Option<WaterIntakeResult>,
    pub saved: bool,
}

impl WaterIntakeCalculatorView {
    /// Restores stored preferences, then replaces the stored reminder flag
    /// with the live toggle. The flag only stays on while permission is
    /// granted and the owner's scheduler is enabled. Guests never have it on.
    pub async fn load(
        &mut self,
        records: &RecordAdapter,
        reminders: &ReminderRegistry,
        session: &Session,
        now: NaiveDateTime,
    ) {
        self.restore_preferences(records, session).await;

        let Some(owner_id) = session.owner_id() else {
            self.reminders_enabled = false;
            return;
        };
        let status = reminders.status(owner_id, now).await;
        if self.reminders_enabled && !status.enabled {
            debug!(
                "Stored reminder flag for {owner_id} dropped, permission is {:?}",
                status.permission
            );
        }
        self.reminders_enabled = status.permission == PermissionState::Granted && status.enabled;
    }

    pub async fn restore_preferences(&mut self, records: &RecordAdapter, session: &Session) {
        let latest = match records
            .load_history(session, RecordType::WaterIntake, WATER_PREFERENCE_LIMIT)
            .await
        {
            Ok(rows) => rows.into_iter().next(),
            Err(e) => {
                warn!("Keeping current water preferences, load failed: {e}");
                None
            }
        };

        if let Some(prefs) = latest.and_then(|r| r.water_intake_payload()) {
            self.weight = Some(prefs.weight);
            self.activity_level = prefs.activity_level;
            self.reminders_enabled = prefs.reminders_enabled;
        }
    }

    /// Turning reminders on asks for permission and arms today's timers;
    /// turning them off only clears the toggle. Guests cannot receive
    /// reminders. Returns the resulting toggle.
    pub async fn toggle_reminders(
        &mut self,
        reminders: &ReminderRegistry,
        session: &Session,
        enable: bool,
        now: NaiveDateTime,
    ) -> bool {
        let Some(owner_id) = session.owner_id() else {
            self.reminders_enabled = false;
            return false;
        };

        let status = if enable {
            reminders.enable(owner_id, now).await
        } else {
            reminders.disable(owner_id, now).await
        };
        self.reminders_enabled = status.enabled;
        self.reminders_enabled
    }

    /// Computes, stores for signed-in users with the current reminder
    /// toggle, and arms reminders when the toggle is on. Invalid input
    /// leaves the view untouched and returns `None`.
    pub async fn calculate(
        &mut self,
        records: &RecordAdapter,
        reminders: &ReminderRegistry,
        session: &Session,
        weight_kg: Option<f64>,
        activity_level: ActivityLevel,
        now: NaiveDateTime,
    ) -> Option<WaterIntakeResult> {
        let weight = weight_kg?;
        let daily_intake = compute_water_intake(weight, activity_level)?;

        self.weight = Some(weight);
        self.activity_level = activity_level;
        let result = WaterIntakeResult {
            daily_intake,
            reminder: self.reminders_enabled,
        };
        self.result = Some(result);
        self.saved = false;

        let payload = RecordPayload::WaterIntake(WaterIntakePayload {
            weight,
            activity_level,
            daily_intake,
            reminders_enabled: self.reminders_enabled,
        });
        match records.save_record(session, &payload).await {
            Ok(saved) => self.saved = saved.is_some(),
            Err(e) => warn!("Water intake shown but not saved: {e}"),
        }

        if self.reminders_enabled {
            if let Some(owner_id) = session.owner_id() {
                reminders.arm(owner_id, now).await;
            }
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculators::tests::FailingStore;
    use crate::persistence::InMemoryRecordStore;
    use crate::reminders::notify::{NotificationPermission, UnavailableNotifier};
    use crate::reminders::scheduler::tests::{at, RecordingSurface};
    use std::sync::Arc;
    use std::time::Duration;
    use uuid::Uuid;

    fn registry(answer: NotificationPermission) -> (Arc<RecordingSurface>, ReminderRegistry) {
        let surface = Arc::new(RecordingSurface::answering(answer));
        let registry = ReminderRegistry::new(surface.clone());
        (surface, registry)
    }

    #[tokio::test]
    async fn test_calculation_saves_preferences_for_restore() {
        let records = RecordAdapter::new(Arc::new(InMemoryRecordStore::new()));
        let (_, reminders) = registry(NotificationPermission::Default);
        let session = Session::for_user(Uuid::new_v4());

        let mut view = WaterIntakeCalculatorView::default();
        let result = view
            .calculate(&records, &reminders, &session, Some(70.0), ActivityLevel::Active, at(9, 0))
            .await
            .unwrap();
        // 70 * 0.033 * 1.4 = 3.234
        assert_eq!(result.daily_intake, 3);
        assert!(view.saved);

        let mut restored = WaterIntakeCalculatorView::default();
        restored.load(&records, &reminders, &session, at(9, 5)).await;
        assert_eq!(restored.weight, Some(70.0));
        assert_eq!(restored.activity_level, ActivityLevel::Active);
        assert!(!restored.reminders_enabled);
        assert!(restored.result.is_none());
    }

    #[tokio::test]
    async fn test_guest_gets_result_without_saving() {
        let store = Arc::new(InMemoryRecordStore::new());
        let records = RecordAdapter::new(store.clone());
        let (_, reminders) = registry(NotificationPermission::Granted);
        let guest = Session::guest();

        let mut view = WaterIntakeCalculatorView::default();
        let result = view
            .calculate(&records, &reminders, &guest, Some(60.0), ActivityLevel::Sedentary, at(9, 0))
            .await;

        assert_eq!(result.map(|r| r.daily_intake), Some(2));
        assert!(!view.saved);
        assert_eq!(store.len().await, 0);
        assert!(!view.toggle_reminders(&reminders, &guest, true, at(9, 0)).await);
    }

    #[tokio::test]
    async fn test_invalid_weight_is_skipped() {
        let store = Arc::new(InMemoryRecordStore::new());
        let records = RecordAdapter::new(store.clone());
        let (_, reminders) = registry(NotificationPermission::Default);
        let session = Session::for_user(Uuid::new_v4());

        let mut view = WaterIntakeCalculatorView::default();
        for weight in [Some(0.0), Some(-10.0), None] {
            let result = view
                .calculate(&records, &reminders, &session, weight, ActivityLevel::Moderate, at(9, 0))
                .await;
            assert!(result.is_none());
        }
        assert!(view.result.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enabled_reminders_arm_on_calculate() {
        let records = RecordAdapter::new(Arc::new(InMemoryRecordStore::new()));
        let (surface, reminders) = registry(NotificationPermission::Granted);
        let session = Session::for_user(Uuid::new_v4());
        let mut view = WaterIntakeCalculatorView::default();

        assert!(view.toggle_reminders(&reminders, &session, true, at(18, 30)).await);
        let result = view
            .calculate(&records, &reminders, &session, Some(70.0), ActivityLevel::Moderate, at(18, 30))
            .await
            .unwrap();
        assert!(result.reminder);

        // One timer from the toggle and one from the calculation, both for 20:00.
        tokio::time::sleep(Duration::from_secs(2 * 3600)).await;
        tokio::task::yield_now().await;
        assert_eq!(surface.sent_count(), 2);
    }

    #[tokio::test]
    async fn test_live_toggle_overrides_restored_flag_once_granted() {
        let records = RecordAdapter::new(Arc::new(InMemoryRecordStore::new()));
        let (_, reminders) = registry(NotificationPermission::Granted);
        let session = Session::for_user(Uuid::new_v4());

        let mut view = WaterIntakeCalculatorView::default();
        view.toggle_reminders(&reminders, &session, true, at(21, 0)).await;
        view.calculate(&records, &reminders, &session, Some(80.0), ActivityLevel::Moderate, at(21, 0))
            .await;
        view.toggle_reminders(&reminders, &session, false, at(21, 1)).await;

        let mut restored = WaterIntakeCalculatorView::default();
        restored.load(&records, &reminders, &session, at(21, 2)).await;
        assert_eq!(restored.weight, Some(80.0));
        assert!(!restored.reminders_enabled);
    }

    #[tokio::test]
    async fn test_unavailable_notifications_keep_toggle_off() {
        let records = RecordAdapter::new(Arc::new(InMemoryRecordStore::new()));
        let reminders = ReminderRegistry::new(Arc::new(UnavailableNotifier));
        let session = Session::for_user(Uuid::new_v4());
        let mut view = WaterIntakeCalculatorView::default();

        assert!(!view.toggle_reminders(&reminders, &session, true, at(9, 0)).await);
        let result = view
            .calculate(&records, &reminders, &session, Some(70.0), ActivityLevel::Moderate, at(9, 0))
            .await
            .unwrap();
        assert!(!result.reminder);
    }

    async fn seed_reminder_flag(records: &RecordAdapter, session: &Session) {
        let payload = RecordPayload::WaterIntake(WaterIntakePayload {
            weight: 70.0,
            activity_level: ActivityLevel::Moderate,
            daily_intake: 3,
            reminders_enabled: true,
        });
        records.save_record(session, &payload).await.unwrap();
    }

    #[tokio::test]
    async fn test_stored_flag_dropped_when_notifications_unavailable() {
        let records = RecordAdapter::new(Arc::new(InMemoryRecordStore::new()));
        let reminders = ReminderRegistry::new(Arc::new(UnavailableNotifier));
        let session = Session::for_user(Uuid::new_v4());
        seed_reminder_flag(&records, &session).await;

        let mut view = WaterIntakeCalculatorView::default();
        view.load(&records, &reminders, &session, at(9, 0)).await;
        assert_eq!(view.weight, Some(70.0));
        assert!(!view.reminders_enabled);

        let result = view
            .calculate(&records, &reminders, &session, Some(70.0), ActivityLevel::Moderate, at(9, 0))
            .await
            .unwrap();
        assert!(!result.reminder);

        let latest = records
            .load_history(&session, RecordType::WaterIntake, WATER_PREFERENCE_LIMIT)
            .await
            .unwrap();
        assert!(!latest[0].water_intake_payload().unwrap().reminders_enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stored_flag_without_permission_goes_through_request() {
        let records = RecordAdapter::new(Arc::new(InMemoryRecordStore::new()));
        let (surface, reminders) = registry(NotificationPermission::Granted);
        let session = Session::for_user(Uuid::new_v4());
        seed_reminder_flag(&records, &session).await;

        let mut view = WaterIntakeCalculatorView::default();
        view.load(&records, &reminders, &session, at(9, 15)).await;
        assert!(!view.reminders_enabled);

        assert!(view.toggle_reminders(&reminders, &session, true, at(9, 15)).await);
        let result = view
            .calculate(&records, &reminders, &session, Some(70.0), ActivityLevel::Moderate, at(9, 15))
            .await
            .unwrap();
        assert!(result.reminder);
        assert_eq!(*surface.requests.lock().unwrap(), 1);

        // Six instants from the toggle, six more from the calculation.
        tokio::time::sleep(Duration::from_secs(24 * 3600)).await;
        tokio::task::yield_now().await;
        assert_eq!(surface.sent_count(), 12);
    }

    #[tokio::test]
    async fn test_guest_load_never_restores_flag() {
        let records = RecordAdapter::new(Arc::new(InMemoryRecordStore::new()));
        let (_, reminders) = registry(NotificationPermission::Granted);
        let mut view = WaterIntakeCalculatorView {
            reminders_enabled: true,
            ..Default::default()
        };

        view.load(&records, &reminders, &Session::guest(), at(9, 0)).await;
        assert!(!view.reminders_enabled);
    }

    #[tokio::test]
    async fn test_store_failure_keeps_current_preferences() {
        let records = RecordAdapter::new(Arc::new(FailingStore));
        let (_, reminders) = registry(NotificationPermission::Default);
        let session = Session::for_user(Uuid::new_v4());
        let mut view = WaterIntakeCalculatorView {
            weight: Some(65.0),
            activity_level: ActivityLevel::Sedentary,
            ..Default::default()
        };

        view.load(&records, &reminders, &session, at(9, 0)).await;
        assert_eq!(view.weight, Some(65.0));

        let result = view
            .calculate(&records, &reminders, &session, Some(65.0), ActivityLevel::Sedentary, at(9, 0))
            .await;
        assert_eq!(result.map(|r| r.daily_intake), Some(2));
        assert!(!view.saved);
    }
}
