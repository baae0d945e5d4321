use std::sync::Arc;

use anyhow::anyhow;
use classbell_models::alarm::{Alarm, AlarmId};
use classbell_storage::{
    AlarmStore, JsonAlarmStore, KeyValueStore, LedgerEntry, NotificationLedger, PreferencesStore,
};

use crate::{
    AlarmError,
    clock::Clock,
    gateway::{NotificationGateway, NotificationHandle},
    triggers::{SchedulerOptions, plan_triggers},
};

/// Collaborators shared by [`crate::AlarmScheduler`] and
/// [`crate::RecoveryReconciler`].
#[derive(Clone)]
pub struct SchedulerContext {
    pub store: Arc<dyn AlarmStore>,
    pub ledger: Arc<NotificationLedger>,
    pub preferences: Arc<PreferencesStore>,
    pub gateway: Arc<dyn NotificationGateway>,
    pub clock: Arc<dyn Clock>,
    pub options: SchedulerOptions,
}

impl SchedulerContext {
    /// Lays the alarm list, preferences and ledger over one key-value store.
    pub fn new(
        kv: Arc<dyn KeyValueStore>,
        gateway: Arc<dyn NotificationGateway>,
        clock: Arc<dyn Clock>,
        options: SchedulerOptions,
    ) -> Self {
        Self {
            store: Arc::new(JsonAlarmStore::new(kv.clone())),
            ledger: Arc::new(NotificationLedger::new(kv.clone())),
            preferences: Arc::new(PreferencesStore::new(kv)),
            gateway,
            clock,
            options,
        }
    }

    /// Cancels every registration of `alarm_id`, whether the host still
    /// lists it or only the ledger remembers it.
    pub(crate) async fn cancel_registrations(&self, alarm_id: AlarmId) -> Result<(), AlarmError> {
        let recorded: Vec<_> = self
            .ledger
            .entries()
            .await?
            .into_iter()
            .filter(|(_, entry)| entry.payload.alarm_id == alarm_id)
            .map(|(id, _)| id)
            .collect();

        for id in &recorded {
            self.gateway
                .cancel(id)
                .await
                .map_err(|err| AlarmError::scheduling(alarm_id, err))?;
        }

        let listed = self
            .gateway
            .cancel_all_for_alarm(alarm_id)
            .await
            .map_err(|err| AlarmError::scheduling(alarm_id, err))?;

        self.ledger.forget_alarm(alarm_id).await?;

        log::info!(
            "[CANCEL] Alarm {alarm_id}: {} recorded, {} listed by host",
            recorded.len(),
            listed.len()
        );
        Ok(())
    }

    /// Registers the triggers `alarm` should currently have. Callers cancel
    /// first; this never removes anything.
    ///
    /// One failing registration does not stop the others. If any failed, the
    /// first failure is returned once all were attempted.
    pub(crate) async fn register(
        &self,
        alarm: &Alarm,
    ) -> Result<Vec<NotificationHandle>, AlarmError> {
        if !alarm.is_active {
            return Ok(Vec::new());
        }

        let preferences = self.preferences.load().await?;
        if !preferences.notifications {
            log::info!("[SCHEDULE] Notifications are turned off, alarm {} stays dormant", alarm.id);
            return Ok(Vec::new());
        }

        let granted = self
            .gateway
            .request_permission()
            .await
            .map_err(|err| AlarmError::scheduling(alarm.id, err))?;
        if !granted {
            return Err(AlarmError::scheduling(
                alarm.id,
                anyhow!("notification permission denied"),
            ));
        }

        let now = self.clock.now();
        let requests = plan_triggers(alarm, now, &self.options, preferences.early_reminders);
        let total = requests.len();
        let mut handles = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for request in requests {
            let id = request.id.clone();
            let entry = LedgerEntry {
                payload: request.payload,
                title: request.content.title.clone(),
                trigger_at: request.trigger.at,
                recorded_at: now,
            };

            match self.gateway.schedule(request).await {
                Ok(handle) => {
                    log::info!("[SCHEDULE] Registered {} at {}", id, entry.trigger_at);
                    self.ledger.record(id, entry).await?;
                    handles.push(handle);
                }
                Err(err) => {
                    log::warn!(
                        "[SCHEDULE] Failed to register {id} for alarm {}: {err:#}",
                        alarm.id
                    );
                    failures.push((id, err));
                }
            }
        }

        match failures.into_iter().next() {
            None => Ok(handles),
            Some((id, err)) => Err(AlarmError::scheduling(
                alarm.id,
                err.context(format!(
                    "{} of {total} registrations succeeded, {id} failed",
                    handles.len()
                )),
            )),
        }
    }
}
