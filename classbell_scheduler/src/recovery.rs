use std::collections::{BTreeMap, HashSet};

use classbell_models::{
    alarm::{Alarm, AlarmId},
    notification::NotificationId,
};

use crate::{AlarmError, context::SchedulerContext, gateway::NotificationHandle};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryReport {
    pub permission_granted: bool,
    pub rescheduled_alarms: usize,
    pub registrations: usize,
    pub orphans_cancelled: usize,
    pub failed_alarms: Vec<AlarmId>,
}

/// Rebuilds the host's registrations from the stored alarms at start-up.
///
/// Running it again without any alarm change leaves the same registrations
/// in place.
pub struct RecoveryReconciler {
    ctx: SchedulerContext,
}

impl RecoveryReconciler {
    pub fn new(ctx: SchedulerContext) -> Self {
        Self { ctx }
    }

    pub async fn run(&self) -> Result<RecoveryReport, AlarmError> {
        let mut report = RecoveryReport::default();

        report.permission_granted = match self.ctx.gateway.request_permission().await {
            Ok(granted) => granted,
            Err(err) => {
                log::warn!("[RECOVERY] Permission request failed: {err:#}");
                false
            }
        };
        if !report.permission_granted {
            log::warn!("[RECOVERY] Notification permission not granted, alarms stay dormant");
            return Ok(report);
        }

        let alarms = self.ctx.store.list().await?;
        let active: HashSet<AlarmId> = alarms
            .iter()
            .filter(|alarm| alarm.is_active)
            .map(|alarm| alarm.id)
            .collect();

        report.orphans_cancelled = self.cancel_orphans(&active).await?;

        for alarm in alarms.iter().filter(|alarm| alarm.is_active) {
            match self.reschedule(alarm).await {
                Ok(handles) => {
                    report.rescheduled_alarms += 1;
                    report.registrations += handles.len();
                }
                Err(AlarmError::Storage(err)) => return Err(AlarmError::Storage(err)),
                Err(err) => {
                    log::error!("[RECOVERY] Alarm {}: {err:#}", alarm.id);
                    report.failed_alarms.push(alarm.id);
                }
            }
        }

        log::info!(
            "[RECOVERY] Rescheduled {} alarms with {} registrations, cancelled {} orphans, {} failed",
            report.rescheduled_alarms,
            report.registrations,
            report.orphans_cancelled,
            report.failed_alarms.len()
        );
        Ok(report)
    }

    async fn reschedule(&self, alarm: &Alarm) -> Result<Vec<NotificationHandle>, AlarmError> {
        self.ctx.cancel_registrations(alarm.id).await?;
        self.ctx.register(alarm).await
    }

    /// Cancels registrations, known to the host or only to the ledger, that
    /// belong to no active alarm.
    async fn cancel_orphans(&self, active: &HashSet<AlarmId>) -> Result<usize, AlarmError> {
        let mut candidates: BTreeMap<NotificationId, AlarmId> = self
            .ctx
            .ledger
            .entries()
            .await?
            .into_iter()
            .map(|(id, entry)| (id, entry.payload.alarm_id))
            .collect();

        match self.ctx.gateway.list_scheduled().await {
            Ok(listed) => candidates.extend(
                listed
                    .into_iter()
                    .map(|scheduled| (scheduled.id, scheduled.payload.alarm_id)),
            ),
            Err(err) => log::warn!("[RECOVERY] Could not list host registrations: {err:#}"),
        }

        let mut cancelled = 0;
        for (id, alarm_id) in candidates {
            if active.contains(&alarm_id) {
                continue;
            }

            if let Err(err) = self.ctx.gateway.cancel(&id).await {
                log::warn!("[RECOVERY] Could not cancel orphan {id}: {err:#}");
                continue;
            }
            self.ctx.ledger.forget(&id).await?;
            log::info!("[RECOVERY] Cancelled orphan {id} of alarm {alarm_id}");
            cancelled += 1;
        }

        Ok(cancelled)
    }
}

#[cfg(test)]
mod tests;
