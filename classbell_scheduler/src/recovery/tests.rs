use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, Weekday};
use classbell_models::{
    alarm::AlarmDraft,
    notification::{NotificationPayload, TriggerKind},
    recurrence::{Recurrence, WeekdaySet},
};
use classbell_storage::{InMemoryKeyValueStore, KeyValueStore, LedgerEntry, StorageError};

use super::*;
use crate::{
    AlarmScheduler,
    clock::FixedClock,
    gateway::{NotificationContent, NotificationRequest, Repeat, Trigger},
    test_utils::{GatewayCall, RecordingNotificationGateway},
    triggers::SchedulerOptions,
};

struct TestContext {
    gateway: Arc<RecordingNotificationGateway>,
    scheduler: AlarmScheduler,
    reconciler: RecoveryReconciler,
}

impl TestContext {
    fn new() -> Self {
        Self::with_store(Arc::new(InMemoryKeyValueStore::new()))
    }

    fn with_store(kv: Arc<dyn KeyValueStore>) -> Self {
        let gateway = Arc::new(RecordingNotificationGateway::new());
        let clock = Arc::new(FixedClock::new(monday_at(8, 0)));
        let ctx = SchedulerContext::new(kv, gateway.clone(), clock, SchedulerOptions::default());

        Self {
            gateway,
            scheduler: AlarmScheduler::new(ctx.clone()),
            reconciler: RecoveryReconciler::new(ctx),
        }
    }

    async fn create(&self, time: &str, days: &[Weekday], is_active: bool) -> Alarm {
        self.scheduler
            .create(AlarmDraft {
                subject: "History".to_string(),
                classroom: "B12".to_string(),
                time: time.to_string(),
                recurrence: Some(Recurrence::Weekly {
                    days: WeekdaySet::new(days.iter().copied()).unwrap(),
                }),
                notify_before: true,
                color: None,
                sound: None,
                notes: None,
                is_active,
            })
            .await
            .unwrap()
    }

    async fn ledger_ids(&self) -> Vec<String> {
        self.scheduler
            .context()
            .ledger
            .entries()
            .await
            .unwrap()
            .into_keys()
            .map(|id| id.to_string())
            .collect()
    }
}

struct UnreadableKeyValueStore;

#[async_trait]
impl KeyValueStore for UnreadableKeyValueStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Backend("storage unavailable".to_string()))
    }

    async fn set(&self, _key: &str, _value: String) -> Result<(), StorageError> {
        Err(StorageError::Backend("storage unavailable".to_string()))
    }

    async fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Backend("storage unavailable".to_string()))
    }

    async fn clear(&self) -> Result<(), StorageError> {
        Err(StorageError::Backend("storage unavailable".to_string()))
    }
}

// 2026-10-19 is a Monday.
fn monday_at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn leftover(
    alarm_id: AlarmId,
    kind: TriggerKind,
    day: Weekday,
    at: NaiveDateTime,
) -> NotificationRequest {
    let payload = NotificationPayload::new(alarm_id, kind, Some(day));
    NotificationRequest {
        id: payload.notification_id(),
        content: NotificationContent {
            title: "Class Alarm: Old".to_string(),
            body: "Old in Nowhere starts soon!".to_string(),
            sound: "default".to_string(),
        },
        payload,
        trigger: Trigger {
            at,
            repeat: Repeat::Weekly,
        },
    }
}

#[tokio::test]
async fn recovery_is_idempotent() {
    let ctx = TestContext::new();
    ctx.create("9:00 AM", &[Weekday::Mon, Weekday::Wed], true).await;
    ctx.create("1:00 PM", &[Weekday::Fri], true).await;
    let before = ctx.gateway.registered();

    let first = ctx.reconciler.run().await.unwrap();
    let after_first = ctx.gateway.registered();
    let second = ctx.reconciler.run().await.unwrap();
    let after_second = ctx.gateway.registered();

    assert_eq!(before, after_first);
    assert_eq!(after_first, after_second);
    assert_eq!(first, second);
    assert_eq!(
        first,
        RecoveryReport {
            permission_granted: true,
            rescheduled_alarms: 2,
            registrations: 6,
            orphans_cancelled: 0,
            failed_alarms: vec![],
        }
    );
    assert_eq!(ctx.ledger_ids().await.len(), 6);
}

#[tokio::test]
async fn host_registrations_without_alarm_are_cancelled() {
    let ctx = TestContext::new();
    let alarm = ctx.create("9:00 AM", &[Weekday::Mon], true).await;
    ctx.gateway
        .preload(leftover(99, TriggerKind::Main, Weekday::Thu, monday_at(12, 0)));

    let report = ctx.reconciler.run().await.unwrap();

    assert_eq!(report.orphans_cancelled, 1);
    assert!(ctx.gateway.registered_for(99).is_empty());
    assert_eq!(ctx.gateway.registered_for(alarm.id).len(), 2);
}

#[tokio::test]
async fn ledger_only_registrations_are_cancelled_and_forgotten() {
    let ctx = TestContext::new();
    let payload = NotificationPayload::new(7, TriggerKind::Main, None);
    ctx.scheduler
        .context()
        .ledger
        .record(
            payload.notification_id(),
            LedgerEntry {
                payload,
                title: "Class Alarm: Gone".to_string(),
                trigger_at: monday_at(10, 0),
                recorded_at: monday_at(7, 0),
            },
        )
        .await
        .unwrap();

    let report = ctx.reconciler.run().await.unwrap();

    assert_eq!(report.orphans_cancelled, 1);
    assert!(
        ctx.gateway
            .calls()
            .contains(&GatewayCall::Cancel(payload.notification_id()))
    );
    assert!(ctx.ledger_ids().await.is_empty());
}

#[tokio::test]
async fn inactive_alarms_get_no_registrations() {
    let ctx = TestContext::new();
    let alarm = ctx.create("9:00 AM", &[Weekday::Tue], false).await;
    ctx.gateway
        .preload(leftover(alarm.id, TriggerKind::Main, Weekday::Tue, monday_at(9, 0)));

    let report = ctx.reconciler.run().await.unwrap();

    assert_eq!(report.rescheduled_alarms, 0);
    assert_eq!(report.orphans_cancelled, 1);
    assert!(ctx.gateway.registered().is_empty());
    assert!(ctx.gateway.scheduled_calls().is_empty());
}

#[tokio::test]
async fn stale_duplicates_from_unclean_shutdown_are_replaced() {
    let ctx = TestContext::new();
    let alarm = ctx.create("9:00 AM", &[Weekday::Mon], true).await;
    let expected = ctx.gateway.registered_for(alarm.id);

    // A previous run registered the alarm under an older schedule.
    ctx.gateway
        .preload(leftover(alarm.id, TriggerKind::Main, Weekday::Mon, monday_at(7, 30)));
    ctx.gateway
        .preload(leftover(alarm.id, TriggerKind::Early, Weekday::Sat, monday_at(7, 25)));

    let report = ctx.reconciler.run().await.unwrap();

    assert_eq!(report.orphans_cancelled, 0);
    assert_eq!(report.registrations, 2);
    assert_eq!(ctx.gateway.registered_for(alarm.id), expected);
    assert_eq!(ctx.ledger_ids().await, vec!["1:early:Mon", "1:main:Mon"]);
}

#[tokio::test]
async fn permission_denied_changes_nothing() {
    let ctx = TestContext::new();
    ctx.create("9:00 AM", &[Weekday::Mon], true).await;
    ctx.gateway
        .preload(leftover(99, TriggerKind::Main, Weekday::Thu, monday_at(12, 0)));
    ctx.gateway.clear_calls();
    ctx.gateway.set_permission(false);

    let report = ctx.reconciler.run().await.unwrap();

    assert_eq!(
        report,
        RecoveryReport {
            permission_granted: false,
            ..RecoveryReport::default()
        }
    );
    assert!(ctx.gateway.calls().is_empty());
    assert_eq!(ctx.gateway.registered().len(), 3);
}

#[tokio::test]
async fn scheduling_failures_are_collected_per_alarm() {
    let ctx = TestContext::new();
    let healthy = ctx.create("9:00 AM", &[Weekday::Mon], true).await;
    let broken = ctx.create("10:00 AM", &[Weekday::Tue], true).await;
    let broken_early = NotificationPayload::new(broken.id, TriggerKind::Early, Some(Weekday::Tue));
    ctx.gateway.fail_schedule_of(broken_early.notification_id());

    let report = ctx.reconciler.run().await.unwrap();

    assert_eq!(report.failed_alarms, vec![broken.id]);
    assert_eq!(report.rescheduled_alarms, 1);
    assert_eq!(ctx.gateway.registered_for(healthy.id).len(), 2);
    assert_eq!(ctx.gateway.kinds_for(broken.id), vec![TriggerKind::Main]);
}

#[tokio::test]
async fn storage_failure_aborts_recovery() {
    let ctx = TestContext::with_store(Arc::new(UnreadableKeyValueStore));

    let err = ctx.reconciler.run().await.unwrap_err();

    assert!(matches!(err, AlarmError::Storage(StorageError::Backend(_))));
    assert!(ctx.gateway.scheduled_calls().is_empty());
}
