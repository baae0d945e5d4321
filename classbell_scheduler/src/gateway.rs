use async_trait::async_trait;
use chrono::NaiveDateTime;
use classbell_models::{
    alarm::AlarmId,
    notification::{NotificationId, NotificationPayload},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub title: String,
    pub body: String,
    pub sound: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Never,
    Weekly,
}

/// When the host should fire: at or after `at`, then every week if
/// `repeat` says so.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    pub at: NaiveDateTime,
    pub repeat: Repeat,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub id: NotificationId,
    pub content: NotificationContent,
    pub payload: NotificationPayload,
    pub trigger: Trigger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationHandle {
    pub id: NotificationId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledNotification {
    pub id: NotificationId,
    pub payload: NotificationPayload,
}

/// The host's local-notification primitive.
///
/// Scheduling an id that is already registered replaces it. Cancelling an
/// id that is not registered is not an error.
#[async_trait]
pub trait NotificationGateway: Send + Sync + 'static {
    async fn request_permission(&self) -> anyhow::Result<bool>;

    async fn schedule(&self, request: NotificationRequest) -> anyhow::Result<NotificationHandle>;

    async fn cancel(&self, id: &NotificationId) -> anyhow::Result<()>;

    async fn list_scheduled(&self) -> anyhow::Result<Vec<ScheduledNotification>>;

    /// Cancels every registration whose payload points at `alarm_id`.
    async fn cancel_all_for_alarm(&self, alarm_id: AlarmId) -> anyhow::Result<Vec<NotificationId>> {
        let mut cancelled = Vec::new();
        for scheduled in self.list_scheduled().await? {
            if scheduled.payload.alarm_id == alarm_id {
                self.cancel(&scheduled.id).await?;
                cancelled.push(scheduled.id);
            }
        }

        Ok(cancelled)
    }
}
