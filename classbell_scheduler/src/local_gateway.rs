use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use chrono::{Days, NaiveDateTime};
use classbell_models::notification::{NotificationId, NotificationPayload};
use tokio::{
    sync::RwLock,
    task::{self, JoinHandle},
};
use tokio_util::sync::CancellationToken;

use crate::{
    clock::Clock,
    gateway::{
        NotificationContent, NotificationGateway, NotificationHandle, NotificationRequest, Repeat,
        ScheduledNotification,
    },
};

const CANCEL_TIMEOUT: Duration = Duration::from_secs(5);
const WEEK: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredNotification {
    pub id: NotificationId,
    pub payload: NotificationPayload,
    pub content: NotificationContent,
    pub trigger_at: NaiveDateTime,
}

/// Where the local gateway hands notifications once they are due.
#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    async fn deliver(&self, notification: DeliveredNotification);
}

pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn deliver(&self, notification: DeliveredNotification) {
        log::info!(
            "[FIRED] {} {}: {} (sound: {})",
            notification.id,
            notification.content.title,
            notification.content.body,
            notification.content.sound
        );
    }
}

struct RegistrationHandle {
    task: JoinHandle<()>,
    cancellation_token: CancellationToken,
    payload: NotificationPayload,
}

impl RegistrationHandle {
    async fn cancel(self) {
        self.cancellation_token.cancel();
        let _ = tokio::time::timeout(CANCEL_TIMEOUT, self.task).await;
    }
}

type RegistrationStore = RwLock<HashMap<NotificationId, RegistrationHandle>>;

/// In-process stand-in for the host notification primitive: one tokio task
/// per registration sleeping until the trigger instant.
pub struct LocalNotificationGateway {
    registrations: Arc<RegistrationStore>,
    sink: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    shutdown: CancellationToken,
}

impl LocalNotificationGateway {
    pub fn new(sink: Arc<dyn NotificationSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            registrations: Arc::new(RwLock::new(HashMap::new())),
            sink,
            clock,
            shutdown: CancellationToken::new(),
        }
    }

    fn spawn_registration(&self, request: NotificationRequest) -> RegistrationHandle {
        let cancellation_token = self.shutdown.child_token();
        let task_cancellation_token = cancellation_token.clone();
        let payload = request.payload;
        let sink = Arc::clone(&self.sink);
        let delay = (request.trigger.at - self.clock.now())
            .to_std()
            .unwrap_or(Duration::ZERO);

        let task = task::spawn(async move {
            run_registration(request, delay, sink, task_cancellation_token).await;
        });

        RegistrationHandle {
            task,
            cancellation_token,
            payload,
        }
    }

    async fn clean_finished(&self) {
        let mut registrations = self.registrations.write().await;
        let before = registrations.len();
        registrations.retain(|_, handle| !handle.task.is_finished());
        let after = registrations.len();

        if before != after {
            log::info!("Cleaned up {} fired registrations", before - after);
        }
    }
}

impl Drop for LocalNotificationGateway {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[async_trait]
impl NotificationGateway for LocalNotificationGateway {
    async fn request_permission(&self) -> anyhow::Result<bool> {
        Ok(true)
    }

    async fn schedule(&self, request: NotificationRequest) -> anyhow::Result<NotificationHandle> {
        let id = request.id.clone();
        let replaced = {
            let mut registrations = self.registrations.write().await;
            let handle = self.spawn_registration(request);
            match registrations.entry(id.clone()) {
                Entry::Occupied(mut e) => Some(e.insert(handle)),
                Entry::Vacant(e) => {
                    e.insert(handle);
                    None
                }
            }
        };

        if let Some(previous) = replaced {
            previous.cancel().await;
        }

        Ok(NotificationHandle { id })
    }

    async fn cancel(&self, id: &NotificationId) -> anyhow::Result<()> {
        let removed = self.registrations.write().await.remove(id);
        if let Some(handle) = removed {
            handle.cancel().await;
            log::info!("[CANCEL] Stopped registration {id}");
        }

        Ok(())
    }

    async fn list_scheduled(&self) -> anyhow::Result<Vec<ScheduledNotification>> {
        self.clean_finished().await;

        let registrations = self.registrations.read().await;
        Ok(registrations
            .iter()
            .map(|(id, handle)| ScheduledNotification {
                id: id.clone(),
                payload: handle.payload,
            })
            .collect())
    }
}

async fn run_registration(
    request: NotificationRequest,
    mut delay: Duration,
    sink: Arc<dyn NotificationSink>,
    cancellation_token: CancellationToken,
) {
    let NotificationRequest {
        id,
        content,
        payload,
        trigger,
    } = request;
    let mut trigger_at = trigger.at;

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => {
                log::debug!("Registration {id} was cancelled");
                break;
            }
            _ = tokio::time::sleep(delay) => {
                sink.deliver(DeliveredNotification {
                    id: id.clone(),
                    payload,
                    content: content.clone(),
                    trigger_at,
                })
                .await;

                match trigger.repeat {
                    Repeat::Never => break,
                    Repeat::Weekly => {
                        trigger_at = trigger_at + Days::new(7);
                        delay = WEEK;
                    }
                }
            }
        }
    }
}
