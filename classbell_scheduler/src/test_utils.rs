use std::{
    collections::{BTreeMap, HashSet},
    sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use anyhow::bail;
use async_trait::async_trait;
use classbell_models::{
    alarm::AlarmId,
    notification::{NotificationId, TriggerKind},
};

use crate::gateway::{
    NotificationGateway, NotificationHandle, NotificationRequest, ScheduledNotification,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Schedule(NotificationRequest),
    Cancel(NotificationId),
}

/// In-memory gateway that records every call and can be told to fail.
pub struct RecordingNotificationGateway {
    registered: Mutex<BTreeMap<NotificationId, NotificationRequest>>,
    calls: Mutex<Vec<GatewayCall>>,
    permission: AtomicBool,
    failing: Mutex<HashSet<NotificationId>>,
    fail_all: AtomicBool,
    fail_cancel: AtomicBool,
}

impl Default for RecordingNotificationGateway {
    fn default() -> Self {
        Self {
            registered: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
            permission: AtomicBool::new(true),
            failing: Mutex::new(HashSet::new()),
            fail_all: AtomicBool::new(false),
            fail_cancel: AtomicBool::new(false),
        }
    }
}

impl RecordingNotificationGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_permission(&self, granted: bool) {
        self.permission.store(granted, Ordering::Relaxed);
    }

    pub fn fail_schedule_of(&self, id: NotificationId) {
        self.failing.lock().unwrap().insert(id);
    }

    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::Relaxed);
    }

    pub fn set_fail_cancel(&self, fail: bool) {
        self.fail_cancel.store(fail, Ordering::Relaxed);
    }

    /// Puts a registration in place without going through `schedule`, as a
    /// previous process run would have left it.
    pub fn preload(&self, request: NotificationRequest) {
        self.registered
            .lock()
            .unwrap()
            .insert(request.id.clone(), request);
    }

    pub fn registered(&self) -> Vec<NotificationRequest> {
        self.registered.lock().unwrap().values().cloned().collect()
    }

    pub fn registered_for(&self, alarm_id: AlarmId) -> Vec<NotificationRequest> {
        self.registered()
            .into_iter()
            .filter(|request| request.payload.alarm_id == alarm_id)
            .collect()
    }

    pub fn kinds_for(&self, alarm_id: AlarmId) -> Vec<TriggerKind> {
        self.registered_for(alarm_id)
            .into_iter()
            .map(|request| request.payload.kind)
            .collect()
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn scheduled_calls(&self) -> Vec<NotificationRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::Schedule(request) => Some(request),
                GatewayCall::Cancel(_) => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl NotificationGateway for RecordingNotificationGateway {
    async fn request_permission(&self) -> anyhow::Result<bool> {
        Ok(self.permission.load(Ordering::Relaxed))
    }

    async fn schedule(&self, request: NotificationRequest) -> anyhow::Result<NotificationHandle> {
        self.calls
            .lock()
            .unwrap()
            .push(GatewayCall::Schedule(request.clone()));

        let refused = self.failing.lock().unwrap().contains(&request.id);
        if refused || self.fail_all.load(Ordering::Relaxed) {
            bail!("host refused {}", request.id);
        }

        let id = request.id.clone();
        self.registered.lock().unwrap().insert(id.clone(), request);
        Ok(NotificationHandle { id })
    }

    async fn cancel(&self, id: &NotificationId) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(GatewayCall::Cancel(id.clone()));

        if self.fail_cancel.load(Ordering::Relaxed) {
            bail!("host refused to cancel {id}");
        }

        self.registered.lock().unwrap().remove(id);
        Ok(())
    }

    async fn list_scheduled(&self) -> anyhow::Result<Vec<ScheduledNotification>> {
        Ok(self
            .registered
            .lock()
            .unwrap()
            .values()
            .map(|request| ScheduledNotification {
                id: request.id.clone(),
                payload: request.payload,
            })
            .collect())
    }
}
