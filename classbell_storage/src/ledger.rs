use std::{collections::BTreeMap, sync::Arc};

use chrono::NaiveDateTime;
use classbell_models::{
    alarm::AlarmId,
    notification::{NotificationId, NotificationPayload},
};
use serde::{Deserialize, Serialize};

use crate::{
    KeyValueStore, LEDGER_KEY, StorageError,
    alarm::{read_json, write_json},
};

/// What was last handed to the host for one registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub payload: NotificationPayload,
    pub title: String,
    pub trigger_at: NaiveDateTime,
    pub recorded_at: NaiveDateTime,
}

/// Durable record of the registrations the scheduler believes are live.
/// Survives restarts so recovery can find registrations left behind by
/// alarms that no longer exist.
pub struct NotificationLedger {
    kv: Arc<dyn KeyValueStore>,
}

type Entries = BTreeMap<NotificationId, LedgerEntry>;

impl NotificationLedger {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    pub async fn entries(&self) -> Result<Entries, StorageError> {
        read_json(self.kv.as_ref(), LEDGER_KEY)
            .await
            .map(Option::unwrap_or_default)
    }

    pub async fn record(&self, id: NotificationId, entry: LedgerEntry) -> Result<(), StorageError> {
        let mut entries = self.entries().await?;
        entries.insert(id, entry);
        self.save(&entries).await
    }

    pub async fn forget(&self, id: &NotificationId) -> Result<(), StorageError> {
        let mut entries = self.entries().await?;
        if entries.remove(id).is_some() {
            self.save(&entries).await?;
        }
        Ok(())
    }

    /// Drops every entry tagged with `alarm_id`, returning the ids removed.
    pub async fn forget_alarm(
        &self,
        alarm_id: AlarmId,
    ) -> Result<Vec<NotificationId>, StorageError> {
        let mut entries = self.entries().await?;
        let removed: Vec<NotificationId> = entries
            .iter()
            .filter(|(_, entry)| entry.payload.alarm_id == alarm_id)
            .map(|(id, _)| id.clone())
            .collect();

        if !removed.is_empty() {
            entries.retain(|_, entry| entry.payload.alarm_id != alarm_id);
            self.save(&entries).await?;
        }

        Ok(removed)
    }

    async fn save(&self, entries: &Entries) -> Result<(), StorageError> {
        write_json(self.kv.as_ref(), LEDGER_KEY, entries).await
    }
}
