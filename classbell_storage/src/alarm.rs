use std::sync::Arc;

use async_trait::async_trait;
use classbell_models::alarm::{Alarm, AlarmId, NewAlarm};
use serde::{Serialize, de::DeserializeOwned};

use crate::{ALARMS_KEY, KeyValueStore, StorageError};

#[async_trait]
pub trait AlarmStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Alarm>, StorageError>;
    async fn get(&self, id: AlarmId) -> Result<Option<Alarm>, StorageError>;
    /// Persists `alarm` under a freshly assigned id.
    async fn insert(&self, alarm: NewAlarm) -> Result<Alarm, StorageError>;
    async fn replace(&self, alarm: Alarm) -> Result<Alarm, StorageError>;
    async fn remove(&self, id: AlarmId) -> Result<(), StorageError>;
    async fn clear_all(&self) -> Result<(), StorageError>;
}

/// Keeps the whole alarm list as one JSON array under [`ALARMS_KEY`].
pub struct JsonAlarmStore {
    kv: Arc<dyn KeyValueStore>,
}

impl JsonAlarmStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    async fn load(&self) -> Result<Vec<Alarm>, StorageError> {
        read_json(self.kv.as_ref(), ALARMS_KEY)
            .await
            .map(Option::unwrap_or_default)
    }

    async fn save(&self, alarms: &[Alarm]) -> Result<(), StorageError> {
        write_json(self.kv.as_ref(), ALARMS_KEY, alarms).await
    }
}

#[async_trait]
impl AlarmStore for JsonAlarmStore {
    async fn list(&self) -> Result<Vec<Alarm>, StorageError> {
        self.load().await
    }

    async fn get(&self, id: AlarmId) -> Result<Option<Alarm>, StorageError> {
        let alarms = self.load().await?;
        Ok(alarms.into_iter().find(|alarm| alarm.id == id))
    }

    async fn insert(&self, alarm: NewAlarm) -> Result<Alarm, StorageError> {
        let mut alarms = self.load().await?;
        let id = alarms.iter().map(|alarm| alarm.id).max().unwrap_or(0) + 1;
        let created_alarm = alarm.with_id(id);

        alarms.push(created_alarm.clone());
        self.save(&alarms).await?;

        log::info!("Stored alarm {id}");
        Ok(created_alarm)
    }

    async fn replace(&self, alarm: Alarm) -> Result<Alarm, StorageError> {
        let mut alarms = self.load().await?;
        let slot = alarms
            .iter_mut()
            .find(|stored| stored.id == alarm.id)
            .ok_or(StorageError::NotFound(alarm.id))?;

        *slot = alarm.clone();
        self.save(&alarms).await?;

        Ok(alarm)
    }

    async fn remove(&self, id: AlarmId) -> Result<(), StorageError> {
        let mut alarms = self.load().await?;
        let before = alarms.len();
        alarms.retain(|alarm| alarm.id != id);

        if alarms.len() == before {
            return Err(StorageError::NotFound(id));
        }

        self.save(&alarms).await
    }

    async fn clear_all(&self) -> Result<(), StorageError> {
        self.kv.remove(ALARMS_KEY).await
    }
}

pub(crate) async fn read_json<T: DeserializeOwned>(
    kv: &dyn KeyValueStore,
    key: &'static str,
) -> Result<Option<T>, StorageError> {
    match kv.get(key).await? {
        Some(json) => serde_json::from_str(&json)
            .map(Some)
            .map_err(|source| StorageError::Json { key, source }),
        None => Ok(None),
    }
}

pub(crate) async fn write_json<T: Serialize + ?Sized>(
    kv: &dyn KeyValueStore,
    key: &'static str,
    value: &T,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(value).map_err(|source| StorageError::Json { key, source })?;
    kv.set(key, json).await
}
