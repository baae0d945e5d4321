use std::sync::Arc;

use classbell_models::preferences::Preferences;

use crate::{
    KeyValueStore, SETTINGS_KEY, StorageError,
    alarm::{read_json, write_json},
};

pub struct PreferencesStore {
    kv: Arc<dyn KeyValueStore>,
}

impl PreferencesStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Stored preferences, or the defaults when nothing was saved yet.
    pub async fn load(&self) -> Result<Preferences, StorageError> {
        read_json(self.kv.as_ref(), SETTINGS_KEY)
            .await
            .map(Option::unwrap_or_default)
    }

    pub async fn save(&self, preferences: &Preferences) -> Result<(), StorageError> {
        write_json(self.kv.as_ref(), SETTINGS_KEY, preferences).await
    }
}
