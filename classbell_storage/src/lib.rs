mod alarm;
mod error;
mod kv;
mod ledger;
mod preferences;
pub mod sqlite;

pub use alarm::{AlarmStore, JsonAlarmStore};
pub use error::StorageError;
pub use kv::{InMemoryKeyValueStore, KeyValueStore};
pub use ledger::{LedgerEntry, NotificationLedger};
pub use preferences::PreferencesStore;

pub const ALARMS_KEY: &str = "@ClassAlarm:alarms";
pub const SETTINGS_KEY: &str = "@ClassAlarm:settings";
pub const LEDGER_KEY: &str = "@ClassAlarm:scheduled_notifications";
