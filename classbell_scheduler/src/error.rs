use classbell_models::alarm::AlarmId;
use classbell_storage::StorageError;
use thiserror::Error;

use crate::time_math::TimeError;

#[derive(Debug, Error)]
pub enum AlarmError {
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Alarm with id {0} not found")]
    NotFound(AlarmId),

    #[error("Alarm {alarm_id} is saved but may not fire: {source}")]
    NotificationScheduling {
        alarm_id: AlarmId,
        #[source]
        source: anyhow::Error,
    },

    #[error(transparent)]
    Storage(StorageError),
}

impl AlarmError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        AlarmError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn scheduling(alarm_id: AlarmId, source: anyhow::Error) -> Self {
        AlarmError::NotificationScheduling { alarm_id, source }
    }
}

impl From<StorageError> for AlarmError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::NotFound(id) => AlarmError::NotFound(id),
            other => AlarmError::Storage(other),
        }
    }
}

impl From<TimeError> for AlarmError {
    fn from(value: TimeError) -> Self {
        AlarmError::validation("time", value.to_string())
    }
}
