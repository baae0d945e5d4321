use classbell_models::alarm::AlarmId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("Stored value under {key} is not valid JSON: {source}")]
    Json {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Alarm with id {0} not found")]
    NotFound(AlarmId),

    #[error("Storage backend failure: {0}")]
    Backend(String),
}
