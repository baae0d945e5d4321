use std::fmt;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::alarm::AlarmId;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Main,
    Early,
}

impl TriggerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::Main => "main",
            TriggerKind::Early => "early",
        }
    }
}

/// Data attached to every registered notification so it can be traced back
/// to the alarm it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    pub alarm_id: AlarmId,
    pub kind: TriggerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<Weekday>,
}

impl NotificationPayload {
    pub fn new(alarm_id: AlarmId, kind: TriggerKind, day: Option<Weekday>) -> Self {
        Self { alarm_id, kind, day }
    }

    /// The composite key `(alarm, kind[, day])` the registration is stored under.
    pub fn notification_id(&self) -> NotificationId {
        let id = match self.day {
            Some(day) => format!("{}:{}:{}", self.alarm_id, self.kind.as_str(), day),
            None => format!("{}:{}", self.alarm_id, self.kind.as_str()),
        };
        NotificationId(id)
    }
}

/// Identifier of a registration with the host notification primitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
