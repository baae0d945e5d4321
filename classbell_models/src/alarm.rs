use std::fmt;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::{ModelError, recurrence::Recurrence};

pub type AlarmId = i64;

pub const DEFAULT_COLOR: &str = "#7B2CBF";
pub const DEFAULT_SOUND: &str = "default";

/// Wall-clock time of day with minute precision.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeOfDay", into = "RawTimeOfDay")]
pub struct TimeOfDay(NaiveTime);

#[derive(Serialize, Deserialize)]
struct RawTimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Result<Self, ModelError> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or(ModelError::TimeOutOfRange { hour, minute })
    }

    pub fn from_time(inner: NaiveTime) -> Self {
        let normalized_time = inner
            .with_second(0)
            .and_then(|time| time.with_nanosecond(0))
            .unwrap_or(inner);
        Self(normalized_time)
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn time(&self) -> &NaiveTime {
        &self.0
    }

    pub fn into_time(self) -> NaiveTime {
        self.0
    }
}

impl TryFrom<RawTimeOfDay> for TimeOfDay {
    type Error = ModelError;

    fn try_from(value: RawTimeOfDay) -> Result<Self, Self::Error> {
        Self::new(value.hour, value.minute)
    }
}

impl From<TimeOfDay> for RawTimeOfDay {
    fn from(value: TimeOfDay) -> Self {
        Self {
            hour: value.hour(),
            minute: value.minute(),
        }
    }
}

/// Renders the 12-hour form the alarm screens use, e.g. `9:05 AM`.
impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (is_pm, hour) = self.0.hour12();
        let period = if is_pm { "PM" } else { "AM" };
        write!(f, "{}:{:02} {}", hour, self.minute(), period)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlarmColor(String);

impl AlarmColor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AlarmColor {
    fn default() -> Self {
        Self(DEFAULT_COLOR.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlarmSound(String);

impl AlarmSound {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AlarmSound {
    fn default() -> Self {
        Self(DEFAULT_SOUND.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alarm {
    pub id: AlarmId,
    pub subject: String,
    pub classroom: String,
    pub time_of_day: TimeOfDay,
    pub recurrence: Recurrence,
    pub notify_before: bool,
    #[serde(default)]
    pub color: AlarmColor,
    #[serde(default)]
    pub sound: AlarmSound,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub is_active: bool,
}

/// An alarm as it is handed to the store, before an id is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAlarm {
    pub subject: String,
    pub classroom: String,
    pub time_of_day: TimeOfDay,
    pub recurrence: Recurrence,
    pub notify_before: bool,
    pub color: AlarmColor,
    pub sound: AlarmSound,
    pub notes: Option<String>,
    pub is_active: bool,
}

impl NewAlarm {
    pub fn with_id(self, id: AlarmId) -> Alarm {
        let NewAlarm {
            subject,
            classroom,
            time_of_day,
            recurrence,
            notify_before,
            color,
            sound,
            notes,
            is_active,
        } = self;

        Alarm {
            id,
            subject,
            classroom,
            time_of_day,
            recurrence,
            notify_before,
            color,
            sound,
            notes,
            is_active,
        }
    }
}

/// User input for a new alarm. The time is still text and nothing is
/// validated yet.
#[derive(Debug, Clone)]
pub struct AlarmDraft {
    pub subject: String,
    pub classroom: String,
    pub time: String,
    pub recurrence: Option<Recurrence>,
    pub notify_before: bool,
    pub color: Option<AlarmColor>,
    pub sound: Option<AlarmSound>,
    pub notes: Option<String>,
    pub is_active: bool,
}
