pub mod alarm;
pub mod notification;
pub mod preferences;
pub mod recurrence;

pub use chrono;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Time of day out of range {hour}:{minute:02}")]
    TimeOutOfRange { hour: u32, minute: u32 },

    #[error("Weekly recurrence needs at least one day")]
    EmptyWeekdaySet,
}
