//! Pure date/time arithmetic the scheduler derives trigger instants from.
//!
//! Every function works on local wall-clock `NaiveDateTime`s and never reads
//! the clock itself; callers pass the reference instant in.

use chrono::{Datelike, Days, NaiveDateTime, NaiveTime, TimeDelta, Weekday};
use classbell_models::alarm::TimeOfDay;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeError {
    #[error("Invalid time format {0:?}, expected H:MM AM|PM")]
    InvalidFormat(String),

    #[error("Instant {0} is not in the future")]
    Past(NaiveDateTime),
}

const TIME_FORMAT: &str = "%I:%M %p";

/// Parses `H:MM AM|PM` into a 24-hour time of day.
///
/// The hour takes one or two digits, the minute exactly two, and a single
/// space separates the upper-case period. `12 AM` is midnight and `12 PM` is
/// noon.
pub fn parse_time_of_day(text: &str) -> Result<TimeOfDay, TimeError> {
    let invalid = || TimeError::InvalidFormat(text.to_string());
    let trimmed = text.trim();

    if !has_time_shape(trimmed) {
        return Err(invalid());
    }

    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .map(TimeOfDay::from_time)
        .map_err(|_| invalid())
}

fn has_time_shape(text: &str) -> bool {
    let Some((clock, period)) = text.split_once(' ') else {
        return false;
    };
    let Some((hour, minute)) = clock.split_once(':') else {
        return false;
    };
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());

    matches!(period, "AM" | "PM")
        && matches!(hour.len(), 1 | 2)
        && minute.len() == 2
        && all_digits(hour)
        && all_digits(minute)
}

/// Next instant strictly after `reference` that falls on `weekday` at
/// `time_of_day`.
///
/// A slot later today still fires today; once today's slot is reached or
/// passed the alarm rolls to the same weekday next week.
pub fn next_occurrence(
    time_of_day: &TimeOfDay,
    weekday: Weekday,
    reference: NaiveDateTime,
) -> NaiveDateTime {
    let days_to_add = (weekday.num_days_from_monday() + 7
        - reference.weekday().num_days_from_monday())
        % 7;

    let date = reference.date() + Days::new(u64::from(days_to_add));
    let candidate = date.and_time(*time_of_day.time());
    if candidate > reference {
        candidate
    } else {
        candidate + Days::new(7)
    }
}

/// Returns `instant` when it is strictly after `reference`, `TimeError::Past`
/// otherwise.
pub fn next_occurrence_one_shot(
    instant: NaiveDateTime,
    reference: NaiveDateTime,
) -> Result<NaiveDateTime, TimeError> {
    if instant > reference {
        Ok(instant)
    } else {
        Err(TimeError::Past(instant))
    }
}

/// Next instant strictly after `reference` at `time_of_day`, on whatever day
/// that is. Used to roll a past one-shot forward.
pub fn next_daily_occurrence(time_of_day: &TimeOfDay, reference: NaiveDateTime) -> NaiveDateTime {
    let candidate = reference.date().and_time(*time_of_day.time());
    if candidate > reference {
        candidate
    } else {
        candidate + Days::new(1)
    }
}

/// Moves `instant` `minutes` earlier, borrowing from the hour and then from
/// the calendar day when the wall-clock fields underflow.
pub fn offset_earlier(instant: NaiveDateTime, minutes: u32) -> NaiveDateTime {
    instant - TimeDelta::minutes(i64::from(minutes))
}

#[cfg(test)]
mod tests;
