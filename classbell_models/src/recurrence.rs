use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::{ModelError, alarm::TimeOfDay};

/// Non-empty set of weekdays, kept in Monday-first order without duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Weekday>", into = "Vec<Weekday>")]
pub struct WeekdaySet(Vec<Weekday>);

impl WeekdaySet {
    pub fn new(days: impl IntoIterator<Item = Weekday>) -> Result<Self, ModelError> {
        let mut days: Vec<Weekday> = days.into_iter().collect();
        days.sort_by_key(Weekday::num_days_from_monday);
        days.dedup();

        if days.is_empty() {
            return Err(ModelError::EmptyWeekdaySet);
        }

        Ok(Self(days))
    }

    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        self.0.iter().copied()
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0.contains(&day)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<Weekday>> for WeekdaySet {
    type Error = ModelError;

    fn try_from(value: Vec<Weekday>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WeekdaySet> for Vec<Weekday> {
    fn from(value: WeekdaySet) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recurrence {
    /// Fires every week on each of the given days.
    Weekly { days: WeekdaySet },
    /// Fires once, on `date` at the alarm's time of day.
    Once { date: NaiveDate },
}

impl Recurrence {
    pub fn is_recurring(&self) -> bool {
        matches!(self, Recurrence::Weekly { .. })
    }

    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        match self {
            Recurrence::Weekly { days } => days.contains(date.weekday()),
            Recurrence::Once { date: once } => *once == date,
        }
    }

    /// The absolute instant of a one-shot alarm, `None` for weekly ones.
    pub fn one_shot_instant(&self, time_of_day: &TimeOfDay) -> Option<NaiveDateTime> {
        match self {
            Recurrence::Weekly { .. } => None,
            Recurrence::Once { date } => Some(date.and_time(*time_of_day.time())),
        }
    }
}
