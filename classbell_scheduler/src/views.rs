//! Read-only groupings of alarms for day and schedule screens.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use classbell_models::{alarm::Alarm, recurrence::Recurrence};

use crate::time_math::{next_occurrence, next_occurrence_one_shot};

/// Alarms that ring on `date`, earliest first. Inactive alarms are included;
/// screens grey them out.
pub fn alarms_on(alarms: &[Alarm], date: NaiveDate) -> Vec<&Alarm> {
    let mut on_date: Vec<&Alarm> = alarms
        .iter()
        .filter(|alarm| alarm.recurrence.occurs_on(date))
        .collect();
    on_date.sort_by_key(|alarm| alarm.time_of_day);
    on_date
}

pub type Upcoming<'a> = BTreeMap<NaiveDate, Vec<(NaiveDateTime, &'a Alarm)>>;

/// The next main trigger of every active alarm after `now`, grouped by date.
/// A weekly alarm contributes one entry per selected day.
pub fn upcoming_by_date(alarms: &[Alarm], now: NaiveDateTime) -> Upcoming<'_> {
    let mut grouped = Upcoming::new();

    for alarm in alarms.iter().filter(|alarm| alarm.is_active) {
        let instants: Vec<NaiveDateTime> = match &alarm.recurrence {
            Recurrence::Weekly { days } => days
                .iter()
                .map(|day| next_occurrence(&alarm.time_of_day, day, now))
                .collect(),
            Recurrence::Once { date } => {
                next_occurrence_one_shot(date.and_time(*alarm.time_of_day.time()), now)
                    .into_iter()
                    .collect()
            }
        };

        for at in instants {
            grouped.entry(at.date()).or_default().push((at, alarm));
        }
    }

    for entries in grouped.values_mut() {
        entries.sort_by_key(|(at, alarm)| (*at, alarm.id));
    }

    grouped
}
