use chrono::{NaiveDate, Timelike};
use proptest::prelude::*;
use proptest_arbitrary_interop::arb;
use test_strategy::proptest;

use super::*;

// 2026-10-19 is a Monday.
fn monday_at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

fn time(hour: u32, minute: u32) -> TimeOfDay {
    TimeOfDay::new(hour, minute).unwrap()
}

#[test]
fn parses_twelve_hour_clock_edges() {
    assert_eq!(parse_time_of_day("12:00 AM"), Ok(time(0, 0)));
    assert_eq!(parse_time_of_day("12:30 PM"), Ok(time(12, 30)));
    assert_eq!(parse_time_of_day("11:59 PM"), Ok(time(23, 59)));
    assert_eq!(parse_time_of_day("9:05 AM"), Ok(time(9, 5)));
    assert_eq!(parse_time_of_day("09:00 AM"), Ok(time(9, 0)));
    assert_eq!(parse_time_of_day("1:15 PM"), Ok(time(13, 15)));
}

#[test]
fn rejects_malformed_times() {
    let malformed = [
        "13:00 AM",
        "aa:bb PM",
        "0:30 AM",
        "9:60 AM",
        "9:00",
        "9:00 XM",
        "",
        "9:00 AM later",
        "9:5 AM",
        "9:00AM",
        "09:00 am",
        "9:00  AM",
        "+9:00 AM",
        "123:00 PM",
    ];
    for text in malformed {
        assert_eq!(
            parse_time_of_day(text),
            Err(TimeError::InvalidFormat(text.to_string())),
            "{text:?} should be rejected"
        );
    }
}

#[test]
fn next_occurrence_rolls_to_next_week_once_slot_passed() {
    let next = next_occurrence(&time(9, 0), Weekday::Mon, monday_at(10, 0));

    assert_eq!(next, monday_at(9, 0) + Days::new(7));
}

#[test]
fn next_occurrence_later_this_week() {
    let next = next_occurrence(&time(9, 0), Weekday::Wed, monday_at(8, 0));

    assert_eq!(next, monday_at(9, 0) + Days::new(2));
    assert_eq!(next.weekday(), Weekday::Wed);
}

#[test]
fn next_occurrence_later_today_fires_today() {
    let next = next_occurrence(&time(8, 2), Weekday::Mon, monday_at(8, 0));

    assert_eq!(next, monday_at(8, 2));
}

#[test]
fn next_occurrence_exactly_now_is_next_week() {
    let next = next_occurrence(&time(8, 0), Weekday::Mon, monday_at(8, 0));

    assert_eq!(next, monday_at(8, 0) + Days::new(7));
}

#[test]
fn next_occurrence_wraps_across_week_boundary() {
    let sunday = monday_at(12, 0) - Days::new(1);

    let next = next_occurrence(&time(7, 30), Weekday::Mon, sunday);

    assert_eq!(next, monday_at(7, 30));
}

#[test]
fn one_shot_in_future_is_unchanged() {
    assert_eq!(
        next_occurrence_one_shot(monday_at(9, 0), monday_at(8, 0)),
        Ok(monday_at(9, 0))
    );
}

#[test]
fn one_shot_now_or_earlier_is_past() {
    assert_eq!(
        next_occurrence_one_shot(monday_at(8, 0), monday_at(8, 0)),
        Err(TimeError::Past(monday_at(8, 0)))
    );
    assert_eq!(
        next_occurrence_one_shot(monday_at(7, 0), monday_at(8, 0)),
        Err(TimeError::Past(monday_at(7, 0)))
    );
}

#[test]
fn daily_occurrence_rolls_to_tomorrow() {
    assert_eq!(next_daily_occurrence(&time(9, 0), monday_at(8, 0)), monday_at(9, 0));
    assert_eq!(
        next_daily_occurrence(&time(7, 0), monday_at(8, 0)),
        monday_at(7, 0) + Days::new(1)
    );
}

#[test]
fn offset_earlier_borrows_hour_and_day() {
    let sunday = monday_at(0, 0) - Days::new(1);
    let sunday_late = sunday.with_hour(23).unwrap().with_minute(57).unwrap();

    assert_eq!(offset_earlier(monday_at(0, 2), 5), sunday_late);
    assert_eq!(offset_earlier(monday_at(9, 0), 5), monday_at(8, 55));
    assert_eq!(offset_earlier(monday_at(9, 7), 5), monday_at(9, 2));
}

#[test]
fn offset_earlier_borrows_across_month_and_year() {
    let new_year = NaiveDate::from_ymd_opt(2027, 1, 1).unwrap().and_hms_opt(0, 3, 0).unwrap();
    let expected = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap().and_hms_opt(23, 58, 0).unwrap();

    assert_eq!(offset_earlier(new_year, 5), expected);
}

fn time_strategy() -> impl Strategy<Value = TimeOfDay> {
    (0u32..24, 0u32..60).prop_map(|(h, m)| TimeOfDay::new(h, m).unwrap())
}

fn weekday_strategy() -> impl Strategy<Value = Weekday> {
    (0u8..7).prop_map(|n| Weekday::try_from(n).unwrap())
}

#[proptest]
fn next_occurrence_is_within_a_week_and_on_target(
    #[strategy(time_strategy())] time_of_day: TimeOfDay,
    #[strategy(weekday_strategy())] weekday: Weekday,
    #[strategy(arb::<NaiveDateTime>())] reference: NaiveDateTime,
) {
    let reference = reference.with_nanosecond(0).unwrap();
    prop_assume!(reference.date() < NaiveDate::MAX - Days::new(14));

    let next = next_occurrence(&time_of_day, weekday, reference);

    prop_assert!(next > reference);
    prop_assert!(next - reference <= TimeDelta::days(7));
    prop_assert_eq!(next.weekday(), weekday);
    prop_assert_eq!(next.time(), *time_of_day.time());
}

#[proptest]
fn twelve_hour_text_round_trips(#[strategy(time_strategy())] time_of_day: TimeOfDay) {
    prop_assert_eq!(parse_time_of_day(&time_of_day.to_string()), Ok(time_of_day));
}

#[proptest]
fn offset_earlier_keeps_wall_clock_consistent(
    #[strategy(0u32..24)] hour: u32,
    #[strategy(0u32..60)] minute: u32,
    #[strategy(0u32..60)] offset: u32,
) {
    let instant = monday_at(hour, minute);

    let earlier = offset_earlier(instant, offset);

    let total_before = (hour * 60 + minute) as i64;
    let total_after = (earlier.hour() * 60 + earlier.minute()) as i64;
    let day_shift = (instant.date() - earlier.date()).num_days();
    prop_assert!(day_shift == 0 || day_shift == 1);
    prop_assert_eq!(total_before - offset as i64, total_after - day_shift * 24 * 60);
}
