use chrono::{Days, NaiveDateTime};
use classbell_models::{
    alarm::{Alarm, DEFAULT_SOUND},
    notification::{NotificationPayload, TriggerKind},
    recurrence::Recurrence,
};
use serde::Deserialize;

use crate::{
    gateway::{NotificationContent, NotificationRequest, Repeat, Trigger},
    time_math::{
        TimeError, next_daily_occurrence, next_occurrence, next_occurrence_one_shot, offset_earlier,
    },
};

pub const DEFAULT_EARLY_REMINDER_MINUTES: u32 = 5;

/// What to do with a one-shot alarm whose instant has already passed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PastOneShotPolicy {
    /// Fire at the next occurrence of its time of day instead.
    #[default]
    NextDay,
    /// Register nothing.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerOptions {
    pub early_reminder_minutes: u32,
    pub past_one_shot: PastOneShotPolicy,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            early_reminder_minutes: DEFAULT_EARLY_REMINDER_MINUTES,
            past_one_shot: PastOneShotPolicy::default(),
        }
    }
}

/// Derives the notification requests an active alarm should have registered
/// at `now`. `with_early` gates early reminders on top of the alarm's own
/// `notify_before`.
pub fn plan_triggers(
    alarm: &Alarm,
    now: NaiveDateTime,
    options: &SchedulerOptions,
    with_early: bool,
) -> Vec<NotificationRequest> {
    let with_early = with_early && alarm.notify_before;
    let minutes = options.early_reminder_minutes;
    let mut requests = Vec::new();

    match &alarm.recurrence {
        Recurrence::Weekly { days } => {
            for day in days.iter() {
                let main_at = next_occurrence(&alarm.time_of_day, day, now);
                requests.push(request(
                    alarm,
                    NotificationPayload::new(alarm.id, TriggerKind::Main, Some(day)),
                    main_at,
                    Repeat::Weekly,
                    minutes,
                ));

                if with_early {
                    let mut early_at = offset_earlier(main_at, minutes);
                    if early_at <= now {
                        early_at = early_at + Days::new(7);
                    }
                    requests.push(request(
                        alarm,
                        NotificationPayload::new(alarm.id, TriggerKind::Early, Some(day)),
                        early_at,
                        Repeat::Weekly,
                        minutes,
                    ));
                }
            }
        }
        Recurrence::Once { date } => {
            let instant = date.and_time(*alarm.time_of_day.time());
            let main_at = match next_occurrence_one_shot(instant, now) {
                Ok(at) => at,
                Err(TimeError::Past(at)) => match options.past_one_shot {
                    PastOneShotPolicy::NextDay => {
                        let rolled = next_daily_occurrence(&alarm.time_of_day, now);
                        log::warn!(
                            "[PLAN] One-shot alarm {} at {} is past, rolling to {}",
                            alarm.id,
                            at,
                            rolled
                        );
                        rolled
                    }
                    PastOneShotPolicy::Skip => {
                        log::warn!(
                            "[PLAN] One-shot alarm {} at {} is past, skipping",
                            alarm.id,
                            at
                        );
                        return requests;
                    }
                },
                Err(err) => {
                    log::error!("[PLAN] Unexpected error for alarm {}: {}", alarm.id, err);
                    return requests;
                }
            };

            requests.push(request(
                alarm,
                NotificationPayload::new(alarm.id, TriggerKind::Main, None),
                main_at,
                Repeat::Never,
                minutes,
            ));

            if with_early {
                let early_at = offset_earlier(main_at, minutes);
                if early_at > now {
                    requests.push(request(
                        alarm,
                        NotificationPayload::new(alarm.id, TriggerKind::Early, None),
                        early_at,
                        Repeat::Never,
                        minutes,
                    ));
                } else {
                    log::info!(
                        "[PLAN] Early reminder for alarm {} at {} is already past, skipping",
                        alarm.id,
                        early_at
                    );
                }
            }
        }
    }

    requests
}

fn request(
    alarm: &Alarm,
    payload: NotificationPayload,
    at: NaiveDateTime,
    repeat: Repeat,
    early_minutes: u32,
) -> NotificationRequest {
    NotificationRequest {
        id: payload.notification_id(),
        content: content(alarm, payload.kind, early_minutes),
        payload,
        trigger: Trigger { at, repeat },
    }
}

fn content(alarm: &Alarm, kind: TriggerKind, early_minutes: u32) -> NotificationContent {
    match kind {
        TriggerKind::Main => NotificationContent {
            title: format!("Class Alarm: {}", alarm.subject),
            body: format!("{} in {} starts soon!", alarm.subject, alarm.classroom),
            sound: alarm.sound.as_str().to_string(),
        },
        TriggerKind::Early => NotificationContent {
            title: format!("{}-Minute Reminder: {}", early_minutes, alarm.subject),
            body: format!(
                "{} in {} starts in {} minutes!",
                alarm.subject, alarm.classroom, early_minutes
            ),
            sound: DEFAULT_SOUND.to_string(),
        },
    }
}
