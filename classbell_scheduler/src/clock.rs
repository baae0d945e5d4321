use chrono::{NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Source of the current local wall-clock time.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock of the configured time zone.
pub struct SystemClock {
    timezone: Tz,
}

impl SystemClock {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Utc::now().with_timezone(&self.timezone).naive_local()
    }
}

#[cfg(any(test, feature = "test-util"))]
pub use fixed::FixedClock;

#[cfg(any(test, feature = "test-util"))]
mod fixed {
    use std::sync::Mutex;

    use chrono::{NaiveDateTime, TimeDelta};

    use super::Clock;

    /// Clock that only moves when told to.
    pub struct FixedClock(Mutex<NaiveDateTime>);

    impl FixedClock {
        pub fn new(now: NaiveDateTime) -> Self {
            Self(Mutex::new(now))
        }

        pub fn set(&self, now: NaiveDateTime) {
            *self.0.lock().unwrap() = now;
        }

        pub fn advance(&self, delta: TimeDelta) {
            *self.0.lock().unwrap() += delta;
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> NaiveDateTime {
            *self.0.lock().unwrap()
        }
    }
}
