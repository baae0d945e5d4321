pub mod alarm_scheduler;
pub mod clock;
pub mod context;
pub mod error;
pub mod gateway;
pub mod local_gateway;
pub mod recovery;
pub mod time_math;
pub mod triggers;
pub mod views;

#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;

pub use alarm_scheduler::AlarmScheduler;
pub use clock::{Clock, SystemClock};
pub use context::SchedulerContext;
pub use error::AlarmError;
pub use gateway::{NotificationGateway, NotificationRequest};
pub use local_gateway::{LocalNotificationGateway, LogNotificationSink, NotificationSink};
pub use recovery::{RecoveryReconciler, RecoveryReport};
pub use triggers::{PastOneShotPolicy, SchedulerOptions};
