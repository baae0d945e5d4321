use chrono_tz::Tz;
use classbell_scheduler::{
    PastOneShotPolicy, SchedulerOptions, triggers::DEFAULT_EARLY_REMINDER_MINUTES,
};
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct StorageSettings {
    pub database_url: String,
}

#[derive(Deserialize, Debug)]
pub struct SchedulerSettings {
    pub timezone: String,
    pub early_reminder_minutes: u32,
    pub past_one_shot: PastOneShotPolicy,
}

impl SchedulerSettings {
    pub fn timezone(&self) -> anyhow::Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|err| anyhow::anyhow!("Invalid timezone '{}': {err}", self.timezone))
    }

    pub fn options(&self) -> SchedulerOptions {
        SchedulerOptions {
            early_reminder_minutes: self.early_reminder_minutes,
            past_one_shot: self.past_one_shot,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct AppSettings {
    pub storage: StorageSettings,
    pub scheduler: SchedulerSettings,
}

impl AppSettings {
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("storage.database_url", "sqlite://classbell.db")?
            .set_default("scheduler.timezone", "UTC")?
            .set_default("scheduler.early_reminder_minutes", DEFAULT_EARLY_REMINDER_MINUTES)?
            .set_default("scheduler.past_one_shot", "next_day")?
            .add_source(File::with_name("appsettings").required(false))
            .add_source(File::with_name("appsettings.local").required(false))
            .add_source(Environment::with_prefix("CLASSBELL").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
