use classbell_models::{
    alarm::{Alarm, AlarmDraft, AlarmId, NewAlarm},
    preferences::Preferences,
};

use crate::{
    AlarmError, RecoveryReconciler, context::SchedulerContext, recovery::RecoveryReport,
    time_math::parse_time_of_day,
};

/// Keeps the host's registered notifications in step with the stored
/// alarms across every mutation.
///
/// Operations are expected to be issued one at a time; nothing here locks
/// across the store and the gateway.
pub struct AlarmScheduler {
    ctx: SchedulerContext,
}

impl AlarmScheduler {
    pub fn new(ctx: SchedulerContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &SchedulerContext {
        &self.ctx
    }

    /// Stores a new alarm and registers its triggers if it is active.
    ///
    /// When registration fails the alarm stays stored and
    /// [`AlarmError::NotificationScheduling`] names its id.
    pub async fn create(&self, draft: AlarmDraft) -> Result<Alarm, AlarmError> {
        let new_alarm = validate_draft(draft)?;
        let alarm = self.ctx.store.insert(new_alarm).await?;
        log::info!("[CREATE] Alarm {} '{}'", alarm.id, alarm.subject);

        self.register(&alarm).await?;
        Ok(alarm)
    }

    /// Replaces a stored alarm. Existing registrations are always cancelled
    /// and rebuilt from the new fields.
    ///
    /// If the new fields cannot be stored, the previous alarm's registrations
    /// are restored before the storage error is returned.
    pub async fn update(&self, alarm: Alarm) -> Result<Alarm, AlarmError> {
        validate_text("subject", &alarm.subject)?;
        validate_text("classroom", &alarm.classroom)?;
        let previous = self.find(alarm.id).await?;

        self.ctx.cancel_registrations(alarm.id).await?;
        let alarm = match self.ctx.store.replace(alarm).await {
            Ok(alarm) => alarm,
            Err(err) => {
                log::error!("[UPDATE] Alarm {} could not be stored: {err}", previous.id);
                if let Err(restore_err) = self.ctx.register(&previous).await {
                    log::error!("[UPDATE] Restoring alarm {} failed: {restore_err:#}", previous.id);
                }
                return Err(err.into());
            }
        };
        log::info!("[UPDATE] Alarm {}", alarm.id);

        self.register(&alarm).await?;
        Ok(alarm)
    }

    /// Cancels the alarm's registrations, then removes it.
    pub async fn delete(&self, id: AlarmId) -> Result<(), AlarmError> {
        self.find(id).await?;

        self.ctx.cancel_registrations(id).await?;
        self.ctx.store.remove(id).await?;
        log::info!("[DELETE] Alarm {id}");

        Ok(())
    }

    /// Flips `is_active`. Registrations are cancelled before the flip is
    /// stored, so an alarm is never saved as off while still registered.
    pub async fn toggle_active(&self, id: AlarmId) -> Result<Alarm, AlarmError> {
        let mut alarm = self.find(id).await?;

        self.ctx.cancel_registrations(id).await?;
        alarm.is_active = !alarm.is_active;
        let alarm = self.ctx.store.replace(alarm).await?;
        log::info!("[TOGGLE] Alarm {} is_active = {}", id, alarm.is_active);

        self.register(&alarm).await?;
        Ok(alarm)
    }

    pub async fn get_all(&self) -> Result<Vec<Alarm>, AlarmError> {
        Ok(self.ctx.store.list().await?)
    }

    pub async fn get(&self, id: AlarmId) -> Result<Option<Alarm>, AlarmError> {
        Ok(self.ctx.store.get(id).await?)
    }

    pub async fn preferences(&self) -> Result<Preferences, AlarmError> {
        Ok(self.ctx.preferences.load().await?)
    }

    /// Saves `preferences` and rebuilds every registration under them.
    ///
    /// Turning notifications off cancels every alarm's registrations even
    /// when the host no longer grants permission.
    pub async fn set_preferences(
        &self,
        preferences: Preferences,
    ) -> Result<RecoveryReport, AlarmError> {
        self.ctx.preferences.save(&preferences).await?;

        if !preferences.notifications {
            for alarm in self.ctx.store.list().await? {
                self.ctx.cancel_registrations(alarm.id).await?;
            }
        }

        RecoveryReconciler::new(self.ctx.clone()).run().await
    }

    async fn find(&self, id: AlarmId) -> Result<Alarm, AlarmError> {
        self.ctx
            .store
            .get(id)
            .await?
            .ok_or(AlarmError::NotFound(id))
    }

    async fn register(&self, alarm: &Alarm) -> Result<(), AlarmError> {
        if let Err(err) = self.ctx.register(alarm).await {
            log::error!("[SCHEDULE] {err:#}");
            return Err(err);
        }
        Ok(())
    }
}

fn validate_text(field: &'static str, value: &str) -> Result<(), AlarmError> {
    if value.trim().is_empty() {
        return Err(AlarmError::validation(field, "must not be empty"));
    }
    Ok(())
}

fn validate_draft(draft: AlarmDraft) -> Result<NewAlarm, AlarmError> {
    let AlarmDraft {
        subject,
        classroom,
        time,
        recurrence,
        notify_before,
        color,
        sound,
        notes,
        is_active,
    } = draft;

    validate_text("subject", &subject)?;
    validate_text("classroom", &classroom)?;
    let recurrence =
        recurrence.ok_or_else(|| AlarmError::validation("recurrence", "must not be empty"))?;
    let time_of_day = parse_time_of_day(&time)?;

    Ok(NewAlarm {
        subject: subject.trim().to_string(),
        classroom: classroom.trim().to_string(),
        time_of_day,
        recurrence,
        notify_before,
        color: color.unwrap_or_default(),
        sound: sound.unwrap_or_default(),
        notes: notes.filter(|notes| !notes.trim().is_empty()),
        is_active,
    })
}
