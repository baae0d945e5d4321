mod appsettings;

use std::sync::Arc;

use anyhow::Context;
use appsettings::AppSettings;
use classbell_scheduler::{
    LocalNotificationGateway, LogNotificationSink, RecoveryReconciler, SchedulerContext,
    SystemClock,
};
use classbell_storage::sqlite::SqliteKeyValueStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::formatted_timed_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    let settings = AppSettings::load().context("Failed to load appsettings")?;
    let timezone = settings.scheduler.timezone()?;
    log::info!(
        "Starting with storage at {} in {}",
        settings.storage.database_url,
        timezone
    );

    let kv = SqliteKeyValueStore::connect(&settings.storage.database_url)
        .await
        .context("Failed to open storage")?;
    let clock = Arc::new(SystemClock::new(timezone));
    let gateway = Arc::new(LocalNotificationGateway::new(
        Arc::new(LogNotificationSink),
        clock.clone(),
    ));
    let ctx = SchedulerContext::new(Arc::new(kv), gateway, clock, settings.scheduler.options());

    let report = RecoveryReconciler::new(ctx).run().await?;
    if !report.permission_granted {
        log::warn!("Notifications are not permitted, alarms will not fire");
    }
    if !report.failed_alarms.is_empty() {
        log::warn!("Alarms that could not be scheduled: {:?}", report.failed_alarms);
    }

    log::info!("Waiting for alarms, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;
    log::info!("Shutting down");

    Ok(())
}
