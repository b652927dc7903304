#![allow(clippy::result_large_err)]

use dotenvy::dotenv;
use paidly::{
    config,
    core::{preference, store::ReminderStore},
    errors::Result,
    notify::{LogNotifier, Notifier},
    scheduler::DueCheckScheduler,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok(); // Make it non-fatal, env vars can be set externally
    info!("Attempted to load .env file.");

    // 3. Load application settings (paidly.toml is optional)
    let settings = config::settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {e}"))?;

    // 4. Initialize database
    let db = config::database::create_connection(&settings.database_url())
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {e}"))?;
    config::database::create_tables(&db).await?;

    // 5. Construct the store and the notification channel
    let store = ReminderStore::new(db.clone());
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    match notifier.request_permission().await {
        Ok(true) => info!("Notification permission granted."),
        Ok(false) => warn!("Notification permission denied; due notifications will be dropped."),
        Err(e) => warn!("Notification permission request failed: {e}"),
    }

    // 6. Seed the notification time from settings on first run only;
    //    afterwards the stored preference is the source of truth
    if let Some(defaults) = settings.notification {
        let already_set = preference::get_stored_notification_time(&db).await?.is_some();
        if !already_set {
            preference::set_notification_time(&db, defaults.hour, defaults.minute).await?;
            info!(
                "Seeded notification time {:02}:{:02} from settings.",
                defaults.hour, defaults.minute
            );
        }
    }

    // 7. Arm the daily due-check scheduler
    let scheduler = DueCheckScheduler::new(store, notifier);
    scheduler
        .start()
        .await
        .inspect(|_| info!("Due-check scheduler armed."))
        .inspect_err(|e| error!("Failed to arm due-check scheduler: {e}"))?;

    // 8. Run until interrupted, then shut down cleanly
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received.");
    scheduler.stop();
    db.close().await?;

    Ok(())
}
