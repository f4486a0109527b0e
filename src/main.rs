//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run the console.
//! No business logic here.

use dotenv::dotenv;
use remind_me_there::adapters::cli::ConsoleInputPort;
use remind_me_there::adapters::notify::LogNotifier;
use remind_me_there::adapters::permissions::StaticPermissions;
use remind_me_there::adapters::persistence::RemindersJson;
use remind_me_there::adapters::provider::InMemoryGeofencing;
use remind_me_there::ports::{
    GeofencingPort, InputPort, NotificationPort, PermissionPort, ReminderPersistencePort,
};
use remind_me_there::shared::config::AppConfig;
use remind_me_there::usecases::{
    GeofenceRegistrar, IngestionWorker, NotificationDispatcher, ReminderStore, TransitionIngestion,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = AppConfig::load().map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    let data_dir = PathBuf::from(cfg.data_dir_or_default());
    info!(path = %data_dir.display(), "data directory");

    // --- Provider side: geofencing shim + permissions ---
    let provider: Arc<dyn GeofencingPort> = Arc::new(InMemoryGeofencing::new());
    let permissions: Arc<dyn PermissionPort> = Arc::new(StaticPermissions::new(
        cfg.grant_foreground_location_or_default(),
        cfg.grant_background_location_or_default(),
    ));
    if !permissions.has_foreground_location() {
        info!("foreground location not granted: adding reminders will fail");
    }
    let registrar = Arc::new(GeofenceRegistrar::new(
        provider,
        permissions,
        cfg.require_background_location_or_default(),
    ));

    // --- Store (loaded from disk; watches re-registered since the provider starts empty) ---
    let persistence: Arc<dyn ReminderPersistencePort> = Arc::new(RemindersJson::in_dir(&data_dir));
    let store = Arc::new(
        ReminderStore::with_persistence(registrar, persistence)
            .await
            .map_err(|e| anyhow::anyhow!("{}", e))?,
    );
    if !store.is_empty().await {
        store.resync_watches().await;
    }

    // --- Notifications ---
    let notifier: Arc<dyn NotificationPort> = Arc::new(LogNotifier::new());
    let dispatcher = Arc::new(NotificationDispatcher::new(
        notifier,
        cfg.channel_id(),
        cfg.app_name_or_default(),
        cfg.notification_ids_or_default(),
    ));

    // --- Ingestion: bounded channel for backpressure, bounded worker pool ---
    let queue_size = cfg.ingest_queue_size_or_default();
    let concurrency = cfg.ingest_concurrency_or_default();
    info!(queue_size, concurrency, "ingestion worker starting");
    let (callback_tx, callback_rx) = mpsc::channel(queue_size);
    let ingestion = Arc::new(TransitionIngestion::new(Arc::clone(&store), dispatcher));
    let worker = tokio::spawn(IngestionWorker::new(ingestion, callback_rx, concurrency).run());

    // --- Run console until EOF, then drain in-flight callbacks ---
    let input_port: Arc<dyn InputPort> =
        Arc::new(ConsoleInputPort::new(Arc::clone(&store), callback_tx));
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    drop(input_port);

    let stats = worker.await?;
    info!(
        handled = stats.handled,
        dispatched = stats.dispatched,
        "shutdown complete"
    );
    Ok(())
}
