//! Application configuration. Paths, notification identity, ingestion limits.

use serde::Deserialize;

/// Default capacity for the provider callback channel. Bounded channel provides backpressure:
/// when full, the provider shim waits on send().await until a worker slot frees up.
pub const DEFAULT_INGEST_QUEUE_SIZE: usize = 64;

/// Default number of callbacks processed at the same time.
pub const DEFAULT_INGEST_CONCURRENCY: usize = 4;

/// How notification ids are assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum NotificationIdStrategy {
    /// Current unix millis modulo 10000. Two triggers in the same window replace each other.
    #[default]
    TimeWindow,
    /// Process-wide counter. Never replaces an earlier notification within a run.
    Monotonic,
}

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Directory holding reminders.json. Read from REMINDER_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Application id; the notification channel id is "<app_id>.channel". Read from REMINDER_APP_ID.
    #[serde(default)]
    pub app_id: Option<String>,

    /// Title shown on notifications. Read from REMINDER_APP_NAME.
    #[serde(default)]
    pub app_name: Option<String>,

    /// Max callbacks in flight. Read from REMINDER_INGEST_CONCURRENCY.
    #[serde(default)]
    pub ingest_concurrency: Option<usize>,

    /// Buffered callbacks before the provider shim blocks. Read from REMINDER_INGEST_QUEUE_SIZE.
    #[serde(default)]
    pub ingest_queue_size: Option<usize>,

    /// "time_window" (default) or "monotonic". Read from REMINDER_NOTIFICATION_IDS.
    #[serde(default)]
    pub notification_ids: Option<NotificationIdStrategy>,

    /// Registration also needs background location. Read from REMINDER_REQUIRE_BACKGROUND_LOCATION.
    #[serde(default)]
    pub require_background_location: Option<bool>,

    // ─────────────────────────────────────────────────────────────────────────
    // Static permission grants (console front-end has no permission dialog)
    // ─────────────────────────────────────────────────────────────────────────
    /// Read from REMINDER_GRANT_FOREGROUND_LOCATION.
    #[serde(default)]
    pub grant_foreground_location: Option<bool>,

    /// Read from REMINDER_GRANT_BACKGROUND_LOCATION.
    #[serde(default)]
    pub grant_background_location: Option<bool>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("REMINDER").try_parsing(true));
        if let Ok(path) = std::env::var("REMINDER_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        c.build()?.try_deserialize()
    }

    pub fn data_dir_or_default(&self) -> String {
        self.data_dir.clone().unwrap_or_else(|| "./data".to_string())
    }

    pub fn app_id_or_default(&self) -> String {
        self.app_id
            .clone()
            .unwrap_or_else(|| "dev.remindmethere".to_string())
    }

    pub fn app_name_or_default(&self) -> String {
        self.app_name
            .clone()
            .unwrap_or_else(|| "Remind Me There".to_string())
    }

    pub fn channel_id(&self) -> String {
        format!("{}.channel", self.app_id_or_default())
    }

    /// Returns ingest concurrency. Zero is treated as unset.
    pub fn ingest_concurrency_or_default(&self) -> usize {
        self.ingest_concurrency
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_INGEST_CONCURRENCY)
    }

    /// Returns callback queue size. Zero is treated as unset (tokio rejects zero-capacity channels).
    pub fn ingest_queue_size_or_default(&self) -> usize {
        self.ingest_queue_size
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_INGEST_QUEUE_SIZE)
    }

    pub fn notification_ids_or_default(&self) -> NotificationIdStrategy {
        self.notification_ids.unwrap_or_default()
    }

    pub fn require_background_location_or_default(&self) -> bool {
        self.require_background_location.unwrap_or(true)
    }

    pub fn grant_foreground_location_or_default(&self) -> bool {
        self.grant_foreground_location.unwrap_or(true)
    }

    pub fn grant_background_location_or_default(&self) -> bool {
        self.grant_background_location.unwrap_or(true)
    }
}
