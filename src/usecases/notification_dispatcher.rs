//! Build and emit the notification for a resolved reminder.
//!
//! One notification per call, no retry. The channel is created on first use.

use crate::domain::{
    Category, DeepLink, DomainError, Importance, Notification, NotificationChannel, Reminder,
};
use crate::ports::NotificationPort;
use crate::shared::config::NotificationIdStrategy;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tracing::{debug, info};

/// Width of the time window used by `NotificationIdStrategy::TimeWindow`, in milliseconds.
const TIME_WINDOW_MS: i64 = 10_000;

const VIBRATE_PATTERN: [u64; 4] = [100, 200, 100, 200];

const CHANNEL_DESCRIPTION: &str = "Alerts when you arrive at a reminder location";

pub struct NotificationDispatcher {
    notifier: Arc<dyn NotificationPort>,
    channel: NotificationChannel,
    title: String,
    strategy: NotificationIdStrategy,
    counter: AtomicU32,
    channel_ready: AtomicBool,
}

impl NotificationDispatcher {
    pub fn new(
        notifier: Arc<dyn NotificationPort>,
        channel_id: String,
        app_name: String,
        strategy: NotificationIdStrategy,
    ) -> Self {
        Self {
            notifier,
            channel: NotificationChannel {
                id: channel_id,
                name: app_name.clone(),
                description: CHANNEL_DESCRIPTION.to_string(),
                importance: Importance::High,
            },
            title: app_name,
            strategy,
            counter: AtomicU32::new(0),
            channel_ready: AtomicBool::new(false),
        }
    }

    /// Show the notification for `reminder`. Returns the id it was shown under.
    pub async fn dispatch(&self, reminder: &Reminder) -> Result<u32, DomainError> {
        self.ensure_channel().await?;

        let notification = self.build(reminder);
        self.notifier.show(&notification).await?;

        info!(
            reminder_id = %reminder.id,
            notification_id = notification.id,
            "notification sent"
        );
        Ok(notification.id)
    }

    pub fn build(&self, reminder: &Reminder) -> Notification {
        Notification {
            id: self.next_id(),
            channel_id: self.channel.id.clone(),
            title: self.title.clone(),
            body: reminder.message.clone(),
            deep_link: DeepLink::to_map(reminder.location),
            auto_cancel: true,
            importance: Importance::High,
            category: Category::Reminder,
            vibrate_pattern: VIBRATE_PATTERN.to_vec(),
        }
    }

    /// Created once per dispatcher. Two racing first dispatches may both call the port,
    /// which is idempotent.
    async fn ensure_channel(&self) -> Result<(), DomainError> {
        if self.channel_ready.load(Ordering::Acquire) {
            return Ok(());
        }
        debug!(channel_id = %self.channel.id, "ensuring notification channel");
        self.notifier.create_channel_if_absent(&self.channel).await?;
        self.channel_ready.store(true, Ordering::Release);
        Ok(())
    }

    fn next_id(&self) -> u32 {
        match self.strategy {
            NotificationIdStrategy::TimeWindow => {
                chrono::Utc::now()
                    .timestamp_millis()
                    .rem_euclid(TIME_WINDOW_MS) as u32
            }
            NotificationIdStrategy::Monotonic => self.counter.fetch_add(1, Ordering::Relaxed) + 1,
        }
    }
}
