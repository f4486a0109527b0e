//! Notification adapter that "shows" notifications by logging them.
//!
//! Keeps created channels and shown notifications (keyed by id, so a reused id replaces the
//! earlier entry like a platform notification manager would). Only the most recent
//! `MAX_SHOWN` notifications are kept. Doubles as a test double.

use crate::domain::{DomainError, Notification, NotificationChannel};
use crate::ports::NotificationPort;
use indexmap::IndexMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Visible notifications kept before the oldest is dropped.
pub const MAX_SHOWN: usize = 64;

#[derive(Default)]
struct NotifierState {
    channels: IndexMap<String, NotificationChannel>,
    shown: IndexMap<u32, Notification>,
    show_calls: usize,
    fail_show: Option<String>,
}

#[derive(Default)]
pub struct LogNotifier {
    state: Mutex<NotifierState>,
}

impl LogNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `show` fail with `reason` until cleared with None.
    pub async fn fail_show_with(&self, reason: Option<String>) {
        self.state.lock().await.fail_show = reason;
    }

    pub async fn channels(&self) -> Vec<NotificationChannel> {
        self.state.lock().await.channels.values().cloned().collect()
    }

    /// Currently visible notifications, oldest first.
    pub async fn shown(&self) -> Vec<Notification> {
        self.state.lock().await.shown.values().cloned().collect()
    }

    /// Number of `show` calls, including failed and replacing ones.
    pub async fn show_calls(&self) -> usize {
        self.state.lock().await.show_calls
    }
}

#[async_trait::async_trait]
impl NotificationPort for LogNotifier {
    async fn create_channel_if_absent(
        &self,
        channel: &NotificationChannel,
    ) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        if state.channels.contains_key(&channel.id) {
            return Ok(());
        }
        debug!(channel_id = %channel.id, name = %channel.name, "creating notification channel");
        state.channels.insert(channel.id.clone(), channel.clone());
        Ok(())
    }

    async fn show(&self, notification: &Notification) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        state.show_calls += 1;
        if let Some(reason) = &state.fail_show {
            return Err(DomainError::Notification(reason.clone()));
        }
        if !state.channels.contains_key(&notification.channel_id) {
            return Err(DomainError::Notification(format!(
                "channel {} does not exist",
                notification.channel_id
            )));
        }
        let replaced = state
            .shown
            .insert(notification.id, notification.clone())
            .is_some();
        while state.shown.len() > MAX_SHOWN {
            state.shown.shift_remove_index(0);
        }
        info!(
            notification_id = notification.id,
            replaced,
            link = %notification.deep_link.uri(),
            "[{}] {}",
            notification.title,
            notification.body
        );
        Ok(())
    }
}
