//! User-facing notification values built by the dispatcher and shown by a NotificationPort.

use crate::domain::LatLng;

/// Zoom level the map opens at when a notification is tapped.
pub const DEEP_LINK_ZOOM: f32 = 15.0;

const DEEP_LINK_SCHEME: &str = "remindmethere";

/// Target opened when the user taps the notification: the map centered on the reminder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeepLink {
    pub location: LatLng,
    pub zoom: f32,
}

impl DeepLink {
    pub fn to_map(location: LatLng) -> Self {
        Self {
            location,
            zoom: DEEP_LINK_ZOOM,
        }
    }

    pub fn uri(&self) -> String {
        format!(
            "{}://map?lat={}&lng={}&zoom={}",
            DEEP_LINK_SCHEME, self.location.latitude, self.location.longitude, self.zoom
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Importance {
    Default,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationChannel {
    pub id: String,
    pub name: String,
    pub description: String,
    pub importance: Importance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Reminder,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u32,
    pub channel_id: String,
    pub title: String,
    pub body: String,
    pub deep_link: DeepLink,
    pub auto_cancel: bool,
    pub importance: Importance,
    pub category: Category,
    /// Off/on durations in milliseconds.
    pub vibrate_pattern: Vec<u64>,
}
