//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{DomainError, GeofenceRequest, Notification, NotificationChannel, Reminder};

/// Geofencing provider. Starts and stops boundary watches.
///
/// Provider failures come back as `DomainError::Registration { status }`; failures that
/// did not originate in the provider use `GeofenceStatus::Unknown(None)`.
#[async_trait::async_trait]
pub trait GeofencingPort: Send + Sync {
    /// Begin monitoring the circular region described by `request`. Re-adding an existing
    /// `request_id` replaces the previous watch.
    async fn add_geofence(&self, request: &GeofenceRequest) -> Result<(), DomainError>;

    /// Stop monitoring `request_id`. Unknown ids are not an error.
    async fn remove_geofence(&self, request_id: &str) -> Result<(), DomainError>;
}

/// Platform notification surface.
#[async_trait::async_trait]
pub trait NotificationPort: Send + Sync {
    /// Create the channel unless one with the same id already exists.
    async fn create_channel_if_absent(&self, channel: &NotificationChannel)
    -> Result<(), DomainError>;

    /// Show (or replace, when `notification.id` is already shown) a notification.
    async fn show(&self, notification: &Notification) -> Result<(), DomainError>;
}

/// Location permission state, owned by the UI layer.
pub trait PermissionPort: Send + Sync {
    fn has_foreground_location(&self) -> bool;
    fn has_background_location(&self) -> bool;
}

/// Durable backing for the reminder store. Optional: the store works without one.
#[async_trait::async_trait]
pub trait ReminderPersistencePort: Send + Sync {
    /// All reminders in insertion order. Empty when nothing was saved yet.
    async fn load_all(&self) -> Result<Vec<Reminder>, DomainError>;

    /// Replace the saved set with `reminders`.
    async fn save_all(&self, reminders: &[Reminder]) -> Result<(), DomainError>;
}

/// Read access to reminders by id, as seen by the transition resolver.
pub trait ReminderLookup {
    fn find(&self, id: &str) -> Option<&Reminder>;
}

impl ReminderLookup for indexmap::IndexMap<String, Reminder> {
    fn find(&self, id: &str) -> Option<&Reminder> {
        self.get(id)
    }
}
