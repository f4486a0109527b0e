//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod notification;
pub mod status;

pub use entities::{
    Expiration, GeofenceRequest, LatLng, ProviderEvent, Reminder, ReminderDraft, TransitionEvent,
    TransitionKind, radius_from_progress,
};
pub use errors::DomainError;
pub use notification::{
    Category, DeepLink, Importance, Notification, NotificationChannel, DEEP_LINK_ZOOM,
};
pub use status::GeofenceStatus;
