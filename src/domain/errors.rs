//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use crate::domain::status::GeofenceStatus;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid reminder: {0}")]
    InvalidReminder(String),

    #[error("Geofence registration failed: {status}")]
    Registration { status: GeofenceStatus },

    /// The reminder is gone from the store but the provider may still watch it.
    #[error("Reminder {id} was removed but its geofence could not be cancelled: {status}")]
    UnregisterFailed { id: String, status: GeofenceStatus },

    #[error("Geofence {id} could not be cancelled: {status}")]
    CancelFailed { id: String, status: GeofenceStatus },

    #[error("Geofence transition error: {status}")]
    TransitionEvent { status: GeofenceStatus },

    #[error("Location permission denied: {0}")]
    PermissionDenied(String),

    #[error("Malformed provider payload: {0}")]
    MalformedPayload(String),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Input error: {0}")]
    Input(String),
}
