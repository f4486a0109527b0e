//! Port traits. API boundaries for the hexagon.
//!
//! - Inbound: Called by UI/provider shim into the application
//! - Outbound: Called by application into infrastructure

pub mod inbound;
pub mod outbound;

pub use inbound::{InputPort, ProviderPayload};
pub use outbound::{
    GeofencingPort, NotificationPort, PermissionPort, ReminderLookup, ReminderPersistencePort,
};
