//! remind-me-there: location reminders with Hexagonal Architecture.
//!
//! Reminders are stored, registered as geofences with a provider, and turned into
//! notifications when the provider reports the device entered one.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
