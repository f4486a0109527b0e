//! Geofencing provider adapters: callback payload decoding and the in-process provider.

pub mod in_memory;
pub mod payload;

pub use in_memory::{GeofenceCall, InMemoryGeofencing};
pub use payload::decode_payload;
