//! Geofencing provider status codes and their user-facing messages.

/// Status code reported by the geofencing provider, for registration failures
/// and for errored transition events alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeofenceStatus {
    NotAvailable,
    TooManyGeofences,
    TooManyPendingIntents,
    InsufficientLocationPermission,
    /// Any other provider code, or a failure that did not come from the provider at all.
    Unknown(Option<i32>),
}

impl GeofenceStatus {
    pub const NOT_AVAILABLE: i32 = 1000;
    pub const TOO_MANY_GEOFENCES: i32 = 1001;
    pub const TOO_MANY_PENDING_INTENTS: i32 = 1002;
    pub const INSUFFICIENT_LOCATION_PERMISSION: i32 = 1004;

    pub fn from_code(code: i32) -> Self {
        match code {
            Self::NOT_AVAILABLE => Self::NotAvailable,
            Self::TOO_MANY_GEOFENCES => Self::TooManyGeofences,
            Self::TOO_MANY_PENDING_INTENTS => Self::TooManyPendingIntents,
            Self::INSUFFICIENT_LOCATION_PERMISSION => Self::InsufficientLocationPermission,
            other => Self::Unknown(Some(other)),
        }
    }

    /// Raw provider code, if there was one.
    pub fn code(&self) -> Option<i32> {
        match self {
            Self::NotAvailable => Some(Self::NOT_AVAILABLE),
            Self::TooManyGeofences => Some(Self::TOO_MANY_GEOFENCES),
            Self::TooManyPendingIntents => Some(Self::TOO_MANY_PENDING_INTENTS),
            Self::InsufficientLocationPermission => Some(Self::INSUFFICIENT_LOCATION_PERMISSION),
            Self::Unknown(code) => *code,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::NotAvailable => {
                "Geofence service is not available now. Turn on location in high accuracy mode."
            }
            Self::TooManyGeofences => {
                "Too many reminders are being watched. Remove one before adding another."
            }
            Self::TooManyPendingIntents => {
                "Too many pending callbacks are registered with the geofence service."
            }
            Self::InsufficientLocationPermission => {
                "Background location permission is required for reminders to trigger."
            }
            Self::Unknown(_) => "Unknown error: the geofence service is not available now.",
        }
    }
}

impl std::fmt::Display for GeofenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}
