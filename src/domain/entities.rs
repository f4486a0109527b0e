//! Domain entities. Pure data structures for the core business.
//!
//! No provider or platform types here. Adapters map into these.

use crate::domain::errors::DomainError;
use crate::domain::status::GeofenceStatus;
use serde::{Deserialize, Serialize};

/// Geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLng {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when both components are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

/// A persisted reminder. All fields are set; `id` doubles as the geofence request id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub location: LatLng,
    /// Radius in meters.
    pub radius: f64,
    pub message: String,
}

/// Reminder under construction. Filled step by step (where -> radius -> message).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReminderDraft {
    pub id: Option<String>,
    pub location: Option<LatLng>,
    pub radius: Option<f64>,
    pub message: Option<String>,
}

impl ReminderDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_location(mut self, location: LatLng) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_radius(mut self, meters: f64) -> Self {
        self.radius = Some(meters);
        self
    }

    /// Radius from a zero-based slider position: 0 -> 100 m, 1 -> 200 m, ...
    pub fn with_radius_progress(self, progress: u32) -> Self {
        self.with_radius(radius_from_progress(progress))
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Check every required field and produce a `Reminder`. A missing id is left empty;
    /// the store assigns one on insert.
    pub fn validate(self) -> Result<Reminder, DomainError> {
        let location = self
            .location
            .ok_or_else(|| DomainError::InvalidReminder("location is not set".into()))?;
        if !location.is_valid() {
            return Err(DomainError::InvalidReminder(format!(
                "location {} is out of range",
                location
            )));
        }
        let radius = self
            .radius
            .ok_or_else(|| DomainError::InvalidReminder("radius is not set".into()))?;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(DomainError::InvalidReminder(format!(
                "radius must be a positive number of meters, got {}",
                radius
            )));
        }
        let message = self
            .message
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| DomainError::InvalidReminder("message is required".into()))?;

        Ok(Reminder {
            id: self.id.unwrap_or_default(),
            location,
            radius,
            message,
        })
    }
}

pub fn radius_from_progress(progress: u32) -> f64 {
    (f64::from(progress) + 1.0) * 100.0
}

/// Boundary crossing direction reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Enter,
    Exit,
    Dwell,
}

impl TransitionKind {
    /// Provider transition constants: ENTER = 1, EXIT = 2, DWELL = 4.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Enter),
            2 => Some(Self::Exit),
            4 => Some(Self::Dwell),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "ENTER" => Some(Self::Enter),
            "EXIT" => Some(Self::Exit),
            "DWELL" => Some(Self::Dwell),
            _ => None,
        }
    }
}

/// A valid boundary crossing. `triggering_ids` is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionEvent {
    pub kind: TransitionKind,
    pub triggering_ids: Vec<String>,
}

/// What the provider delivered for one callback: either an error code with no
/// triggering data, or a crossing.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    Failed(GeofenceStatus),
    Crossed(TransitionEvent),
}

/// Circular watch request handed to the geofencing provider.
#[derive(Debug, Clone, PartialEq)]
pub struct GeofenceRequest {
    pub request_id: String,
    pub center: LatLng,
    pub radius_m: f64,
    pub transitions: Vec<TransitionKind>,
    pub initial_trigger: Option<TransitionKind>,
    pub expiration: Expiration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    Never,
}

impl GeofenceRequest {
    /// Enter-only watch that never expires and fires immediately if the device is already inside.
    pub fn circle(request_id: impl Into<String>, center: LatLng, radius_m: f64) -> Self {
        Self {
            request_id: request_id.into(),
            center,
            radius_m,
            transitions: vec![TransitionKind::Enter],
            initial_trigger: Some(TransitionKind::Enter),
            expiration: Expiration::Never,
        }
    }

    pub fn for_reminder(reminder: &Reminder) -> Self {
        Self::circle(reminder.id.clone(), reminder.location, reminder.radius)
    }
}
