//! Decode provider callback payloads into domain events.
//!
//! The payload is JSON; see `RawCallback` for the accepted shape. Anything that does not
//! describe either an error or a non-empty crossing is rejected as malformed.

use crate::domain::{DomainError, GeofenceStatus, ProviderEvent, TransitionEvent, TransitionKind};
use crate::ports::ProviderPayload;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct RawCallback {
    #[serde(default)]
    error_code: Option<i32>,
    #[serde(default)]
    transition: Option<RawTransition>,
    #[serde(default)]
    triggering_geofences: Option<Vec<RawGeofence>>,
    #[serde(default)]
    triggering_ids: Option<Vec<String>>,
}

/// Transition as the provider constant (1, 2, 4) or its name.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTransition {
    Code(i64),
    Name(String),
}

#[derive(Debug, Deserialize)]
struct RawGeofence {
    request_id: String,
}

/// Map a raw callback body to a `ProviderEvent`.
pub fn decode_payload(payload: &ProviderPayload) -> Result<ProviderEvent, DomainError> {
    let raw: RawCallback = serde_json::from_slice(&payload.0)
        .map_err(|e| DomainError::MalformedPayload(format!("not a callback object: {}", e)))?;

    if let Some(code) = raw.error_code {
        return Ok(ProviderEvent::Failed(GeofenceStatus::from_code(code)));
    }

    let kind = match raw.transition {
        None => {
            return Err(DomainError::MalformedPayload(
                "neither error_code nor transition present".into(),
            ));
        }
        Some(RawTransition::Code(c)) => TransitionKind::from_code(c),
        Some(RawTransition::Name(ref n)) => TransitionKind::from_name(n),
    }
    .ok_or_else(|| DomainError::MalformedPayload(format!("unknown transition {:?}", raw.transition)))?;

    let triggering_ids: Vec<String> = match (raw.triggering_geofences, raw.triggering_ids) {
        (Some(geofences), _) => geofences.into_iter().map(|g| g.request_id).collect(),
        (None, Some(ids)) => ids,
        (None, None) => Vec::new(),
    };
    if triggering_ids.is_empty() {
        return Err(DomainError::MalformedPayload(
            "transition without triggering geofences".into(),
        ));
    }

    Ok(ProviderEvent::Crossed(TransitionEvent {
        kind,
        triggering_ids,
    }))
}
