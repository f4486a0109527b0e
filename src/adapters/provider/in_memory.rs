//! In-process geofencing provider. Implements GeofencingPort.
//!
//! Keeps the active watches in memory and records every call in order. Used by the console
//! binary (where no platform provider exists) and as a test double.

use crate::domain::{DomainError, GeofenceRequest, GeofenceStatus};
use crate::ports::GeofencingPort;
use indexmap::IndexMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// One call received by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeofenceCall {
    Add(String),
    Remove(String),
}

#[derive(Default)]
struct ProviderState {
    active: IndexMap<String, GeofenceRequest>,
    calls: Vec<GeofenceCall>,
    fail_add: Option<GeofenceStatus>,
    fail_remove: Option<GeofenceStatus>,
    max_geofences: Option<usize>,
}

/// In-memory geofencing provider.
#[derive(Default)]
pub struct InMemoryGeofencing {
    state: Mutex<ProviderState>,
}

impl InMemoryGeofencing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject registrations past `max` active watches with `TooManyGeofences`.
    pub fn with_limit(max: usize) -> Self {
        Self {
            state: Mutex::new(ProviderState {
                max_geofences: Some(max),
                ..Default::default()
            }),
        }
    }

    /// Make every subsequent add fail with `status` (None to stop failing).
    pub async fn fail_add_with(&self, status: Option<GeofenceStatus>) {
        self.state.lock().await.fail_add = status;
    }

    /// Make every subsequent remove fail with `status` (None to stop failing).
    pub async fn fail_remove_with(&self, status: Option<GeofenceStatus>) {
        self.state.lock().await.fail_remove = status;
    }

    pub async fn calls(&self) -> Vec<GeofenceCall> {
        self.state.lock().await.calls.clone()
    }

    pub async fn active_ids(&self) -> Vec<String> {
        self.state.lock().await.active.keys().cloned().collect()
    }
}

#[async_trait::async_trait]
impl GeofencingPort for InMemoryGeofencing {
    async fn add_geofence(&self, request: &GeofenceRequest) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        state.calls.push(GeofenceCall::Add(request.request_id.clone()));

        if let Some(status) = state.fail_add {
            return Err(DomainError::Registration { status });
        }
        let replacing = state.active.contains_key(&request.request_id);
        if let Some(max) = state.max_geofences {
            if !replacing && state.active.len() >= max {
                return Err(DomainError::Registration {
                    status: GeofenceStatus::TooManyGeofences,
                });
            }
        }

        state
            .active
            .insert(request.request_id.clone(), request.clone());
        info!(
            request_id = %request.request_id,
            center = %request.center,
            radius_m = request.radius_m,
            replacing,
            "geofence watch started"
        );
        Ok(())
    }

    async fn remove_geofence(&self, request_id: &str) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        state.calls.push(GeofenceCall::Remove(request_id.to_string()));

        if let Some(status) = state.fail_remove {
            return Err(DomainError::Registration { status });
        }
        if state.active.shift_remove(request_id).is_some() {
            info!(request_id, "geofence watch stopped");
        } else {
            debug!(request_id, "no active geofence to stop");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LatLng, ReminderDraft};

    fn request(id: &str) -> GeofenceRequest {
        let reminder = ReminderDraft::new()
            .with_id(id)
            .with_location(LatLng::new(1.0, 2.0))
            .with_radius(100.0)
            .with_message("m")
            .validate()
            .unwrap();
        GeofenceRequest::for_reminder(&reminder)
    }

    #[tokio::test]
    async fn test_remove_unknown_is_ok() {
        let provider = InMemoryGeofencing::new();
        provider.remove_geofence("missing").await.unwrap();
        assert_eq!(provider.calls().await, vec![GeofenceCall::Remove("missing".into())]);
    }

    #[tokio::test]
    async fn test_limit_rejects_new_but_allows_replace() {
        let provider = InMemoryGeofencing::with_limit(1);
        provider.add_geofence(&request("a")).await.unwrap();
        provider.add_geofence(&request("a")).await.unwrap();
        let err = provider.add_geofence(&request("b")).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Registration {
                status: GeofenceStatus::TooManyGeofences
            }
        ));
        assert_eq!(provider.active_ids().await, vec!["a".to_string()]);
    }
}
