//! Turn reminders into boundary watches with the geofencing provider, and cancel them.
//!
//! Checks location permission before registering; never asks for it.

use crate::domain::{DomainError, GeofenceRequest, GeofenceStatus, LatLng};
use crate::ports::{GeofencingPort, PermissionPort};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct GeofenceRegistrar {
    provider: Arc<dyn GeofencingPort>,
    permissions: Arc<dyn PermissionPort>,
    /// Background location is needed for watches to fire while the app is not in front.
    require_background: bool,
}

impl GeofenceRegistrar {
    pub fn new(
        provider: Arc<dyn GeofencingPort>,
        permissions: Arc<dyn PermissionPort>,
        require_background: bool,
    ) -> Self {
        Self {
            provider,
            permissions,
            require_background,
        }
    }

    /// Start watching a circle of `radius` meters around `location`, keyed by `id`.
    pub async fn register(&self, id: &str, location: LatLng, radius: f64) -> Result<(), DomainError> {
        self.check_permission()?;

        let request = GeofenceRequest::circle(id, location, radius);
        debug!(request_id = id, center = %location, radius_m = radius, "registering geofence");
        self.provider
            .add_geofence(&request)
            .await
            .map_err(into_registration_error)
    }

    /// Stop watching `id`. Succeeds when no such watch exists.
    pub async fn unregister(&self, id: &str) -> Result<(), DomainError> {
        debug!(request_id = id, "unregistering geofence");
        self.provider
            .remove_geofence(id)
            .await
            .map_err(into_registration_error)
    }

    fn check_permission(&self) -> Result<(), DomainError> {
        if !self.permissions.has_foreground_location() {
            warn!("geofence registration attempted without foreground location permission");
            return Err(DomainError::PermissionDenied(
                "foreground location access is not granted".into(),
            ));
        }
        if self.require_background && !self.permissions.has_background_location() {
            warn!("geofence registration attempted without background location permission");
            return Err(DomainError::PermissionDenied(
                "background location access is not granted".into(),
            ));
        }
        Ok(())
    }
}

/// Provider failures keep their status; anything else becomes `Unknown`.
fn into_registration_error(e: DomainError) -> DomainError {
    match e {
        DomainError::Registration { .. } | DomainError::PermissionDenied(_) => e,
        other => {
            warn!(error = %other, "geofence call failed outside the provider");
            DomainError::Registration {
                status: GeofenceStatus::Unknown(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::permissions::StaticPermissions;
    use crate::adapters::provider::{GeofenceCall, InMemoryGeofencing};

    struct BrokenProvider;

    #[async_trait::async_trait]
    impl GeofencingPort for BrokenProvider {
        async fn add_geofence(&self, _request: &GeofenceRequest) -> Result<(), DomainError> {
            Err(DomainError::Persistence("binder died".into()))
        }

        async fn remove_geofence(&self, _request_id: &str) -> Result<(), DomainError> {
            Err(DomainError::Persistence("binder died".into()))
        }
    }

    fn registrar(
        provider: Arc<InMemoryGeofencing>,
        foreground: bool,
        background: bool,
        require_background: bool,
    ) -> GeofenceRegistrar {
        GeofenceRegistrar::new(
            provider,
            Arc::new(StaticPermissions::new(foreground, background)),
            require_background,
        )
    }

    #[tokio::test]
    async fn test_register_and_unregister() {
        let provider = Arc::new(InMemoryGeofencing::new());
        let reg = registrar(Arc::clone(&provider), true, true, true);

        reg.register("r1", LatLng::new(1.0, 2.0), 100.0).await.unwrap();
        reg.unregister("r1").await.unwrap();
        reg.unregister("r1").await.unwrap();

        assert_eq!(
            provider.calls().await,
            vec![
                GeofenceCall::Add("r1".into()),
                GeofenceCall::Remove("r1".into()),
                GeofenceCall::Remove("r1".into()),
            ]
        );
        assert!(provider.active_ids().await.is_empty());
    }

    #[tokio::test]
    async fn test_register_without_permission() {
        let provider = Arc::new(InMemoryGeofencing::new());

        let no_foreground = registrar(Arc::clone(&provider), false, true, true);
        let err = no_foreground
            .register("r1", LatLng::new(1.0, 2.0), 100.0)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(_)));

        let no_background = registrar(Arc::clone(&provider), true, false, true);
        assert!(no_background
            .register("r1", LatLng::new(1.0, 2.0), 100.0)
            .await
            .is_err());

        assert!(provider.calls().await.is_empty());

        let background_optional = registrar(Arc::clone(&provider), true, false, false);
        background_optional
            .register("r1", LatLng::new(1.0, 2.0), 100.0)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_provider_status_is_kept() {
        let provider = Arc::new(InMemoryGeofencing::new());
        provider
            .fail_add_with(Some(GeofenceStatus::TooManyPendingIntents))
            .await;
        let reg = registrar(Arc::clone(&provider), true, true, true);

        let err = reg
            .register("r1", LatLng::new(1.0, 2.0), 100.0)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::Registration {
                status: GeofenceStatus::TooManyPendingIntents
            }
        ));
    }

    #[tokio::test]
    async fn test_non_provider_failure_is_unknown() {
        let reg = GeofenceRegistrar::new(
            Arc::new(BrokenProvider),
            Arc::new(StaticPermissions::granted()),
            true,
        );
        let err = reg.unregister("r1").await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Registration {
                status: GeofenceStatus::Unknown(None)
            }
        ));
    }
}
