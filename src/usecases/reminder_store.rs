//! Reminder store: the single source of truth for reminders, shared by the front-end and the
//! ingestion path.
//!
//! - Writers (add/remove) are serialized by `writer`; each also talks to the provider and
//!   the optional persistence port while holding it
//! - The map itself is only locked for the in-memory change, so resolves never wait on a
//!   provider call
//! - A `StoreSnapshot` holds the read lock: a resolve sees either all of a write or none of it

use crate::domain::{DomainError, GeofenceStatus, Reminder, ReminderDraft};
use crate::ports::{ReminderLookup, ReminderPersistencePort};
use crate::usecases::geofence_registrar::GeofenceRegistrar;
use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, RwLockReadGuard};
use tracing::{error, info, warn};

type ReminderMap = IndexMap<String, Reminder>;

pub struct ReminderStore {
    reminders: RwLock<ReminderMap>,
    writer: Mutex<()>,
    registrar: Arc<GeofenceRegistrar>,
    persistence: Option<Arc<dyn ReminderPersistencePort>>,
}

/// Consistent read view of the store. Drop it promptly; writers wait on it.
pub struct StoreSnapshot<'a>(RwLockReadGuard<'a, ReminderMap>);

impl ReminderLookup for StoreSnapshot<'_> {
    fn find(&self, id: &str) -> Option<&Reminder> {
        self.0.get(id)
    }
}

impl StoreSnapshot<'_> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Result of re-registering every stored reminder.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ResyncReport {
    pub registered: usize,
    pub failed: usize,
}

impl ReminderStore {
    /// In-memory store; contents live as long as the process.
    pub fn new(registrar: Arc<GeofenceRegistrar>) -> Self {
        Self {
            reminders: RwLock::new(IndexMap::new()),
            writer: Mutex::new(()),
            registrar,
            persistence: None,
        }
    }

    /// Store backed by `persistence`. Previously saved reminders are loaded immediately;
    /// their watches are not re-registered (see `resync_watches`).
    pub async fn with_persistence(
        registrar: Arc<GeofenceRegistrar>,
        persistence: Arc<dyn ReminderPersistencePort>,
    ) -> Result<Self, DomainError> {
        let saved = persistence.load_all().await?;
        let mut map = IndexMap::with_capacity(saved.len());
        for reminder in saved {
            map.insert(reminder.id.clone(), reminder);
        }
        info!(count = map.len(), "reminders loaded");
        Ok(Self {
            reminders: RwLock::new(map),
            writer: Mutex::new(()),
            registrar,
            persistence: Some(persistence),
        })
    }

    /// Validate, register the watch, then insert. Nothing is stored unless registration
    /// succeeds. A draft without id gets a generated one; an existing id is replaced and
    /// moves to the end.
    pub async fn add(&self, draft: ReminderDraft) -> Result<Reminder, DomainError> {
        let mut reminder = draft.validate()?;
        if reminder.id.is_empty() {
            reminder.id = uuid::Uuid::new_v4().to_string();
        }

        let _writer = self.writer.lock().await;

        self.registrar
            .register(&reminder.id, reminder.location, reminder.radius)
            .await?;

        let (previous, snapshot) = {
            let mut map = self.reminders.write().await;
            let previous = map.shift_remove_full(&reminder.id);
            map.insert(reminder.id.clone(), reminder.clone());
            (previous, map.values().cloned().collect::<Vec<_>>())
        };

        if let Err(e) = self.persist(&snapshot).await {
            self.roll_back_add(&reminder, previous).await;
            return Err(e);
        }

        info!(reminder_id = %reminder.id, location = %reminder.location, radius = reminder.radius, "reminder added");
        Ok(reminder)
    }

    /// Undo an insert whose save failed: restore the previous entry (and its watch) or drop
    /// the new watch.
    async fn roll_back_add(&self, added: &Reminder, previous: Option<(usize, String, Reminder)>) {
        {
            let mut map = self.reminders.write().await;
            map.shift_remove(&added.id);
            if let Some((index, id, reminder)) = previous.clone() {
                let index = index.min(map.len());
                map.shift_insert(index, id, reminder);
            }
        }
        let restored = match previous {
            Some((_, _, old)) => {
                self.registrar
                    .register(&old.id, old.location, old.radius)
                    .await
            }
            None => self.registrar.unregister(&added.id).await,
        };
        if let Err(e) = restored {
            warn!(reminder_id = %added.id, error = %e, "could not restore geofence after failed save");
        }
    }

    pub async fn get(&self, id: &str) -> Option<Reminder> {
        self.reminders.read().await.get(id).cloned()
    }

    /// All reminders in insertion order.
    pub async fn get_all(&self) -> Vec<Reminder> {
        self.reminders.read().await.values().cloned().collect()
    }

    /// Most recently added reminder.
    pub async fn get_last(&self) -> Option<Reminder> {
        self.reminders
            .read()
            .await
            .last()
            .map(|(_, reminder)| reminder.clone())
    }

    /// Remove by id, save, then cancel the watch. A failed save puts the reminder back in
    /// place and leaves its watch armed. Once saved, the reminder stays removed even when
    /// cancellation fails; that case returns `UnregisterFailed` so the caller can tell the
    /// user a watch may still be active. Returns the removed reminder, if there was one.
    pub async fn remove(&self, id: &str) -> Result<Option<Reminder>, DomainError> {
        let _writer = self.writer.lock().await;

        let (removed, snapshot) = {
            let mut map = self.reminders.write().await;
            let removed = map.shift_remove_full(id);
            (removed, map.values().cloned().collect::<Vec<_>>())
        };

        if let Some((index, _, reminder)) = &removed {
            if let Err(e) = self.persist(&snapshot).await {
                let mut map = self.reminders.write().await;
                let index = (*index).min(map.len());
                map.shift_insert(index, reminder.id.clone(), reminder.clone());
                warn!(reminder_id = id, error = %e, "removal not saved, reminder restored");
                return Err(e);
            }
        }
        let removed = removed.map(|(_, _, reminder)| reminder);

        if let Err(e) = self.registrar.unregister(id).await {
            let status = match e {
                DomainError::Registration { status } => status,
                _ => GeofenceStatus::Unknown(None),
            };
            if removed.is_none() {
                warn!(reminder_id = id, status = ?status.code(), "could not cancel geofence: {}", status);
                return Err(DomainError::CancelFailed {
                    id: id.to_string(),
                    status,
                });
            }
            error!(reminder_id = id, status = ?status.code(), "reminder removed but geofence is orphaned: {}", status);
            return Err(DomainError::UnregisterFailed {
                id: id.to_string(),
                status,
            });
        }

        if removed.is_some() {
            info!(reminder_id = id, "reminder removed");
        }
        Ok(removed)
    }

    /// Re-register a watch for every stored reminder, e.g. after the provider lost its
    /// watches. Failures are logged and counted, never fatal.
    pub async fn resync_watches(&self) -> ResyncReport {
        let _writer = self.writer.lock().await;
        let reminders = self.get_all().await;

        let mut report = ResyncReport::default();
        for reminder in &reminders {
            match self
                .registrar
                .register(&reminder.id, reminder.location, reminder.radius)
                .await
            {
                Ok(()) => report.registered += 1,
                Err(e) => {
                    warn!(reminder_id = %reminder.id, error = %e, "resync failed for reminder");
                    report.failed += 1;
                }
            }
        }
        info!(
            registered = report.registered,
            failed = report.failed,
            "geofence resync complete"
        );
        report
    }

    /// Read lock over the whole store for one resolve.
    pub async fn snapshot(&self) -> StoreSnapshot<'_> {
        StoreSnapshot(self.reminders.read().await)
    }

    pub async fn len(&self) -> usize {
        self.reminders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.reminders.read().await.is_empty()
    }

    async fn persist(&self, snapshot: &[Reminder]) -> Result<(), DomainError> {
        match &self.persistence {
            Some(p) => p.save_all(snapshot).await,
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::permissions::StaticPermissions;
    use crate::adapters::provider::{GeofenceCall, InMemoryGeofencing};
    use crate::domain::LatLng;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn draft(id: &str, message: &str) -> ReminderDraft {
        ReminderDraft::new()
            .with_id(id)
            .with_location(LatLng::new(1.0, 2.0))
            .with_radius(150.0)
            .with_message(message)
    }

    fn store_with(provider: &Arc<InMemoryGeofencing>) -> ReminderStore {
        let registrar = GeofenceRegistrar::new(
            Arc::clone(provider) as Arc<dyn crate::ports::GeofencingPort>,
            Arc::new(StaticPermissions::granted()),
            true,
        );
        ReminderStore::new(Arc::new(registrar))
    }

    /// Persistence double whose saves can be switched to fail.
    #[derive(Default)]
    struct FlakyPersistence {
        fail: AtomicBool,
        saved: tokio::sync::Mutex<Vec<Reminder>>,
    }

    #[async_trait::async_trait]
    impl ReminderPersistencePort for FlakyPersistence {
        async fn load_all(&self) -> Result<Vec<Reminder>, DomainError> {
            Ok(self.saved.lock().await.clone())
        }

        async fn save_all(&self, reminders: &[Reminder]) -> Result<(), DomainError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(DomainError::Persistence("disk full".into()));
            }
            *self.saved.lock().await = reminders.to_vec();
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_add_then_remove() {
        let provider = Arc::new(InMemoryGeofencing::new());
        let store = store_with(&provider);

        let added = store.add(draft("r1", "Buy milk")).await.unwrap();
        assert_eq!(store.get("r1").await, Some(added.clone()));

        let removed = store.remove("r1").await.unwrap();
        assert_eq!(removed, Some(added));
        assert_eq!(store.get("r1").await, None);
        assert_eq!(
            provider.calls().await,
            vec![GeofenceCall::Add("r1".into()), GeofenceCall::Remove("r1".into())]
        );
    }

    #[tokio::test]
    async fn test_add_generates_id() {
        let provider = Arc::new(InMemoryGeofencing::new());
        let store = store_with(&provider);

        let added = store
            .add(ReminderDraft {
                id: None,
                ..draft("", "Water plants")
            })
            .await
            .unwrap();
        assert!(!added.id.is_empty());
        assert_eq!(provider.active_ids().await, vec![added.id.clone()]);
    }

    #[tokio::test]
    async fn test_invalid_add_leaves_store_unchanged() {
        let provider = Arc::new(InMemoryGeofencing::new());
        let store = store_with(&provider);
        store.add(draft("keep", "Keep me")).await.unwrap();

        let invalid = [
            draft("a", ""),
            ReminderDraft {
                location: None,
                ..draft("b", "msg")
            },
            ReminderDraft {
                radius: None,
                ..draft("c", "msg")
            },
        ];
        for d in invalid {
            let err = store.add(d).await.unwrap_err();
            assert!(matches!(err, DomainError::InvalidReminder(_)));
        }

        let ids: Vec<_> = store.get_all().await.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["keep".to_string()]);
        assert_eq!(provider.calls().await.len(), 1);
    }

    #[tokio::test]
    async fn test_registration_failure_rolls_back() {
        let provider = Arc::new(InMemoryGeofencing::new());
        provider
            .fail_add_with(Some(GeofenceStatus::TooManyGeofences))
            .await;
        let store = store_with(&provider);

        let err = store.add(draft("r1", "Buy milk")).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::Registration {
                status: GeofenceStatus::TooManyGeofences
            }
        ));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_permission_denied_is_surfaced() {
        let provider = Arc::new(InMemoryGeofencing::new());
        let registrar = GeofenceRegistrar::new(
            Arc::clone(&provider) as Arc<dyn crate::ports::GeofencingPort>,
            Arc::new(StaticPermissions::new(false, false)),
            true,
        );
        let store = ReminderStore::new(Arc::new(registrar));

        let err = store.add(draft("r1", "Buy milk")).await.unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_remove_reports_orphaned_watch() {
        let provider = Arc::new(InMemoryGeofencing::new());
        let store = store_with(&provider);
        store.add(draft("r1", "Buy milk")).await.unwrap();
        provider
            .fail_remove_with(Some(GeofenceStatus::NotAvailable))
            .await;

        let err = store.remove("r1").await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::UnregisterFailed { ref id, status: GeofenceStatus::NotAvailable } if id == "r1"
        ));
        assert_eq!(store.get("r1").await, None);
        assert_eq!(provider.active_ids().await, vec!["r1".to_string()]);
    }

    #[tokio::test]
    async fn test_cancel_failure_for_unknown_id() {
        let provider = Arc::new(InMemoryGeofencing::new());
        let store = store_with(&provider);
        provider
            .fail_remove_with(Some(GeofenceStatus::NotAvailable))
            .await;

        let err = store.remove("ghost").await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::CancelFailed { ref id, status: GeofenceStatus::NotAvailable } if id == "ghost"
        ));
        assert!(!err.to_string().contains("removed"));
    }

    #[tokio::test]
    async fn test_remove_missing_is_ok() {
        let provider = Arc::new(InMemoryGeofencing::new());
        let store = store_with(&provider);
        assert_eq!(store.remove("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_order_and_last() {
        let provider = Arc::new(InMemoryGeofencing::new());
        let store = store_with(&provider);
        assert_eq!(store.get_last().await, None);

        store.add(draft("a", "first")).await.unwrap();
        store.add(draft("b", "second")).await.unwrap();
        store.add(draft("c", "third")).await.unwrap();
        assert_eq!(store.get_last().await.map(|r| r.id), Some("c".to_string()));

        // Re-adding an existing id replaces it and makes it the latest.
        store.add(draft("a", "first, edited")).await.unwrap();
        let all = store.get_all().await;
        let ids: Vec<_> = all.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        assert_eq!(all[2].message, "first, edited");
    }

    #[tokio::test]
    async fn test_failed_save_rolls_back_add() {
        let provider = Arc::new(InMemoryGeofencing::new());
        let persistence = Arc::new(FlakyPersistence::default());
        let registrar = GeofenceRegistrar::new(
            Arc::clone(&provider) as Arc<dyn crate::ports::GeofencingPort>,
            Arc::new(StaticPermissions::granted()),
            true,
        );
        let store = ReminderStore::with_persistence(
            Arc::new(registrar),
            Arc::clone(&persistence) as Arc<dyn ReminderPersistencePort>,
        )
        .await
        .unwrap();
        store.add(draft("a", "first")).await.unwrap();
        store.add(draft("b", "second")).await.unwrap();

        persistence.fail.store(true, Ordering::SeqCst);
        let err = store.add(draft("c", "third")).await.unwrap_err();
        assert!(matches!(err, DomainError::Persistence(_)));
        assert_eq!(store.get("c").await, None);
        assert!(!provider.active_ids().await.contains(&"c".to_string()));

        // Replacing an existing id restores the old entry in place.
        let err = store.add(draft("a", "changed")).await.unwrap_err();
        assert!(matches!(err, DomainError::Persistence(_)));
        let all = store.get_all().await;
        assert_eq!(all[0].id, "a");
        assert_eq!(all[0].message, "first");
    }

    #[tokio::test]
    async fn test_failed_save_rolls_back_remove() {
        let provider = Arc::new(InMemoryGeofencing::new());
        let persistence = Arc::new(FlakyPersistence::default());
        let registrar = Arc::new(GeofenceRegistrar::new(
            Arc::clone(&provider) as Arc<dyn crate::ports::GeofencingPort>,
            Arc::new(StaticPermissions::granted()),
            true,
        ));
        let store = ReminderStore::with_persistence(
            Arc::clone(&registrar),
            Arc::clone(&persistence) as Arc<dyn ReminderPersistencePort>,
        )
        .await
        .unwrap();
        store.add(draft("a", "first")).await.unwrap();
        store.add(draft("b", "second")).await.unwrap();

        persistence.fail.store(true, Ordering::SeqCst);
        let err = store.remove("a").await.unwrap_err();
        assert!(matches!(err, DomainError::Persistence(_)));

        // Memory, disk and provider all still agree that "a" exists, in its old place.
        let ids: Vec<_> = store.get_all().await.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
        let saved: Vec<_> = persistence
            .load_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(saved, ids);
        assert_eq!(provider.active_ids().await, ids);
        assert!(!provider.calls().await.contains(&GeofenceCall::Remove("a".into())));

        // A restart reloads exactly what the caller still sees.
        let fresh_provider = Arc::new(InMemoryGeofencing::new());
        let reloaded = ReminderStore::with_persistence(
            Arc::new(GeofenceRegistrar::new(
                Arc::clone(&fresh_provider) as Arc<dyn crate::ports::GeofencingPort>,
                Arc::new(StaticPermissions::granted()),
                true,
            )),
            Arc::clone(&persistence) as Arc<dyn ReminderPersistencePort>,
        )
        .await
        .unwrap();
        reloaded.resync_watches().await;
        assert_eq!(fresh_provider.active_ids().await, ids);

        persistence.fail.store(false, Ordering::SeqCst);
        assert!(store.remove("a").await.unwrap().is_some());
        assert_eq!(provider.active_ids().await, vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn test_persisted_reminders_reload_and_resync() {
        let provider = Arc::new(InMemoryGeofencing::new());
        let persistence = Arc::new(FlakyPersistence::default());
        let registrar = Arc::new(GeofenceRegistrar::new(
            Arc::clone(&provider) as Arc<dyn crate::ports::GeofencingPort>,
            Arc::new(StaticPermissions::granted()),
            true,
        ));

        let first = ReminderStore::with_persistence(
            Arc::clone(&registrar),
            Arc::clone(&persistence) as Arc<dyn ReminderPersistencePort>,
        )
        .await
        .unwrap();
        first.add(draft("a", "first")).await.unwrap();
        first.add(draft("b", "second")).await.unwrap();
        first.remove("a").await.unwrap();

        let fresh_provider = Arc::new(InMemoryGeofencing::new());
        let second = ReminderStore::with_persistence(
            Arc::new(GeofenceRegistrar::new(
                Arc::clone(&fresh_provider) as Arc<dyn crate::ports::GeofencingPort>,
                Arc::new(StaticPermissions::granted()),
                true,
            )),
            Arc::clone(&persistence) as Arc<dyn ReminderPersistencePort>,
        )
        .await
        .unwrap();
        let ids: Vec<_> = second.get_all().await.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["b".to_string()]);
        assert!(fresh_provider.active_ids().await.is_empty());

        let report = second.resync_watches().await;
        assert_eq!(report, ResyncReport { registered: 1, failed: 0 });
        assert_eq!(fresh_provider.active_ids().await, vec!["b".to_string()]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_add_and_remove() {
        for _ in 0..20 {
            let provider = Arc::new(InMemoryGeofencing::new());
            let store = Arc::new(store_with(&provider));
            for id in ["s1", "s2", "r2"] {
                store.add(draft(id, "seed")).await.unwrap();
            }

            let adder = {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.add(draft("r1", "new")).await })
            };
            let remover = {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.remove("r2").await })
            };
            adder.await.unwrap().unwrap();
            remover.await.unwrap().unwrap();

            let mut ids: Vec<_> = store.get_all().await.into_iter().map(|r| r.id).collect();
            ids.sort();
            assert_eq!(ids, vec!["r1", "s1", "s2"]);
        }
    }
}
