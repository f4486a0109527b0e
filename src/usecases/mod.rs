//! Application use cases. Orchestrate domain logic via ports.

pub mod geofence_registrar;
pub mod ingestion_worker;
pub mod notification_dispatcher;
pub mod reminder_store;
pub mod transition_ingestion;
pub mod transition_resolver;

pub use geofence_registrar::GeofenceRegistrar;
pub use ingestion_worker::{IngestionWorker, WorkerStats};
pub use notification_dispatcher::NotificationDispatcher;
pub use reminder_store::{ReminderStore, ResyncReport, StoreSnapshot};
pub use transition_ingestion::{IngestOutcome, IngestStage, TransitionIngestion};
pub use transition_resolver::{NoActionReason, Resolution, resolve};
