//! Handle one provider callback: decode -> resolve -> dispatch.
//!
//! Every failure ends the callback with a log line and an `IngestOutcome`; nothing is
//! retried and nothing propagates back to the provider.

use crate::adapters::provider::decode_payload;
use crate::domain::{DomainError, GeofenceStatus, ProviderEvent};
use crate::ports::ProviderPayload;
use crate::usecases::notification_dispatcher::NotificationDispatcher;
use crate::usecases::reminder_store::ReminderStore;
use crate::usecases::transition_resolver::{NoActionReason, Resolution, resolve};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Control-flow stage of a single callback. Not kept between callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStage {
    Idle,
    Validating,
    Resolving,
    Dispatching,
}

/// How a callback ended.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    Malformed(String),
    ProviderError(GeofenceStatus),
    NoAction(NoActionReason),
    Dispatched { notification_id: u32 },
    DispatchFailed(String),
}

pub struct TransitionIngestion {
    store: Arc<ReminderStore>,
    dispatcher: Arc<NotificationDispatcher>,
}

impl TransitionIngestion {
    pub fn new(store: Arc<ReminderStore>, dispatcher: Arc<NotificationDispatcher>) -> Self {
        Self { store, dispatcher }
    }

    pub async fn handle(&self, payload: ProviderPayload) -> IngestOutcome {
        let outcome = self.run_stages(payload).await;
        debug!(stage = ?IngestStage::Idle, outcome = ?outcome, "callback done");
        outcome
    }

    async fn run_stages(&self, payload: ProviderPayload) -> IngestOutcome {
        debug!(stage = ?IngestStage::Validating, bytes = payload.0.len(), "callback received");
        let event = match decode_payload(&payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "dropping provider callback");
                return IngestOutcome::Malformed(e.to_string());
            }
        };
        if let ProviderEvent::Failed(status) = event {
            error!(code = ?status.code(), "geofence transition error: {}", status);
            return IngestOutcome::ProviderError(status);
        }

        debug!(stage = ?IngestStage::Resolving, "resolving transition");
        let resolution = {
            let snapshot = self.store.snapshot().await;
            resolve(&event, &snapshot)
        };
        let reminder = match resolution {
            Ok(Resolution::Notify(reminder)) => reminder,
            Ok(Resolution::NoAction(reason)) => {
                debug!(reason = %reason, "no notification for transition");
                return IngestOutcome::NoAction(reason);
            }
            Err(e) => {
                error!(error = %e, "transition could not be resolved");
                return resolve_error_outcome(e);
            }
        };

        debug!(stage = ?IngestStage::Dispatching, reminder_id = %reminder.id, "dispatching notification");
        match self.dispatcher.dispatch(&reminder).await {
            Ok(notification_id) => {
                info!(reminder_id = %reminder.id, notification_id, "reminder triggered");
                IngestOutcome::Dispatched { notification_id }
            }
            Err(e) => {
                error!(reminder_id = %reminder.id, error = %e, "notification dispatch failed");
                IngestOutcome::DispatchFailed(e.to_string())
            }
        }
    }
}

/// `resolve` only fails on errored provider events.
fn resolve_error_outcome(e: DomainError) -> IngestOutcome {
    match e {
        DomainError::TransitionEvent { status } => IngestOutcome::ProviderError(status),
        _ => IngestOutcome::ProviderError(GeofenceStatus::Unknown(None)),
    }
}
