//! Map a provider event to at most one stored reminder.
//!
//! Only ENTER crossings are acted on, and only the first triggering id of a batch is looked
//! up; the rest of the batch is ignored. Stale ids (reminder already removed) resolve to
//! no action.

use crate::domain::{DomainError, ProviderEvent, Reminder, TransitionKind};
use crate::ports::ReminderLookup;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Notify(Reminder),
    NoAction(NoActionReason),
}

#[derive(Debug, Clone, PartialEq)]
pub enum NoActionReason {
    /// EXIT and DWELL crossings are not acted on.
    IgnoredTransition(TransitionKind),
    /// No reminder with this id (removed, or never existed).
    UnknownReminder(String),
    /// The stored reminder has nothing to show or nowhere to link to.
    IncompleteReminder(String),
}

impl std::fmt::Display for NoActionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IgnoredTransition(kind) => write!(f, "{:?} transition ignored", kind),
            Self::UnknownReminder(id) => write!(f, "no reminder with id {}", id),
            Self::IncompleteReminder(id) => write!(f, "reminder {} is incomplete", id),
        }
    }
}

/// Resolve `event` against `lookup`. Fails only for provider-errored events, which never
/// touch the lookup.
pub fn resolve<L>(event: &ProviderEvent, lookup: &L) -> Result<Resolution, DomainError>
where
    L: ReminderLookup + ?Sized,
{
    let event = match event {
        ProviderEvent::Failed(status) => {
            return Err(DomainError::TransitionEvent { status: *status });
        }
        ProviderEvent::Crossed(event) => event,
    };

    if event.kind != TransitionKind::Enter {
        return Ok(Resolution::NoAction(NoActionReason::IgnoredTransition(
            event.kind,
        )));
    }

    let Some(first_id) = event.triggering_ids.first() else {
        return Ok(Resolution::NoAction(NoActionReason::UnknownReminder(
            String::new(),
        )));
    };
    if event.triggering_ids.len() > 1 {
        debug!(
            first_id = %first_id,
            ignored = event.triggering_ids.len() - 1,
            "batched transition: resolving first geofence only"
        );
    }

    let Some(reminder) = lookup.find(first_id) else {
        return Ok(Resolution::NoAction(NoActionReason::UnknownReminder(
            first_id.clone(),
        )));
    };

    if reminder.message.trim().is_empty() || !reminder.location.is_valid() {
        return Ok(Resolution::NoAction(NoActionReason::IncompleteReminder(
            reminder.id.clone(),
        )));
    }

    Ok(Resolution::Notify(reminder.clone()))
}
