//! Synchronization boundary.
//!
//! After every successful write or delete the engine hands a
//! [`ChangeEvent`] to a [`Notifier`]. What happens next (committing,
//! pushing, merging) belongs to the notifier; the engine never waits on it.

use std::sync::{Arc, Mutex};

use tracing::info;

use crate::core::domain::ChangeEvent;

/// Receives change events.
pub trait Notifier: Send + Sync {
    fn changed(&self, event: &ChangeEvent);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn changed(&self, event: &ChangeEvent) {
        (**self).changed(event)
    }
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn changed(&self, _event: &ChangeEvent) {}
}

/// Logs every event at info level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn changed(&self, event: &ChangeEvent) {
        info!(
            store = %event.store,
            path = %event.path,
            kind = ?event.kind,
            at = %event.at.to_rfc3339(),
            "store changed"
        );
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<ChangeEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn changed(&self, event: &ChangeEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event.clone());
    }
}
