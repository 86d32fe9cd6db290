//! Cache Events
//!
//! Diagnostics hook for the store's silent paths. Corrupted entries, rejected
//! writes and evictions never reach the caller as errors, so a listener is the
//! only way to observe them besides the tracing output.

use std::fmt::Debug;
use std::sync::{Arc, Mutex};

/// Something the store did on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// An entry failed to parse and was deleted.
    Corrupted { key: String, reason: String },
    /// An entry outlived its TTL (or schema version) and was deleted.
    Expired { key: String },
    /// An entry was removed to make room for a write.
    Evicted { key: String, size: usize },
    /// A write was refused and the key left untouched.
    WriteRejected { key: String, reason: String },
}

/// Trait for a customized diagnostics listener.
pub trait EventListener: Debug + Send + Sync + 'static {
    /// Called after the store has acted on `event`.
    fn on_event(&self, event: &CacheEvent);
}

/// Listener that ignores everything.
#[derive(Debug, Default)]
pub struct NoopListener;

impl EventListener for NoopListener {
    fn on_event(&self, _event: &CacheEvent) {}
}

/// Listener that keeps every event in memory.
#[derive(Debug, Default, Clone)]
pub struct RecordingListener {
    events: Arc<Mutex<Vec<CacheEvent>>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the events seen so far.
    pub fn events(&self) -> Vec<CacheEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Counts recorded evictions.
    pub fn eviction_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, CacheEvent::Evicted { .. }))
            .count()
    }
}

impl EventListener for RecordingListener {
    fn on_event(&self, event: &CacheEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
