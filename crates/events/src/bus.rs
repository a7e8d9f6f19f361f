//! Event bus abstraction for decoupled status emission.
//!
//! The engine reports dispatches, visibility transitions, and detector
//! status without knowing what shell is listening. Hosts bridge `emit`
//! into their own event system; tests read everything back through
//! [`InMemoryEventBus`].

use std::sync::{Arc, Mutex};

/// Sink for engine status events.
pub trait EventBus: Send + Sync {
    /// Emit an event under a topic (see [`crate::event_names`]) with a
    /// JSON payload.
    fn emit(&self, topic: &str, payload: serde_json::Value);
}

/// Shared reference to an event bus.
pub type EventBusRef = Arc<dyn EventBus>;

/// One event captured by [`InMemoryEventBus`].
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    pub topic: String,
    pub payload: serde_json::Value,
}

/// Recording bus for tests: keeps every emission for inspection.
#[derive(Default)]
pub struct InMemoryEventBus {
    records: Mutex<Vec<RecordedEvent>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events, in emission order.
    pub fn records(&self) -> Vec<RecordedEvent> {
        self.records.lock().unwrap().clone()
    }

    /// Recorded events for one topic.
    pub fn records_for(&self, topic: &str) -> Vec<RecordedEvent> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|record| record.topic == topic)
            .cloned()
            .collect()
    }

    /// Number of emissions for one topic.
    pub fn count_for(&self, topic: &str) -> usize {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|record| record.topic == topic)
            .count()
    }

    /// Drain and return everything recorded so far.
    pub fn take(&self) -> Vec<RecordedEvent> {
        std::mem::take(&mut *self.records.lock().unwrap())
    }
}

impl EventBus for InMemoryEventBus {
    fn emit(&self, topic: &str, payload: serde_json::Value) {
        self.records.lock().unwrap().push(RecordedEvent {
            topic: topic.to_string(),
            payload,
        });
    }
}

/// Bus that discards everything; for hosts that do not surface status.
pub struct NullEventBus;

impl EventBus for NullEventBus {
    fn emit(&self, _topic: &str, _payload: serde_json::Value) {}
}
