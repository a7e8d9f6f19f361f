//! Shared event contracts for clipcue.
//!
//! Defines the raw accessibility-event shape the host adapter feeds into
//! the engine, the subscription parameters the host registers with the
//! OS, and the formal DTOs for status events flowing out to the shell.
//! Using shared types prevents runtime deserialization errors from
//! mismatched field names.
//!
//! Also provides the `EventBus` trait for decoupled event emission.

mod bus;

pub use bus::{EventBus, EventBusRef, InMemoryEventBus, NullEventBus, RecordedEvent};

use clipcue_context::NodeId;
use serde::{Deserialize, Serialize};

/// Accessibility event categories the engine subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    ViewClicked,
    ViewFocused,
    ViewLongClicked,
    ViewSelected,
    ViewTextChanged,
    ViewTextSelectionChanged,
    WindowContentChanged,
    WindowStateChanged,
    NotificationStateChanged,
}

/// One accessibility event as delivered by the host adapter.
///
/// Ephemeral: consumed on arrival, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    pub kind: EventKind,
    /// Package of the application that produced the event.
    #[serde(default)]
    pub source_package: Option<String>,
    /// Milliseconds since epoch.
    #[serde(default)]
    pub timestamp_ms: i64,
    /// Handle of the node the event originated from, when the OS
    /// attached one.
    #[serde(default)]
    pub source: Option<NodeId>,
    /// Short display text carried by the event (button caption or
    /// content description), when the OS supplies one.
    #[serde(default)]
    pub label: Option<String>,
}

impl RawEvent {
    pub fn new(kind: EventKind, source_package: Option<&str>) -> Self {
        Self {
            kind,
            source_package: source_package.map(str::to_string),
            timestamp_ms: now_ms(),
            source: None,
            label: None,
        }
    }

    pub fn with_source(mut self, source: NodeId) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }
}

/// Hint for the OS notification-event throttle, in milliseconds.
pub const DEFAULT_NOTIFICATION_TIMEOUT_MS: u64 = 120;

/// What the host should register with the OS event source on behalf of
/// the engine: which event kinds to deliver and how aggressively the OS
/// may coalesce them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionSpec {
    pub kinds: Vec<EventKind>,
    pub notification_timeout_ms: u64,
}

impl SubscriptionSpec {
    /// The standard subscription: every kind the detection and focus
    /// paths consume.
    pub fn standard() -> Self {
        Self {
            kinds: vec![
                EventKind::ViewClicked,
                EventKind::ViewFocused,
                EventKind::ViewLongClicked,
                EventKind::ViewSelected,
                EventKind::ViewTextChanged,
                EventKind::ViewTextSelectionChanged,
                EventKind::WindowContentChanged,
                EventKind::WindowStateChanged,
                EventKind::NotificationStateChanged,
            ],
            notification_timeout_ms: DEFAULT_NOTIFICATION_TIMEOUT_MS,
        }
    }
}

/// Which detection channel produced a candidate signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerOrigin {
    /// Event-pattern classifier match.
    Classifier,
    /// One-shot follow-up after a classifier match.
    FollowUp,
    /// Log-scrape channel match.
    LogChannel,
}

/// Host-reported memory pressure levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryPressure {
    Normal,
    Moderate,
    Critical,
}

/// Event emitted when a copy trigger dispatches downstream.
///
/// Producers: engine (trigger coordinator)
/// Consumers: host shell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerDispatchedEvent {
    /// Unique id for this dispatch.
    pub trigger_id: String,
    pub origin: TriggerOrigin,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub timestamp_ms: i64,
}

impl TriggerDispatchedEvent {
    pub fn new(origin: TriggerOrigin, package: Option<String>) -> Self {
        Self {
            trigger_id: uuid::Uuid::new_v4().to_string(),
            origin,
            package,
            timestamp_ms: now_ms(),
        }
    }
}

/// Event emitted on a committed keyboard-visibility transition.
///
/// Producers: engine (visibility listener)
/// Consumers: host shell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityChangedEvent {
    pub visible: bool,
    #[serde(default)]
    pub timestamp_ms: i64,
}

impl VisibilityChangedEvent {
    pub fn new(visible: bool) -> Self {
        Self {
            visible,
            timestamp_ms: now_ms(),
        }
    }
}

/// Event emitted when the log-scrape channel changes state.
///
/// Producers: engine (log detector bridge)
/// Consumers: host shell (the permission notice)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorStatusEvent {
    pub running: bool,
    /// Set once per session when log-read permission is missing.
    #[serde(default)]
    pub permission_denied: bool,
    #[serde(default)]
    pub timestamp_ms: i64,
}

impl DetectorStatusEvent {
    pub fn running(running: bool) -> Self {
        Self {
            running,
            permission_denied: false,
            timestamp_ms: now_ms(),
        }
    }

    pub fn permission_denied() -> Self {
        Self {
            running: false,
            permission_denied: true,
            timestamp_ms: now_ms(),
        }
    }
}

/// Event emitted when a clipboard change is handed to the clip sink.
///
/// Producers: engine (clipboard observer)
/// Consumers: host shell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipCapturedEvent {
    /// Length of the captured text; the text itself stays out of the
    /// bus.
    pub chars: usize,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub timestamp_ms: i64,
}

impl ClipCapturedEvent {
    pub fn new(text: &str, package: Option<String>) -> Self {
        Self {
            chars: text.chars().count(),
            package,
            timestamp_ms: now_ms(),
        }
    }
}

/// Event names as constants to prevent typos.
pub mod event_names {
    /// Copy trigger dispatched downstream.
    pub const TRIGGER_DISPATCHED: &str = "trigger:dispatched";
    /// Keyboard visibility transition.
    pub const VISIBILITY_CHANGED: &str = "visibility:changed";
    /// Log-scrape channel status.
    pub const DETECTOR_STATUS: &str = "detector:status";
    /// Clipboard change handed to storage.
    pub const CLIP_CAPTURED: &str = "capture:stored";
}

/// Milliseconds since epoch, the timestamp format every DTO carries.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
