//! Copy detection and action dispatch for clipcue.
//!
//! This crate assembles the detection channels, the focus and visibility
//! trackers, and the insertion engine into one [`CaptureService`] the
//! host adapter drives:
//!
//! ```text
//!                      ┌──────────────────┐
//!   raw OS events ───► │  CaptureService  │ ───► clip sink / overlay
//!                      └────────┬─────────┘
//!            classifier ▲       │       ▲ log channel
//!                       │       ▼       │
//!                      TriggerCoordinator ───► downstream launch
//! ```
//!
//! Both channels may fire for the same real-world copy; the coordinator's
//! gates and single-flight lock make sure exactly one launch happens.

mod coordinator;
mod service;
mod settings;

pub use coordinator::{
    ActionLauncher, DispatchOutcome, LaunchError, NullLauncher, RecordingLauncher,
    TriggerCoordinator,
};
pub use service::{CaptureService, HostBindings, ServiceConfig};
pub use settings::{
    ClipSink, NullClipSink, NullSuggestionSink, RecordingClipSink, RecordingSuggestionSink,
    SettingsCallback, SettingsChange, SettingsSource, StaticSettings, SuggestionSink,
};
