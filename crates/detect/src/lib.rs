//! Copy-detection channels for clipcue.
//!
//! Two independent, deliberately redundant channels feed the trigger
//! coordinator:
//!
//! - [`CopyClassifier`] watches the accessibility event stream for
//!   patterns that correlate with a copy action (pure logic, no IO).
//! - [`LogDetector`] tails a system log source for copy markers on a
//!   background schedule, gated on a read permission the user may never
//!   grant.
//!
//! Neither channel is reliable alone; deduplication across them is the
//! coordinator's job, not ours.

mod classifier;
mod log_channel;

pub use classifier::{CopyClassifier, DetectionProfile, DEFAULT_COPY_LABEL, HISTORY_WINDOW};
pub use log_channel::{
    LogDetector, LogDetectorConfig, LogDetectorListener, LogPermissionProbe, LogSource,
    LogTailError, ScriptedLogSource, StaticPermissionProbe, DEFAULT_COPY_MARKERS,
    DEFAULT_LOG_POLL_INTERVAL,
};
