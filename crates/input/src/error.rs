//! Error types for clipboard access and text insertion.

use thiserror::Error;

/// Errors from the system clipboard primitive.
#[derive(Debug, Error)]
pub enum ClipboardError {
    /// The platform clipboard could not be opened.
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),

    /// A write to the clipboard was refused.
    #[error("clipboard write failed: {0}")]
    WriteFailed(String),
}

/// Errors from the insertion sequence.
///
/// None of these are fatal to the hosting process; the service layer logs
/// them and moves on.
#[derive(Debug, Error)]
pub enum InsertError {
    /// The target node failed its liveness refresh.
    #[error("insertion target is no longer valid")]
    StaleTarget,

    /// The host declined a node action mid-sequence.
    #[error("target rejected {action} action")]
    ActionRejected { action: &'static str },

    /// A replace length reaches back past the start of the text.
    #[error("replace length {requested} exceeds caret position {caret}")]
    ReplaceOutOfRange { requested: usize, caret: usize },

    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}
