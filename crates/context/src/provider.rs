//! Provider traits for transient system state.
//!
//! These abstract the platform queries the engine samples on the event
//! path, keeping the domain logic pure and testable.

use std::sync::Arc;

/// Provider for screen interactivity (display on and accepting input).
pub trait ScreenStateProvider: Send + Sync {
    fn is_interactive(&self) -> bool;
}

/// Provider for window-composition queries at visibility-confirmation
/// time.
pub trait WindowStateProvider: Send + Sync {
    /// Whether an input-method (assistive keyboard) window is currently
    /// part of the window stack.
    fn input_method_visible(&self) -> bool;
}

pub type ScreenStateRef = Arc<dyn ScreenStateProvider>;
pub type WindowStateRef = Arc<dyn WindowStateProvider>;

/// Null implementation that treats the screen as always interactive.
pub struct NullScreenState;

impl ScreenStateProvider for NullScreenState {
    fn is_interactive(&self) -> bool {
        true
    }
}

/// Null implementation that never sees an input-method window.
pub struct NullWindowState;

impl WindowStateProvider for NullWindowState {
    fn input_method_visible(&self) -> bool {
        false
    }
}
