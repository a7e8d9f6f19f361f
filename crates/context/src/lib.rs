//! UI context tracking for clipcue.
//!
//! This crate owns everything the engine knows about the screen between
//! events: which node the user is typing into, whether an assistive
//! keyboard is showing, and whether the screen is interactive at all.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Domain Layer                             │
//! │  node.rs       - NodeId handle, UiTreeProvider trait (pure) │
//! │  focus.rs      - FocusTracker resolution logic (pure)       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Application Layer                           │
//! │  visibility.rs - Debounced visibility confirmation worker   │
//! │  provider.rs   - Screen / window state provider traits      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The node tree itself always belongs to the host; this crate only holds
//! opaque `NodeId` handles and re-validates them through the provider
//! before every use.

mod focus;
mod node;
mod provider;
mod visibility;

pub use focus::{CaretContext, FocusState, FocusTracker, NodeObservation};
pub use node::{InMemoryTree, NodeAction, NodeId, NodeSpec, NullTreeProvider, UiTreeProvider};
pub use provider::{
    NullScreenState, NullWindowState, ScreenStateProvider, ScreenStateRef, WindowStateProvider,
    WindowStateRef,
};
pub use visibility::{
    VisibilityCallback, VisibilityTracker, DEFAULT_VISIBILITY_DEBOUNCE,
};
