//! Clipboard access and programmatic text insertion for clipcue.
//!
//! The centerpiece is [`InsertionEngine`], which places text into a
//! resolved UI node via the clipboard: save the current value, write the
//! payload, paste, restore. Both clipboard writes are suppressed so the
//! process's own change observer never re-captures them.
//!
//! # Safety properties
//!
//! - **Clipboard round-trip**: the user's clipboard value survives every
//!   insertion, including aborted ones
//! - **Listener suppression**: synthetic writes never re-enter the
//!   capture path as fresh copies
//! - **Stale-target tolerance**: a target that fails its liveness refresh
//!   degrades to an error before anything is touched
//!
//! # Example
//!
//! ```ignore
//! use clipcue_input::{InsertionEngine, InsertRequest, SystemClipboard};
//!
//! let engine = InsertionEngine::new(tree, Arc::new(SystemClipboard::new()));
//! engine.insert(&InsertRequest::new("suggestion", target).replacing(4))?;
//! ```

mod clipboard;
mod error;
mod insert;
mod system;

pub use clipboard::{ClipChangeObserver, Clipboard, ClipboardRef, ClipWrite, InMemoryClipboard};
pub use error::{ClipboardError, InsertError};
pub use insert::{InsertReport, InsertRequest, InsertionEngine};
pub use system::{SystemClipboard, DEFAULT_CLIPBOARD_POLL_INTERVAL};
