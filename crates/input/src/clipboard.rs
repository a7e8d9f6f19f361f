//! Clipboard abstraction with listener suppression.
//!
//! The insertion sequence writes to the clipboard twice per paste (payload
//! in, previous value back). Both writes pass `suppress_listener: true` so
//! the process's own change observer never sees them; without that, every
//! synthetic paste would re-enter the capture path as a fresh copy.

use std::sync::{Arc, Mutex};

use crate::error::ClipboardError;

/// Callback invoked with the new clipboard text on an external change.
pub type ClipChangeObserver = Arc<dyn Fn(&str) + Send + Sync + 'static>;

/// System clipboard primitive.
///
/// `suppress_listener` marks a write as the process's own: the registered
/// [`ClipChangeObserver`] must not fire for it. `clear` never notifies
/// observers; there is no text to deliver.
pub trait Clipboard: Send + Sync {
    /// Current clipboard text, if any non-empty text is present.
    fn current_text(&self) -> Option<String>;

    fn set_text(&self, text: &str, suppress_listener: bool) -> Result<(), ClipboardError>;

    fn clear(&self, suppress_listener: bool) -> Result<(), ClipboardError>;

    /// Register the change observer. At most one observer is active;
    /// registering replaces the previous one.
    fn observe_changes(&self, observer: ClipChangeObserver);

    fn remove_observer(&self);
}

pub type ClipboardRef = Arc<dyn Clipboard>;

/// A recorded write against [`InMemoryClipboard`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipWrite {
    /// `None` is a clear.
    pub value: Option<String>,
    pub suppressed: bool,
}

/// In-memory [`Clipboard`] for tests: records every write together with
/// its suppression flag and feeds unsuppressed writes to the observer.
#[derive(Default)]
pub struct InMemoryClipboard {
    value: Mutex<Option<String>>,
    observer: Mutex<Option<ClipChangeObserver>>,
    writes: Mutex<Vec<ClipWrite>>,
}

impl InMemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an initial value without recording a write.
    pub fn seed(&self, text: &str) {
        *self.value.lock().unwrap() = Some(text.to_string());
    }

    /// Every write so far, oldest first.
    pub fn writes(&self) -> Vec<ClipWrite> {
        self.writes.lock().unwrap().clone()
    }

    fn notify(&self, text: &str) {
        let observer = self.observer.lock().unwrap().clone();
        if let Some(observer) = observer {
            observer(text);
        }
    }
}

impl Clipboard for InMemoryClipboard {
    fn current_text(&self) -> Option<String> {
        self.value.lock().unwrap().clone()
    }

    fn set_text(&self, text: &str, suppress_listener: bool) -> Result<(), ClipboardError> {
        self.writes.lock().unwrap().push(ClipWrite {
            value: Some(text.to_string()),
            suppressed: suppress_listener,
        });
        *self.value.lock().unwrap() = Some(text.to_string());
        if !suppress_listener {
            self.notify(text);
        }
        Ok(())
    }

    fn clear(&self, suppress_listener: bool) -> Result<(), ClipboardError> {
        self.writes.lock().unwrap().push(ClipWrite {
            value: None,
            suppressed: suppress_listener,
        });
        *self.value.lock().unwrap() = None;
        Ok(())
    }

    fn observe_changes(&self, observer: ClipChangeObserver) {
        *self.observer.lock().unwrap() = Some(observer);
    }

    fn remove_observer(&self) {
        *self.observer.lock().unwrap() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_suppressed_write_skips_observer() {
        let clipboard = InMemoryClipboard::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);
        clipboard.observe_changes(Arc::new(move |_text| {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        }));

        clipboard.set_text("own write", true).unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        clipboard.set_text("external write", false).unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_writes_are_recorded_in_order() {
        let clipboard = InMemoryClipboard::new();
        clipboard.set_text("a", false).unwrap();
        clipboard.set_text("b", true).unwrap();
        clipboard.clear(true).unwrap();

        let writes = clipboard.writes();
        assert_eq!(writes.len(), 3);
        assert_eq!(writes[0].value.as_deref(), Some("a"));
        assert!(!writes[0].suppressed);
        assert_eq!(writes[2].value, None);
        assert!(writes[2].suppressed);
        assert_eq!(clipboard.current_text(), None);
    }

    #[test]
    fn test_removed_observer_stops_firing() {
        let clipboard = InMemoryClipboard::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);
        clipboard.observe_changes(Arc::new(move |_text| {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        }));

        clipboard.remove_observer();
        clipboard.set_text("after removal", false).unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
