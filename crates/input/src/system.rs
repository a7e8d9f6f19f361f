//! System clipboard backed by arboard, with a polling change watcher.
//!
//! arboard exposes no change notification, so external changes are picked
//! up by a background poll. A suppressed write is remembered until the
//! watcher's next observed change; the change is swallowed when it
//! matches the remembered value and reported otherwise, clearing the
//! note either way.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::clipboard::{ClipChangeObserver, Clipboard};
use crate::error::ClipboardError;

/// Default interval between clipboard polls.
pub const DEFAULT_CLIPBOARD_POLL_INTERVAL: Duration = Duration::from_millis(500);

struct WatcherShared {
    observer: Mutex<Option<ClipChangeObserver>>,
    /// Value of the most recent suppressed write. Taken by the watcher at
    /// its next observed change, whether or not that change matches.
    skip_value: Mutex<Option<String>>,
}

/// [`Clipboard`] implementation over the platform clipboard.
///
/// Handles are opened per call rather than held; some platforms
/// invalidate a long-lived clipboard handle when another process takes
/// ownership.
pub struct SystemClipboard {
    shared: Arc<WatcherShared>,
    running: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
    interval: Duration,
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::with_poll_interval(DEFAULT_CLIPBOARD_POLL_INTERVAL)
    }
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_interval(interval: Duration) -> Self {
        Self {
            shared: Arc::new(WatcherShared {
                observer: Mutex::new(None),
                skip_value: Mutex::new(None),
            }),
            running: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(None),
            interval,
        }
    }

    fn stop_watcher(&self) {
        self.running.store(false, Ordering::SeqCst);
        let handle = self.handle.lock().ok().and_then(|mut guard| guard.take());
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }
}

impl Clipboard for SystemClipboard {
    fn current_text(&self) -> Option<String> {
        read_clipboard()
    }

    fn set_text(&self, text: &str, suppress_listener: bool) -> Result<(), ClipboardError> {
        // Register the skip before writing; the watcher may poll between
        // the write landing and this call returning.
        if suppress_listener {
            if let Ok(mut skip) = self.shared.skip_value.lock() {
                *skip = Some(text.to_string());
            }
        }
        let result = arboard::Clipboard::new()
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))
            .and_then(|mut cb| {
                cb.set_text(text)
                    .map_err(|e| ClipboardError::WriteFailed(e.to_string()))
            });
        if result.is_err() && suppress_listener {
            if let Ok(mut skip) = self.shared.skip_value.lock() {
                *skip = None;
            }
        }
        result
    }

    fn clear(&self, _suppress_listener: bool) -> Result<(), ClipboardError> {
        arboard::Clipboard::new()
            .map_err(|e| ClipboardError::Unavailable(e.to_string()))
            .and_then(|mut cb| {
                cb.clear()
                    .map_err(|e| ClipboardError::WriteFailed(e.to_string()))
            })
    }

    fn observe_changes(&self, observer: ClipChangeObserver) {
        if let Ok(mut slot) = self.shared.observer.lock() {
            *slot = Some(observer);
        }
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let shared = Arc::clone(&self.shared);
        let running = Arc::clone(&self.running);
        let interval = self.interval;
        let worker = std::thread::spawn(move || watch_loop(shared, running, interval));
        if let Ok(mut handle) = self.handle.lock() {
            *handle = Some(worker);
        }
    }

    fn remove_observer(&self) {
        if let Ok(mut slot) = self.shared.observer.lock() {
            *slot = None;
        }
        self.stop_watcher();
    }
}

impl Drop for SystemClipboard {
    fn drop(&mut self) {
        self.stop_watcher();
    }
}

fn read_clipboard() -> Option<String> {
    arboard::Clipboard::new()
        .ok()
        .and_then(|mut cb| cb.get_text().ok())
        .filter(|s| !s.is_empty())
}

fn watch_loop(shared: Arc<WatcherShared>, running: Arc<AtomicBool>, interval: Duration) {
    tracing::debug!(interval_ms = interval.as_millis() as u64, "clipboard watcher started");
    // Prime with whatever is already on the clipboard so pre-existing
    // content is not reported as a change.
    let mut last = read_clipboard();

    while running.load(Ordering::SeqCst) {
        std::thread::sleep(interval);
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let current = read_clipboard();
        if current == last {
            continue;
        }
        if let Some(text) = &current {
            if consume_skip(&shared, text) {
                tracing::trace!("skipping own clipboard write");
            } else {
                let observer = shared.observer.lock().ok().and_then(|guard| guard.clone());
                if let Some(observer) = observer {
                    observer(text);
                }
            }
        }
        last = current;
    }
    tracing::debug!("clipboard watcher stopped");
}

/// Whether `text` matches the pending suppressed write. The pending
/// value is taken either way; an observed change that does not match it
/// has superseded it.
fn consume_skip(shared: &WatcherShared, text: &str) -> bool {
    let Ok(mut skip) = shared.skip_value.lock() else {
        return false;
    };
    skip.take().as_deref() == Some(text)
}
