//! Debounced tracking of assistive-keyboard visibility.
//!
//! Raw focus churn makes the keyboard flap several times a second, so in
//! deferred mode a request only schedules a confirmation: if the quiet
//! period elapses without a newer request, the worker inspects the actual
//! window composition and commits that. A request arriving mid-wait
//! supersedes the pending one, so at most one confirmation is ever
//! pending. Hosts without window inspection run in immediate mode, where
//! the raw value is committed synchronously.

use crate::provider::WindowStateRef;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Quiet period a visibility change must survive before it commits.
pub const DEFAULT_VISIBILITY_DEBOUNCE: Duration = Duration::from_millis(500);

/// Callback type for committed visibility transitions.
pub type VisibilityCallback = Arc<dyn Fn(bool) + Send + Sync + 'static>;

struct VisibilityShared {
    state: Mutex<Option<bool>>,
    listeners: Mutex<Vec<VisibilityCallback>>,
    overlay_expanded: AtomicBool,
}

impl VisibilityShared {
    fn new() -> Self {
        Self {
            state: Mutex::new(None),
            listeners: Mutex::new(Vec::new()),
            overlay_expanded: AtomicBool::new(false),
        }
    }

    /// Commit a confirmed value; listeners fire only on a transition.
    fn commit(&self, visible: bool) {
        {
            let Ok(mut state) = self.state.lock() else {
                return;
            };
            if *state == Some(visible) {
                return;
            }
            *state = Some(visible);
        }

        tracing::debug!(visible, "keyboard visibility changed");

        let Ok(listeners) = self.listeners.lock() else {
            return;
        };
        for listener in listeners.iter() {
            listener(visible);
        }
    }
}

/// Tracks whether the assistive keyboard is on screen.
pub struct VisibilityTracker {
    shared: Arc<VisibilityShared>,
    tx: Option<Sender<bool>>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl VisibilityTracker {
    /// Immediate mode: raw values commit synchronously, no worker.
    pub fn immediate() -> Self {
        Self {
            shared: Arc::new(VisibilityShared::new()),
            tx: None,
            handle: None,
        }
    }

    /// Deferred mode with the standard debounce.
    pub fn deferred(windows: WindowStateRef) -> Self {
        Self::deferred_with_debounce(windows, DEFAULT_VISIBILITY_DEBOUNCE)
    }

    /// Deferred mode with a custom debounce interval.
    pub fn deferred_with_debounce(windows: WindowStateRef, debounce: Duration) -> Self {
        let shared = Arc::new(VisibilityShared::new());
        let (tx, rx) = crossbeam_channel::unbounded();
        let worker_shared = Arc::clone(&shared);

        let handle = std::thread::spawn(move || {
            confirmation_loop(rx, worker_shared, windows, debounce);
        });

        Self {
            shared,
            tx: Some(tx),
            handle: Some(handle),
        }
    }

    /// Report a raw visibility observation.
    ///
    /// Deferred mode schedules a confirmation (superseding any pending
    /// one); immediate mode commits the value as-is.
    pub fn request_update(&self, raw_visible: bool) {
        match &self.tx {
            Some(tx) => {
                if tx.send(raw_visible).is_err() {
                    tracing::debug!("visibility worker stopped, update ignored");
                }
            }
            None => self.shared.commit(raw_visible),
        }
    }

    /// While the suggestion overlay is expanded, confirmations are
    /// suppressed entirely (the keyboard is obscured anyway).
    pub fn set_overlay_expanded(&self, expanded: bool) {
        self.shared
            .overlay_expanded
            .store(expanded, Ordering::SeqCst);
    }

    pub fn overlay_expanded(&self) -> bool {
        self.shared.overlay_expanded.load(Ordering::SeqCst)
    }

    /// Register a listener for committed transitions.
    pub fn subscribe(&self, callback: VisibilityCallback) {
        if let Ok(mut listeners) = self.shared.listeners.lock() {
            listeners.push(callback);
        }
    }

    /// Last committed state; `None` until the first commit.
    pub fn visible(&self) -> Option<bool> {
        self.shared.state.lock().ok().and_then(|state| *state)
    }

    /// Cancel any pending confirmation and join the worker.
    pub fn stop(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for VisibilityTracker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn confirmation_loop(
    rx: Receiver<bool>,
    shared: Arc<VisibilityShared>,
    windows: WindowStateRef,
    debounce: Duration,
) {
    tracing::debug!(?debounce, "visibility worker started");

    while let Ok(first) = rx.recv() {
        let mut raw = first;
        loop {
            match rx.recv_timeout(debounce) {
                // Newer request supersedes: restart the quiet period.
                Ok(newer) => raw = newer,
                Err(RecvTimeoutError::Timeout) => {
                    if shared.overlay_expanded.load(Ordering::SeqCst) {
                        tracing::trace!(raw, "overlay expanded, visibility update suppressed");
                    } else {
                        let confirmed = windows.input_method_visible();
                        tracing::trace!(raw, confirmed, "visibility confirmed");
                        shared.commit(confirmed);
                    }
                    break;
                }
                // Tracker stopped mid-wait: the pending request is
                // cancelled, not committed.
                Err(RecvTimeoutError::Disconnected) => return,
            }
        }
    }

    tracing::debug!("visibility worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::WindowStateProvider;
    use std::sync::atomic::AtomicUsize;

    struct FlagWindow(AtomicBool);

    impl FlagWindow {
        fn new(visible: bool) -> Arc<Self> {
            Arc::new(Self(AtomicBool::new(visible)))
        }

        fn set(&self, visible: bool) {
            self.0.store(visible, Ordering::SeqCst);
        }
    }

    impl WindowStateProvider for FlagWindow {
        fn input_method_visible(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    fn counting_callback() -> (VisibilityCallback, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);
        let callback: VisibilityCallback = Arc::new(move |_visible| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });
        (callback, count)
    }

    #[test]
    fn test_immediate_mode_commits_synchronously() {
        let tracker = VisibilityTracker::immediate();
        let (callback, count) = counting_callback();
        tracker.subscribe(callback);

        assert_eq!(tracker.visible(), None);

        tracker.request_update(true);
        assert_eq!(tracker.visible(), Some(true));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Same value again: no transition, no notification.
        tracker.request_update(true);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tracker.request_update(false);
        assert_eq!(tracker.visible(), Some(false));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_deferred_commits_window_state_after_debounce() {
        let windows = FlagWindow::new(true);
        let tracker =
            VisibilityTracker::deferred_with_debounce(windows.clone(), Duration::from_millis(40));

        // Raw value is a hint only; the confirmed value comes from the
        // window composition.
        tracker.request_update(false);
        std::thread::sleep(Duration::from_millis(150));

        assert_eq!(tracker.visible(), Some(true));
    }

    #[test]
    fn test_deferred_supersede_restarts_quiet_period() {
        let windows = FlagWindow::new(true);
        let tracker =
            VisibilityTracker::deferred_with_debounce(windows.clone(), Duration::from_millis(200));
        let (callback, count) = counting_callback();
        tracker.subscribe(callback);

        tracker.request_update(true);
        std::thread::sleep(Duration::from_millis(80));
        tracker.request_update(true);

        // 230ms after the first request: it would have fired at 200ms,
        // but the second request restarted the window (fires at 280ms).
        std::thread::sleep(Duration::from_millis(150));
        assert_eq!(tracker.visible(), None);

        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(tracker.visible(), Some(true));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_overlay_expanded_suppresses_commit() {
        let windows = FlagWindow::new(true);
        let tracker =
            VisibilityTracker::deferred_with_debounce(windows.clone(), Duration::from_millis(30));

        tracker.set_overlay_expanded(true);
        tracker.request_update(true);
        std::thread::sleep(Duration::from_millis(120));

        assert_eq!(tracker.visible(), None);

        // Collapsing the overlay lets the next request through.
        tracker.set_overlay_expanded(false);
        tracker.request_update(true);
        std::thread::sleep(Duration::from_millis(120));
        assert_eq!(tracker.visible(), Some(true));
    }

    #[test]
    fn test_stop_cancels_pending_confirmation() {
        let windows = FlagWindow::new(true);
        let mut tracker =
            VisibilityTracker::deferred_with_debounce(windows.clone(), Duration::from_millis(100));

        tracker.request_update(true);
        tracker.stop();

        std::thread::sleep(Duration::from_millis(200));
        assert_eq!(tracker.visible(), None);

        // Requests after stop are ignored, not a panic.
        tracker.request_update(true);
        assert_eq!(tracker.visible(), None);
    }

    #[test]
    fn test_deferred_notifies_once_per_transition() {
        let windows = FlagWindow::new(true);
        let tracker =
            VisibilityTracker::deferred_with_debounce(windows.clone(), Duration::from_millis(30));
        let (callback, count) = counting_callback();
        tracker.subscribe(callback);

        tracker.request_update(true);
        std::thread::sleep(Duration::from_millis(120));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // Confirmed value unchanged: commit is a no-op.
        tracker.request_update(true);
        std::thread::sleep(Duration::from_millis(120));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        windows.set(false);
        tracker.request_update(false);
        std::thread::sleep(Duration::from_millis(120));
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.visible(), Some(false));
    }
}
