//! Single-flight trigger dispatch.
//!
//! Both detection channels funnel their "candidate copy" signals through
//! [`TriggerCoordinator::on_candidate_detected`]. The coordinator applies
//! the blacklist and screen gates, deduplicates against an already-showing
//! downstream surface, and guarantees at most one concurrent launch via a
//! compare-and-swap flag. A candidate that loses a gate is dropped, never
//! queued.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use clipcue_events::TriggerOrigin;

#[derive(Debug, thiserror::Error)]
#[error("launch failed: {0}")]
pub struct LaunchError(pub String);

/// Downstream action fired on a confirmed copy: opening the capture UI,
/// posting a notification, whatever the host wires up.
pub trait ActionLauncher: Send + Sync {
    /// Fire the action. Expected to return promptly; the single-flight
    /// lock only covers the call itself, not the surface's lifetime.
    fn launch(&self) -> Result<(), LaunchError>;

    /// Whether the downstream surface is already showing. This is the
    /// dedup predicate for the second channel firing on the same copy.
    fn is_active(&self) -> bool;
}

/// [`ActionLauncher`] that never launches anything.
pub struct NullLauncher;

impl ActionLauncher for NullLauncher {
    fn launch(&self) -> Result<(), LaunchError> {
        Ok(())
    }

    fn is_active(&self) -> bool {
        false
    }
}

/// [`ActionLauncher`] for tests: counts launches, active state and the
/// next call's failure are scripted.
#[derive(Default)]
pub struct RecordingLauncher {
    launches: std::sync::atomic::AtomicUsize,
    active: AtomicBool,
    fail_next: AtomicBool,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::SeqCst);
    }

    /// Make the next launch return an error.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl ActionLauncher for RecordingLauncher {
    fn launch(&self) -> Result<(), LaunchError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(LaunchError("scripted failure".to_string()));
        }
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

/// Why a candidate did or did not dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    Dispatched,
    /// Source package is blacklisted.
    Blacklisted,
    /// Screen is not interactive.
    ScreenOff,
    /// The downstream surface is already showing and no follow-up was
    /// armed.
    AlreadyActive,
    /// Another dispatch was mid-launch; this one was dropped.
    InFlight,
}

/// Gatekeeper between the detection channels and the downstream action.
///
/// Shared state is limited to atomics plus two small mutexes, so the
/// coordinator can be called from the event path, the log-channel worker,
/// and the clipboard watcher at once.
pub struct TriggerCoordinator {
    launcher: Arc<dyn ActionLauncher>,
    blacklist: Mutex<HashSet<String>>,
    current_package: Mutex<Option<String>>,
    screen_interactive: AtomicBool,
    run_next: AtomicBool,
    in_flight: AtomicBool,
}

impl TriggerCoordinator {
    pub fn new(launcher: Arc<dyn ActionLauncher>) -> Self {
        Self {
            launcher,
            blacklist: Mutex::new(HashSet::new()),
            current_package: Mutex::new(None),
            screen_interactive: AtomicBool::new(true),
            run_next: AtomicBool::new(false),
            in_flight: AtomicBool::new(false),
        }
    }

    /// A detection channel saw a plausible copy. Runs the gates in order
    /// and launches when every one passes; a failed gate drops the
    /// candidate silently.
    pub fn on_candidate_detected(
        &self,
        package: Option<&str>,
        origin: TriggerOrigin,
    ) -> DispatchOutcome {
        // A follow-up consumes the arm on entry; the pre-consumption value
        // still decides the already-active gate below.
        let armed = match origin {
            TriggerOrigin::FollowUp => self.run_next.swap(false, Ordering::SeqCst),
            _ => self.run_next.load(Ordering::SeqCst),
        };

        if let Some(package) = package {
            if self.is_blacklisted(package) {
                tracing::debug!(package, "candidate from blacklisted package dropped");
                return DispatchOutcome::Blacklisted;
            }
        }

        if !self.screen_interactive.load(Ordering::SeqCst) {
            tracing::debug!(?origin, "candidate dropped, screen not interactive");
            return DispatchOutcome::ScreenOff;
        }

        if !armed && self.launcher.is_active() {
            tracing::debug!(?origin, "downstream surface already active, dropping");
            return DispatchOutcome::AlreadyActive;
        }

        if matches!(origin, TriggerOrigin::Classifier) {
            // The event after a classifier match often carries the settled
            // clipboard text, so arm one extra dispatch for it.
            self.run_next.store(true, Ordering::SeqCst);
        }

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!(?origin, "dispatch already in flight, dropping");
            return DispatchOutcome::InFlight;
        }
        if let Err(err) = self.launcher.launch() {
            tracing::warn!(error = %err, ?origin, "downstream launch failed");
        }
        self.in_flight.store(false, Ordering::SeqCst);

        tracing::debug!(?origin, package = ?package, "trigger dispatched");
        DispatchOutcome::Dispatched
    }

    /// Whether the one-shot follow-up arm is currently set.
    pub fn follow_up_armed(&self) -> bool {
        self.run_next.load(Ordering::SeqCst)
    }

    pub fn set_screen_interactive(&self, interactive: bool) {
        if self.screen_interactive.swap(interactive, Ordering::SeqCst) != interactive {
            tracing::trace!(interactive, "screen interactivity changed");
        }
    }

    /// Swap in a new blacklist wholesale, on a settings change.
    pub fn replace_blacklist(&self, packages: HashSet<String>) {
        if let Ok(mut blacklist) = self.blacklist.lock() {
            *blacklist = packages;
        }
    }

    pub fn is_blacklisted(&self, package: &str) -> bool {
        self.blacklist
            .lock()
            .map(|blacklist| blacklist.contains(package))
            .unwrap_or(false)
    }

    /// Remember the package of the app in the foreground; the log channel
    /// has no event to read it from.
    pub fn set_current_package(&self, package: Option<String>) {
        if let Ok(mut current) = self.current_package.lock() {
            *current = package;
        }
    }

    pub fn current_package(&self) -> Option<String> {
        self.current_package
            .lock()
            .ok()
            .and_then(|current| current.clone())
    }
}
