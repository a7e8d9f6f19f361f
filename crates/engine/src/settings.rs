//! Collaborator interfaces the engine consumes but does not implement.
//!
//! Settings persistence, clip storage, and the suggestion overlay are all
//! host concerns; the engine sees them only through these traits. The
//! `Static*`/`Recording*`/`Null*` implementations back the test suites
//! and headless hosts.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::coordinator::LaunchError;

/// A settings value change pushed by the host's settings store.
#[derive(Debug, Clone)]
pub enum SettingsChange {
    /// The package blacklist was replaced wholesale.
    Blacklist(HashSet<String>),
    /// The "improve detection" (log channel) preference was toggled.
    ImproveDetection(bool),
}

pub type SettingsCallback = Arc<dyn Fn(SettingsChange) + Send + Sync + 'static>;

/// Read side of the host settings store, plus change notification.
///
/// One subscriber at a time; registering replaces the previous one.
pub trait SettingsSource: Send + Sync {
    fn blacklist(&self) -> HashSet<String>;
    fn improve_detection_enabled(&self) -> bool;
    /// Read live at every visibility transition, so a toggle takes effect
    /// without a change event.
    fn suggestions_enabled(&self) -> bool;
    fn subscribe(&self, callback: SettingsCallback);
    fn unsubscribe(&self);
}

/// Destination for captured clipboard text (the host's clip store).
pub trait ClipSink: Send + Sync {
    /// Hand over a captured clip. `false` means the sink rejected it
    /// (duplicate, filtered) and nothing was stored.
    fn store_clip(&self, text: &str) -> bool;
}

/// [`ClipSink`] that rejects everything.
pub struct NullClipSink;

impl ClipSink for NullClipSink {
    fn store_clip(&self, _text: &str) -> bool {
        false
    }
}

/// The suggestion overlay surface whose lifecycle follows keyboard
/// visibility.
pub trait SuggestionSink: Send + Sync {
    /// Whether the host grants the overlay permission at all.
    fn overlay_permitted(&self) -> bool;

    fn start(&self) -> Result<(), LaunchError>;

    fn stop(&self) -> Result<(), LaunchError>;

    /// Push the text and caret of the control the user is editing.
    fn publish_context(&self, text: &str, caret: Option<usize>);

    /// The user interacted outside the overlay; collapse it.
    fn publish_close(&self);
}

/// [`SuggestionSink`] for hosts without an overlay: permission denied,
/// everything else inert.
pub struct NullSuggestionSink;

impl SuggestionSink for NullSuggestionSink {
    fn overlay_permitted(&self) -> bool {
        false
    }

    fn start(&self) -> Result<(), LaunchError> {
        Ok(())
    }

    fn stop(&self) -> Result<(), LaunchError> {
        Ok(())
    }

    fn publish_context(&self, _text: &str, _caret: Option<usize>) {}

    fn publish_close(&self) {}
}

/// In-memory [`SettingsSource`] with settable values; setters notify the
/// subscriber the way a real settings store would.
#[derive(Default)]
pub struct StaticSettings {
    blacklist: Mutex<HashSet<String>>,
    improve_detection: AtomicBool,
    suggestions: AtomicBool,
    callback: Mutex<Option<SettingsCallback>>,
}

impl StaticSettings {
    pub fn new() -> Self {
        let settings = Self::default();
        settings.suggestions.store(true, Ordering::SeqCst);
        settings
    }

    pub fn set_blacklist(&self, packages: &[&str]) {
        let set: HashSet<String> = packages.iter().map(|p| p.to_string()).collect();
        if let Ok(mut blacklist) = self.blacklist.lock() {
            *blacklist = set.clone();
        }
        self.notify(SettingsChange::Blacklist(set));
    }

    pub fn set_improve_detection(&self, enabled: bool) {
        self.improve_detection.store(enabled, Ordering::SeqCst);
        self.notify(SettingsChange::ImproveDetection(enabled));
    }

    pub fn set_suggestions_enabled(&self, enabled: bool) {
        self.suggestions.store(enabled, Ordering::SeqCst);
    }

    fn notify(&self, change: SettingsChange) {
        let callback = self.callback.lock().ok().and_then(|guard| guard.clone());
        if let Some(callback) = callback {
            callback(change);
        }
    }
}

impl SettingsSource for StaticSettings {
    fn blacklist(&self) -> HashSet<String> {
        self.blacklist
            .lock()
            .map(|blacklist| blacklist.clone())
            .unwrap_or_default()
    }

    fn improve_detection_enabled(&self) -> bool {
        self.improve_detection.load(Ordering::SeqCst)
    }

    fn suggestions_enabled(&self) -> bool {
        self.suggestions.load(Ordering::SeqCst)
    }

    fn subscribe(&self, callback: SettingsCallback) {
        if let Ok(mut slot) = self.callback.lock() {
            *slot = Some(callback);
        }
    }

    fn unsubscribe(&self) {
        if let Ok(mut slot) = self.callback.lock() {
            *slot = None;
        }
    }
}

/// [`ClipSink`] that records accepted clips.
#[derive(Default)]
pub struct RecordingClipSink {
    clips: Mutex<Vec<String>>,
}

impl RecordingClipSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clips(&self) -> Vec<String> {
        self.clips.lock().map(|clips| clips.clone()).unwrap_or_default()
    }
}

impl ClipSink for RecordingClipSink {
    fn store_clip(&self, text: &str) -> bool {
        if let Ok(mut clips) = self.clips.lock() {
            clips.push(text.to_string());
        }
        true
    }
}

/// [`SuggestionSink`] that records every call for inspection.
#[derive(Default)]
pub struct RecordingSuggestionSink {
    permitted: AtomicBool,
    running: AtomicBool,
    starts: AtomicUsize,
    stops: AtomicUsize,
    closes: AtomicUsize,
    contexts: Mutex<Vec<(String, Option<usize>)>>,
}

impl RecordingSuggestionSink {
    pub fn new() -> Self {
        let sink = Self::default();
        sink.permitted.store(true, Ordering::SeqCst);
        sink
    }

    pub fn set_permitted(&self, permitted: bool) {
        self.permitted.store(permitted, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn contexts(&self) -> Vec<(String, Option<usize>)> {
        self.contexts
            .lock()
            .map(|contexts| contexts.clone())
            .unwrap_or_default()
    }
}

impl SuggestionSink for RecordingSuggestionSink {
    fn overlay_permitted(&self) -> bool {
        self.permitted.load(Ordering::SeqCst)
    }

    fn start(&self) -> Result<(), LaunchError> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) -> Result<(), LaunchError> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn publish_context(&self, text: &str, caret: Option<usize>) {
        if let Ok(mut contexts) = self.contexts.lock() {
            contexts.push((text.to_string(), caret));
        }
    }

    fn publish_close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_settings_notifies_subscriber() {
        let settings = StaticSettings::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        settings.subscribe(Arc::new(move |change| {
            seen_clone.lock().unwrap().push(change);
        }));

        settings.set_improve_detection(true);
        settings.set_blacklist(&["com.blocked.app"]);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(matches!(seen[0], SettingsChange::ImproveDetection(true)));
        assert!(matches!(&seen[1], SettingsChange::Blacklist(set) if set.len() == 1));
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let settings = StaticSettings::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = Arc::clone(&seen);
        settings.subscribe(Arc::new(move |_| {
            seen_clone.fetch_add(1, Ordering::SeqCst);
        }));

        settings.unsubscribe();
        settings.set_improve_detection(true);
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_recording_suggestion_sink_tracks_lifecycle() {
        let sink = RecordingSuggestionSink::new();
        assert!(!sink.is_running());

        sink.start().unwrap();
        sink.publish_context("hel", Some(3));
        sink.publish_close();
        sink.stop().unwrap();

        assert_eq!(sink.starts(), 1);
        assert_eq!(sink.stops(), 1);
        assert_eq!(sink.closes(), 1);
        assert_eq!(sink.contexts(), vec![("hel".to_string(), Some(3))]);
        assert!(!sink.is_running());
    }
}
