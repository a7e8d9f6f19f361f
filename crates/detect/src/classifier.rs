use std::collections::VecDeque;

use clipcue_events::{EventKind, RawEvent};

/// Number of recent event kinds retained for pattern matching.
pub const HISTORY_WINDOW: usize = 4;

/// Default label matched by the context-menu heuristic. Hosts running a
/// localized UI substitute the translated word via
/// [`CopyClassifier::with_copy_label`].
pub const DEFAULT_COPY_LABEL: &str = "copy";

/// Which event-pattern family the running OS emits around a copy action.
///
/// Newer OS versions announce the copy with a system toast, which arrives
/// as a notification-state change. Older versions emit nothing direct, so
/// we fall back to the long-press-then-select sequence users perform to
/// reach the copy menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionProfile {
    /// Copy announced by the OS itself (notification-state change).
    Modern,
    /// Copy inferred from the long-click / selection-change sequence.
    Legacy,
}

/// Pure classifier over a short, bounded history of raw event kinds.
///
/// Callers append every incoming event with [`add_event`] and then ask
/// [`is_copy_likely`] whether that event, together with the history tail,
/// plausibly represents a clipboard copy. The classifier never performs
/// IO and never mutates state outside its own history.
///
/// [`add_event`]: CopyClassifier::add_event
/// [`is_copy_likely`]: CopyClassifier::is_copy_likely
pub struct CopyClassifier {
    profile: DetectionProfile,
    copy_label: String,
    history: VecDeque<EventKind>,
}

impl CopyClassifier {
    pub fn new(profile: DetectionProfile) -> Self {
        Self::with_copy_label(profile, DEFAULT_COPY_LABEL)
    }

    /// Build a classifier matching a localized "copy" menu label.
    pub fn with_copy_label(profile: DetectionProfile, copy_label: &str) -> Self {
        Self {
            profile,
            copy_label: copy_label.to_lowercase(),
            history: VecDeque::with_capacity(HISTORY_WINDOW),
        }
    }

    pub fn profile(&self) -> DetectionProfile {
        self.profile
    }

    /// Record an event kind, evicting the oldest entry once the window
    /// is full. Insertion order is arrival order.
    pub fn add_event(&mut self, kind: EventKind) {
        self.history.push_back(kind);
        while self.history.len() > HISTORY_WINDOW {
            self.history.pop_front();
        }
    }

    /// Whether `event`, combined with the recorded history, plausibly
    /// represents a copy action. Expects the event to have been recorded
    /// via [`add_event`](Self::add_event) already; evaluation itself
    /// never mutates the history.
    pub fn is_copy_likely(&self, event: &RawEvent) -> bool {
        if self.is_copy_menu_click(event) {
            return true;
        }
        match self.profile {
            DetectionProfile::Modern => event.kind == EventKind::NotificationStateChanged,
            DetectionProfile::Legacy => self.matches_legacy_tail(event),
        }
    }

    /// Context-menu heuristic shared by both profiles: a click on a
    /// control whose label is the (localized) copy word.
    fn is_copy_menu_click(&self, event: &RawEvent) -> bool {
        if event.kind != EventKind::ViewClicked {
            return false;
        }
        match &event.label {
            Some(label) => label.trim().to_lowercase() == self.copy_label,
            None => false,
        }
    }

    /// Legacy pattern: the current event is a text-selection change and a
    /// long-click is still inside the lookback window. Anchoring at the
    /// current event keeps an unrelated later event from re-matching the
    /// same long-click.
    fn matches_legacy_tail(&self, event: &RawEvent) -> bool {
        if event.kind != EventKind::ViewTextSelectionChanged {
            return false;
        }
        let preceding = self.history.len().saturating_sub(1);
        self.history
            .iter()
            .take(preceding)
            .any(|kind| *kind == EventKind::ViewLongClicked)
    }
}
