//! The capture service: one object wiring every component to the host.
//!
//! The host adapter translates platform callbacks into plain method
//! calls: `start`/`stop` around the platform service lifecycle,
//! `on_event` for each accessibility event, `on_memory_pressure` for trim
//! signals, and the `insert_text` / log-detection / overlay-state
//! commands. Everything else (classification, gating, visibility
//! debounce, clip handoff) happens behind those entry points.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clipcue_context::{
    FocusTracker, NodeId, ScreenStateRef, UiTreeProvider, VisibilityCallback, VisibilityTracker,
    WindowStateRef, DEFAULT_VISIBILITY_DEBOUNCE,
};
use clipcue_detect::{
    CopyClassifier, DetectionProfile, LogDetector, LogDetectorConfig, LogDetectorListener,
    LogPermissionProbe, LogSource, DEFAULT_COPY_LABEL, DEFAULT_COPY_MARKERS,
    DEFAULT_LOG_POLL_INTERVAL,
};
use clipcue_events::{
    event_names, ClipCapturedEvent, DetectorStatusEvent, EventBusRef, EventKind, MemoryPressure,
    RawEvent, SubscriptionSpec, TriggerDispatchedEvent, TriggerOrigin, VisibilityChangedEvent,
};
use clipcue_input::{Clipboard, InsertRequest, InsertionEngine};

use crate::coordinator::{ActionLauncher, DispatchOutcome, TriggerCoordinator};
use crate::settings::{ClipSink, SettingsChange, SettingsSource, SuggestionSink};

/// Everything the host must supply for the engine to run.
pub struct HostBindings {
    pub tree: Arc<dyn UiTreeProvider>,
    pub clipboard: Arc<dyn Clipboard>,
    pub screen: ScreenStateRef,
    pub windows: WindowStateRef,
    pub launcher: Arc<dyn ActionLauncher>,
    pub settings: Arc<dyn SettingsSource>,
    pub clips: Arc<dyn ClipSink>,
    pub suggestions: Arc<dyn SuggestionSink>,
    pub log_source: Box<dyn LogSource>,
    pub log_probe: Arc<dyn LogPermissionProbe>,
    pub bus: EventBusRef,
}

/// Tunables fixed at construction.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Our own package; events from it never clobber the remembered
    /// foreground package or close the overlay.
    pub own_package: String,
    pub profile: DetectionProfile,
    /// Localized "copy" word for the context-menu heuristic.
    pub copy_label: String,
    /// Debounce visibility updates through the deferred confirmation
    /// worker; `false` commits them synchronously (older OS versions).
    pub deferred_visibility: bool,
    pub visibility_debounce: Duration,
    pub log_poll_interval: Duration,
    pub log_markers: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            own_package: "dev.clipcue".to_string(),
            profile: DetectionProfile::Modern,
            copy_label: DEFAULT_COPY_LABEL.to_string(),
            deferred_visibility: true,
            visibility_debounce: DEFAULT_VISIBILITY_DEBOUNCE,
            log_poll_interval: DEFAULT_LOG_POLL_INTERVAL,
            log_markers: DEFAULT_COPY_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// The assembled engine.
///
/// Hosts typically include their own package in the settings blacklist so
/// interactions with the capture UI never re-trigger capture.
pub struct CaptureService {
    own_package: String,
    classifier: CopyClassifier,
    focus: FocusTracker,
    visibility: VisibilityTracker,
    coordinator: Arc<TriggerCoordinator>,
    detector: Arc<LogDetector>,
    inserter: InsertionEngine,
    tree: Arc<dyn UiTreeProvider>,
    clipboard: Arc<dyn Clipboard>,
    screen: ScreenStateRef,
    windows: WindowStateRef,
    settings: Arc<dyn SettingsSource>,
    clips: Arc<dyn ClipSink>,
    suggestions: Arc<dyn SuggestionSink>,
    bus: EventBusRef,
    low_memory: Arc<AtomicBool>,
    started: bool,
    stopped: bool,
}

impl CaptureService {
    pub fn new(bindings: HostBindings, config: ServiceConfig) -> Self {
        let visibility = if config.deferred_visibility {
            VisibilityTracker::deferred_with_debounce(
                Arc::clone(&bindings.windows),
                config.visibility_debounce,
            )
        } else {
            VisibilityTracker::immediate()
        };

        let detector = Arc::new(LogDetector::with_config(
            bindings.log_source,
            Arc::clone(&bindings.log_probe),
            LogDetectorConfig {
                interval: config.log_poll_interval,
                markers: config.log_markers.clone(),
            },
        ));

        let inserter = InsertionEngine::new(
            Arc::clone(&bindings.tree),
            Arc::clone(&bindings.clipboard),
        );

        Self {
            own_package: config.own_package,
            classifier: CopyClassifier::with_copy_label(config.profile, &config.copy_label),
            focus: FocusTracker::new(),
            visibility,
            coordinator: Arc::new(TriggerCoordinator::new(Arc::clone(&bindings.launcher))),
            detector,
            inserter,
            tree: bindings.tree,
            clipboard: bindings.clipboard,
            screen: bindings.screen,
            windows: bindings.windows,
            settings: bindings.settings,
            clips: bindings.clips,
            suggestions: bindings.suggestions,
            bus: bindings.bus,
            low_memory: Arc::new(AtomicBool::new(false)),
            started: false,
            stopped: false,
        }
    }

    /// Event kinds and notification timeout to request from the OS event
    /// source at registration time.
    pub fn subscription_spec(&self) -> SubscriptionSpec {
        SubscriptionSpec::standard()
    }

    /// Wire up collaborators and begin observing.
    ///
    /// Starting twice is harmless. Once [`stop`](Self::stop) has run, the
    /// instance stays stopped; a host that rebinds builds a fresh service
    /// over the same collaborators.
    pub fn start(&mut self) {
        if self.started || self.stopped {
            tracing::warn!(stopped = self.stopped, "capture service start ignored");
            return;
        }
        self.started = true;

        // Settings: initial snapshot, then live updates.
        self.coordinator.replace_blacklist(self.settings.blacklist());
        let coordinator = Arc::clone(&self.coordinator);
        let detector = Arc::clone(&self.detector);
        self.settings.subscribe(Arc::new(move |change| match change {
            SettingsChange::Blacklist(packages) => coordinator.replace_blacklist(packages),
            SettingsChange::ImproveDetection(enabled) => {
                if enabled {
                    detector.start_detecting();
                } else {
                    detector.stop_detecting();
                }
            }
        }));

        // Clipboard changes from the user land in the clip sink, gated on
        // the foreground package's blacklist status. Our own suppressed
        // writes never reach this observer.
        let coordinator = Arc::clone(&self.coordinator);
        let clips = Arc::clone(&self.clips);
        let bus = Arc::clone(&self.bus);
        self.clipboard.observe_changes(Arc::new(move |text| {
            let package = coordinator.current_package();
            if let Some(pkg) = package.as_deref() {
                if coordinator.is_blacklisted(pkg) {
                    tracing::debug!(package = pkg, "clipboard change in blacklisted app ignored");
                    return;
                }
            }
            if clips.store_clip(text) {
                emit_event(
                    &bus,
                    event_names::CLIP_CAPTURED,
                    &ClipCapturedEvent::new(text, package),
                );
            }
        }));

        // Committed visibility transitions drive the overlay lifecycle.
        let suggestions = Arc::clone(&self.suggestions);
        let settings = Arc::clone(&self.settings);
        let low_memory = Arc::clone(&self.low_memory);
        let bus = Arc::clone(&self.bus);
        self.visibility.subscribe(Arc::new(move |visible| {
            emit_event(
                &bus,
                event_names::VISIBILITY_CHANGED,
                &VisibilityChangedEvent::new(visible),
            );
            if !settings.suggestions_enabled() || !suggestions.overlay_permitted() {
                return;
            }
            if low_memory.load(Ordering::SeqCst) {
                tracing::debug!("suggestion overlay suppressed under memory pressure");
                return;
            }
            let result = if visible {
                suggestions.start()
            } else {
                suggestions.stop()
            };
            if let Err(err) = result {
                tracing::warn!(error = %err, visible, "suggestion overlay transition failed");
            }
        }));

        // Log channel bridge.
        self.detector.register_listener(Arc::new(DetectorBridge {
            coordinator: Arc::clone(&self.coordinator),
            bus: Arc::clone(&self.bus),
        }));
        if self.settings.improve_detection_enabled() {
            self.detector.start_detecting();
        }
        emit_event(
            &self.bus,
            event_names::DETECTOR_STATUS,
            &DetectorStatusEvent::running(self.detector.is_started()),
        );

        tracing::info!(own_package = %self.own_package, "capture service started");
    }

    /// Tear down workers and collaborator registrations. No callback of
    /// ours fires after this returns.
    pub fn stop(&mut self) {
        if !self.started {
            return;
        }
        self.started = false;
        self.stopped = true;

        // Settings first: a change arriving mid-teardown must not restart
        // the detector we are about to dispose.
        self.settings.unsubscribe();
        self.detector.dispose();
        self.visibility.stop();
        self.clipboard.remove_observer();
        self.focus.clear();

        tracing::info!("capture service stopped");
    }

    /// One raw accessibility event from the OS.
    pub fn on_event(&mut self, event: &RawEvent) {
        if !self.started {
            return;
        }
        let own = event.source_package.as_deref() == Some(self.own_package.as_str());

        if !own {
            if let Some(package) = &event.source_package {
                self.coordinator.set_current_package(Some(package.clone()));
            }
        }
        self.focus
            .note_package(&self.own_package, event.source_package.as_deref());

        self.classifier.add_event(event.kind);

        // Content churn happens constantly while typing; only the other
        // kinds are worth a visibility re-check.
        if event.kind != EventKind::WindowContentChanged {
            self.visibility
                .request_update(self.windows.input_method_visible());
        }

        if let Some(source) = event.source {
            let observation = self.focus.observe(self.tree.as_ref(), source);
            if let Some(ctx) = &observation.caret_context {
                self.suggestions.publish_context(&ctx.text, ctx.caret);
            }
        }

        self.coordinator
            .set_screen_interactive(self.screen.is_interactive());

        if event.kind == EventKind::ViewClicked && !own {
            self.suggestions.publish_close();
        }

        if self.classifier.is_copy_likely(event) {
            let outcome = self.coordinator.on_candidate_detected(
                event.source_package.as_deref(),
                TriggerOrigin::Classifier,
            );
            self.emit_dispatch(outcome, TriggerOrigin::Classifier, &event.source_package);
            return;
        }

        if self.coordinator.follow_up_armed() {
            let outcome = self.coordinator.on_candidate_detected(
                event.source_package.as_deref(),
                TriggerOrigin::FollowUp,
            );
            self.emit_dispatch(outcome, TriggerOrigin::FollowUp, &event.source_package);
        }
    }

    /// Insert `text` into the best known editable target. `replace_len`
    /// characters before the caret are replaced (autocomplete-style);
    /// zero appends at the caret. Failures are logged, never raised.
    pub fn insert_text(&self, target_hint: Option<NodeId>, text: &str, replace_len: usize) {
        if self.low_memory.load(Ordering::SeqCst) {
            tracing::warn!("insertion skipped under memory pressure");
            return;
        }
        let Some(target) = self.focus.insertion_target().or(target_hint) else {
            tracing::debug!("no insertion target known, dropping insert");
            return;
        };

        let request = InsertRequest::new(text, target).replacing(replace_len);
        match self.inserter.insert(&request) {
            Ok(report) => {
                tracing::debug!(
                    used_paste = report.used_paste,
                    replaced = report.replaced,
                    "insertion completed"
                );
            }
            Err(err) => {
                tracing::warn!(error = %err, "insertion failed");
            }
        }
    }

    /// Host memory trim signal. Anything above [`MemoryPressure::Normal`]
    /// suspends the insertion and suggestion paths and collapses the
    /// overlay; `Normal` lifts the suspension.
    pub fn on_memory_pressure(&self, level: MemoryPressure) {
        let low = level > MemoryPressure::Normal;
        let was = self.low_memory.swap(low, Ordering::SeqCst);
        if low && !was {
            tracing::info!(?level, "memory pressure, suspending suggestion path");
            if let Err(err) = self.suggestions.stop() {
                tracing::warn!(error = %err, "overlay stop under memory pressure failed");
            }
        }
    }

    pub fn enable_log_detection(&self) {
        if !self.detector.is_started() {
            self.detector.start_detecting();
        }
    }

    pub fn disable_log_detection(&self) {
        if self.detector.is_started() {
            self.detector.stop_detecting();
        }
    }

    pub fn log_detection_running(&self) -> bool {
        self.detector.is_started()
    }

    /// The overlay reports its expanded state; while expanded, visibility
    /// commits are suppressed so the overlay itself does not count as a
    /// keyboard change.
    pub fn set_overlay_expanded(&self, expanded: bool) {
        self.visibility.set_overlay_expanded(expanded);
    }

    /// Committed keyboard visibility, if any transition happened yet.
    pub fn keyboard_visible(&self) -> Option<bool> {
        self.visibility.visible()
    }

    pub fn register_visibility_listener(&self, callback: VisibilityCallback) {
        self.visibility.subscribe(callback);
    }

    fn emit_dispatch(
        &self,
        outcome: DispatchOutcome,
        origin: TriggerOrigin,
        package: &Option<String>,
    ) {
        if outcome == DispatchOutcome::Dispatched {
            emit_event(
                &self.bus,
                event_names::TRIGGER_DISPATCHED,
                &TriggerDispatchedEvent::new(origin, package.clone()),
            );
        }
    }
}

impl Drop for CaptureService {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Routes log-channel callbacks into the coordinator; runs on the
/// detector's worker thread.
struct DetectorBridge {
    coordinator: Arc<TriggerCoordinator>,
    bus: EventBusRef,
}

impl LogDetectorListener for DetectorBridge {
    fn on_copy_detected(&self) {
        let package = self.coordinator.current_package();
        let outcome = self
            .coordinator
            .on_candidate_detected(package.as_deref(), TriggerOrigin::LogChannel);
        if outcome == DispatchOutcome::Dispatched {
            emit_event(
                &self.bus,
                event_names::TRIGGER_DISPATCHED,
                &TriggerDispatchedEvent::new(TriggerOrigin::LogChannel, package),
            );
        }
    }

    fn on_permission_denied(&self) {
        tracing::warn!("log read permission missing, log channel off for this session");
        emit_event(
            &self.bus,
            event_names::DETECTOR_STATUS,
            &DetectorStatusEvent::permission_denied(),
        );
    }
}

fn emit_event<T: serde::Serialize>(bus: &EventBusRef, topic: &str, event: &T) {
    match serde_json::to_value(event) {
        Ok(payload) => bus.emit(topic, payload),
        Err(err) => tracing::warn!(topic, error = %err, "failed to serialize event"),
    }
}
