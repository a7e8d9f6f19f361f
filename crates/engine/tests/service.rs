//! Integration tests for the assembled capture service.
//!
//! Every collaborator is an in-memory double, so these run the real
//! event-to-dispatch, capture, visibility, and insertion flows without an
//! OS behind them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clipcue_context::{
    InMemoryTree, NodeAction, NodeId, NodeSpec, ScreenStateProvider, ScreenStateRef,
    UiTreeProvider, WindowStateProvider, WindowStateRef,
};
use clipcue_detect::{
    DetectionProfile, LogPermissionProbe, ScriptedLogSource, StaticPermissionProbe,
};
use clipcue_events::{
    event_names, EventBusRef, EventKind, InMemoryEventBus, MemoryPressure, RawEvent,
};
use clipcue_engine::{
    ActionLauncher, CaptureService, ClipSink, HostBindings, RecordingClipSink, RecordingLauncher,
    RecordingSuggestionSink, ServiceConfig, SettingsSource, StaticSettings, SuggestionSink,
};
use clipcue_input::{Clipboard, InMemoryClipboard};

const FOREIGN: &str = "com.example.notes";
const OWN: &str = "dev.clipcue";

struct FlagScreen(AtomicBool);

impl ScreenStateProvider for FlagScreen {
    fn is_interactive(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

struct FlagWindow(AtomicBool);

impl WindowStateProvider for FlagWindow {
    fn input_method_visible(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

struct Harness {
    tree: Arc<InMemoryTree>,
    clipboard: Arc<InMemoryClipboard>,
    screen: Arc<FlagScreen>,
    windows: Arc<FlagWindow>,
    launcher: Arc<RecordingLauncher>,
    settings: Arc<StaticSettings>,
    clips: Arc<RecordingClipSink>,
    suggestions: Arc<RecordingSuggestionSink>,
    log_source: ScriptedLogSource,
    probe: Arc<StaticPermissionProbe>,
    bus: Arc<InMemoryEventBus>,
    service: CaptureService,
}

fn test_config() -> ServiceConfig {
    ServiceConfig {
        profile: DetectionProfile::Legacy,
        deferred_visibility: false,
        log_poll_interval: Duration::from_millis(10),
        ..Default::default()
    }
}

fn harness() -> Harness {
    harness_with(test_config())
}

fn harness_with(config: ServiceConfig) -> Harness {
    let tree = Arc::new(InMemoryTree::new());
    let clipboard = Arc::new(InMemoryClipboard::new());
    let screen = Arc::new(FlagScreen(AtomicBool::new(true)));
    let windows = Arc::new(FlagWindow(AtomicBool::new(false)));
    let launcher = Arc::new(RecordingLauncher::new());
    let settings = Arc::new(StaticSettings::new());
    let clips = Arc::new(RecordingClipSink::new());
    let suggestions = Arc::new(RecordingSuggestionSink::new());
    let log_source = ScriptedLogSource::new();
    let probe = Arc::new(StaticPermissionProbe::new(true));
    let bus = Arc::new(InMemoryEventBus::new());

    let bindings = HostBindings {
        tree: Arc::clone(&tree) as Arc<dyn UiTreeProvider>,
        clipboard: Arc::clone(&clipboard) as Arc<dyn Clipboard>,
        screen: Arc::clone(&screen) as ScreenStateRef,
        windows: Arc::clone(&windows) as WindowStateRef,
        launcher: Arc::clone(&launcher) as Arc<dyn ActionLauncher>,
        settings: Arc::clone(&settings) as Arc<dyn SettingsSource>,
        clips: Arc::clone(&clips) as Arc<dyn ClipSink>,
        suggestions: Arc::clone(&suggestions) as Arc<dyn SuggestionSink>,
        log_source: Box::new(log_source.clone()),
        log_probe: Arc::clone(&probe) as Arc<dyn LogPermissionProbe>,
        bus: Arc::clone(&bus) as EventBusRef,
    };

    Harness {
        tree,
        clipboard,
        screen,
        windows,
        launcher,
        settings,
        clips,
        suggestions,
        log_source,
        probe,
        bus,
        service: CaptureService::new(bindings, config),
    }
}

fn foreign_event(kind: EventKind) -> RawEvent {
    RawEvent::new(kind, Some(FOREIGN))
}

fn add_editable_node(tree: &InMemoryTree, text: &str, selection: Option<(usize, usize)>) -> NodeId {
    tree.add_node(NodeSpec {
        editable: true,
        focused: true,
        text: Some(text.to_string()),
        selection,
        ..Default::default()
    })
}

fn settle() {
    std::thread::sleep(Duration::from_millis(120));
}

// =============================================================================
// Detection and Dispatch
// =============================================================================

mod dispatch {
    use super::*;

    #[test]
    fn test_legacy_pair_dispatches_then_follow_up_then_quiet() {
        let mut h = harness();
        h.service.start();

        // Long-click alone is not a copy.
        h.service.on_event(&foreign_event(EventKind::ViewLongClicked));
        assert_eq!(h.launcher.launches(), 0);

        // Selection change completes the legacy pattern.
        h.service
            .on_event(&foreign_event(EventKind::ViewTextSelectionChanged));
        assert_eq!(h.launcher.launches(), 1);

        // The surface is now showing; the armed follow-up still fires for
        // the next event even though it matches nothing itself.
        h.launcher.set_active(true);
        h.service.on_event(&foreign_event(EventKind::WindowStateChanged));
        assert_eq!(h.launcher.launches(), 2);

        // Arm spent: further events are deduplicated against the active
        // surface.
        h.service.on_event(&foreign_event(EventKind::ViewFocused));
        h.service.on_event(&foreign_event(EventKind::ViewClicked));
        assert_eq!(h.launcher.launches(), 2);

        let dispatches = h.bus.records_for(event_names::TRIGGER_DISPATCHED);
        assert_eq!(dispatches.len(), 2);
        assert_eq!(dispatches[0].payload["origin"], "classifier");
        assert_eq!(dispatches[1].payload["origin"], "follow_up");
        assert_eq!(dispatches[0].payload["package"], FOREIGN);
    }

    #[test]
    fn test_modern_profile_dispatches_on_notification_event() {
        let mut h = harness_with(ServiceConfig {
            profile: DetectionProfile::Modern,
            ..test_config()
        });
        h.service.start();

        h.service
            .on_event(&foreign_event(EventKind::NotificationStateChanged));

        assert_eq!(h.launcher.launches(), 1);
        assert_eq!(h.bus.count_for(event_names::TRIGGER_DISPATCHED), 1);
    }

    #[test]
    fn test_copy_label_click_dispatches() {
        let mut h = harness();
        h.service.start();

        let click = RawEvent::new(EventKind::ViewClicked, Some(FOREIGN)).with_label("Copy");
        h.service.on_event(&click);

        assert_eq!(h.launcher.launches(), 1);
    }

    #[test]
    fn test_blacklisted_package_never_dispatches() {
        let mut h = harness();
        h.settings.set_blacklist(&[FOREIGN]);
        h.service.start();

        h.service.on_event(&foreign_event(EventKind::ViewLongClicked));
        h.service
            .on_event(&foreign_event(EventKind::ViewTextSelectionChanged));

        assert_eq!(h.launcher.launches(), 0);
        assert_eq!(h.bus.count_for(event_names::TRIGGER_DISPATCHED), 0);
    }

    #[test]
    fn test_blacklist_update_applies_without_restart() {
        let mut h = harness();
        h.service.start();
        h.settings.set_blacklist(&[FOREIGN]);

        h.service.on_event(&foreign_event(EventKind::ViewLongClicked));
        h.service
            .on_event(&foreign_event(EventKind::ViewTextSelectionChanged));

        assert_eq!(h.launcher.launches(), 0);
    }

    #[test]
    fn test_screen_off_blocks_dispatch() {
        let mut h = harness();
        h.service.start();
        h.screen.0.store(false, Ordering::SeqCst);

        h.service.on_event(&foreign_event(EventKind::ViewLongClicked));
        h.service
            .on_event(&foreign_event(EventKind::ViewTextSelectionChanged));

        assert_eq!(h.launcher.launches(), 0);
    }
}

// =============================================================================
// Log Channel
// =============================================================================

mod log_channel {
    use super::*;

    #[test]
    fn test_log_marker_dispatches_with_remembered_package() {
        let mut h = harness();
        h.settings.set_improve_detection(true);
        h.service.start();

        // An ordinary event remembers the foreground package for the log
        // channel, which has no event of its own to read it from.
        h.service.on_event(&foreign_event(EventKind::ViewFocused));

        h.log_source
            .push_line("ClipboardService: setPrimaryClip caller=com.example.notes");
        settle();

        assert_eq!(h.launcher.launches(), 1);
        let dispatches = h.bus.records_for(event_names::TRIGGER_DISPATCHED);
        assert_eq!(dispatches.len(), 1);
        assert_eq!(dispatches[0].payload["origin"], "log_channel");
        assert_eq!(dispatches[0].payload["package"], FOREIGN);
    }

    #[test]
    fn test_log_channel_deduped_against_active_surface() {
        let mut h = harness();
        h.settings.set_improve_detection(true);
        h.service.start();
        h.launcher.set_active(true);

        h.log_source.push_line("setPrimaryClip");
        settle();

        assert_eq!(h.launcher.launches(), 0);
    }

    #[test]
    fn test_log_channel_respects_blacklist() {
        let mut h = harness();
        h.settings.set_improve_detection(true);
        h.settings.set_blacklist(&[FOREIGN]);
        h.service.start();
        h.service.on_event(&foreign_event(EventKind::ViewFocused));

        h.log_source.push_line("setPrimaryClip");
        settle();

        assert_eq!(h.launcher.launches(), 0);
    }

    #[test]
    fn test_permission_denied_reported_once() {
        let mut h = harness();
        h.settings.set_improve_detection(true);
        h.probe.set_granted(false);
        h.service.start();
        settle();

        let denials: Vec<_> = h
            .bus
            .records_for(event_names::DETECTOR_STATUS)
            .into_iter()
            .filter(|record| record.payload["permission_denied"] == true)
            .collect();
        assert_eq!(denials.len(), 1);
        // The worker stopped itself; no further polling this session.
        assert!(!h.service.log_detection_running());
    }

    #[test]
    fn test_improve_detection_toggle_follows_settings() {
        let mut h = harness();
        h.service.start();
        assert!(!h.service.log_detection_running());

        h.settings.set_improve_detection(true);
        assert!(h.service.log_detection_running());

        h.settings.set_improve_detection(false);
        assert!(!h.service.log_detection_running());
    }

    #[test]
    fn test_explicit_commands_control_detection() {
        let mut h = harness();
        h.service.start();

        h.service.enable_log_detection();
        assert!(h.service.log_detection_running());

        h.service.disable_log_detection();
        assert!(!h.service.log_detection_running());
    }
}

// =============================================================================
// Keyboard Visibility and Overlay Lifecycle
// =============================================================================

mod visibility {
    use super::*;

    fn deferred_config(debounce_ms: u64) -> ServiceConfig {
        ServiceConfig {
            deferred_visibility: true,
            visibility_debounce: Duration::from_millis(debounce_ms),
            ..test_config()
        }
    }

    #[test]
    fn test_single_request_commits_after_debounce() {
        let mut h = harness_with(deferred_config(100));
        h.service.start();
        h.windows.0.store(true, Ordering::SeqCst);

        h.service.on_event(&foreign_event(EventKind::ViewFocused));
        assert_eq!(h.service.keyboard_visible(), None);

        std::thread::sleep(Duration::from_millis(250));
        assert_eq!(h.service.keyboard_visible(), Some(true));
        assert_eq!(h.suggestions.starts(), 1);
        assert_eq!(h.bus.count_for(event_names::VISIBILITY_CHANGED), 1);
    }

    #[test]
    fn test_request_burst_commits_once_with_confirmed_state() {
        let mut h = harness_with(deferred_config(150));
        h.service.start();

        h.windows.0.store(true, Ordering::SeqCst);
        h.service.on_event(&foreign_event(EventKind::ViewFocused));
        std::thread::sleep(Duration::from_millis(30));
        h.windows.0.store(false, Ordering::SeqCst);
        h.service.on_event(&foreign_event(EventKind::ViewClicked));

        // Still inside the quiet period of the newer request.
        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(h.service.keyboard_visible(), None);

        std::thread::sleep(Duration::from_millis(600));
        // One confirmation, reflecting the window state at confirmation
        // time rather than either raw value.
        assert_eq!(h.service.keyboard_visible(), Some(false));
        assert_eq!(h.bus.count_for(event_names::VISIBILITY_CHANGED), 1);
    }

    #[test]
    fn test_expanded_overlay_suppresses_commits() {
        let mut h = harness_with(deferred_config(50));
        h.service.start();
        h.service.set_overlay_expanded(true);
        h.windows.0.store(true, Ordering::SeqCst);

        h.service.on_event(&foreign_event(EventKind::ViewFocused));
        std::thread::sleep(Duration::from_millis(150));
        assert_eq!(h.service.keyboard_visible(), None);
        assert_eq!(h.suggestions.starts(), 0);

        h.service.set_overlay_expanded(false);
        h.service.on_event(&foreign_event(EventKind::ViewFocused));
        std::thread::sleep(Duration::from_millis(150));
        assert_eq!(h.service.keyboard_visible(), Some(true));
    }

    #[test]
    fn test_overlay_skipped_when_suggestions_disabled() {
        let mut h = harness();
        h.settings.set_suggestions_enabled(false);
        h.service.start();
        h.windows.0.store(true, Ordering::SeqCst);

        h.service.on_event(&foreign_event(EventKind::ViewFocused));

        // The transition itself still commits and is observable.
        assert_eq!(h.service.keyboard_visible(), Some(true));
        assert_eq!(h.bus.count_for(event_names::VISIBILITY_CHANGED), 1);
        assert_eq!(h.suggestions.starts(), 0);
    }

    #[test]
    fn test_overlay_skipped_without_permission() {
        let mut h = harness();
        h.suggestions.set_permitted(false);
        h.service.start();
        h.windows.0.store(true, Ordering::SeqCst);

        h.service.on_event(&foreign_event(EventKind::ViewFocused));

        assert_eq!(h.suggestions.starts(), 0);
    }

    #[test]
    fn test_keyboard_hide_stops_overlay() {
        let mut h = harness();
        h.service.start();

        h.windows.0.store(true, Ordering::SeqCst);
        h.service.on_event(&foreign_event(EventKind::ViewFocused));
        assert!(h.suggestions.is_running());

        h.windows.0.store(false, Ordering::SeqCst);
        h.service.on_event(&foreign_event(EventKind::ViewFocused));
        assert!(!h.suggestions.is_running());
        assert_eq!(h.suggestions.stops(), 1);
    }
}

// =============================================================================
// Focus, Suggestions, and Insertion
// =============================================================================

mod insertion {
    use super::*;

    #[test]
    fn test_caret_context_published_for_observed_node() {
        let mut h = harness();
        h.service.start();
        let node = add_editable_node(&h.tree, "hel", Some((3, 3)));

        h.service
            .on_event(&foreign_event(EventKind::ViewTextChanged).with_source(node));

        assert_eq!(h.suggestions.contexts(), vec![("hel".to_string(), Some(3))]);
    }

    #[test]
    fn test_click_outside_overlay_broadcasts_close() {
        let mut h = harness();
        h.service.start();

        h.service.on_event(&foreign_event(EventKind::ViewClicked));
        assert_eq!(h.suggestions.closes(), 1);

        // Clicks inside our own UI do not close it.
        h.service
            .on_event(&RawEvent::new(EventKind::ViewClicked, Some(OWN)));
        assert_eq!(h.suggestions.closes(), 1);
    }

    #[test]
    fn test_insert_targets_remembered_editable_node() {
        let mut h = harness();
        h.service.start();

        let root = h.tree.add_node(NodeSpec::default());
        let field = add_editable_node(&h.tree, "existing", Some((8, 8)));
        h.tree.attach_child(root, field);

        h.service
            .on_event(&foreign_event(EventKind::ViewFocused).with_source(root));

        h.clipboard.seed("original");
        h.service.insert_text(None, "payload", 0);

        assert_eq!(h.tree.performed(field), vec![NodeAction::Paste]);
        assert_eq!(h.clipboard.current_text(), Some("original".to_string()));
    }

    #[test]
    fn test_insert_never_feeds_back_into_capture() {
        let mut h = harness();
        h.service.start();
        let field = add_editable_node(&h.tree, "existing", Some((8, 8)));
        h.service
            .on_event(&foreign_event(EventKind::ViewFocused).with_source(field));

        h.clipboard.seed("before");
        h.service.insert_text(None, "payload", 0);

        // Both the payload write and the restore were suppressed.
        assert!(h.clips.clips().is_empty());
        assert_eq!(h.bus.count_for(event_names::CLIP_CAPTURED), 0);
        assert_eq!(h.clipboard.current_text(), Some("before".to_string()));
    }

    #[test]
    fn test_replace_length_covers_word_before_caret() {
        let mut h = harness();
        h.service.start();
        let field = add_editable_node(&h.tree, "typing wor", Some((10, 10)));
        h.service
            .on_event(&foreign_event(EventKind::ViewFocused).with_source(field));

        h.service.insert_text(None, "world", 3);

        assert_eq!(
            h.tree.performed(field),
            vec![
                NodeAction::SetSelection {
                    anchor: 7,
                    focus: 10
                },
                NodeAction::Paste,
            ]
        );
    }

    #[test]
    fn test_insert_uses_hint_when_nothing_observed() {
        let mut h = harness();
        h.service.start();
        let field = add_editable_node(&h.tree, "", None);

        h.service.insert_text(Some(field), "payload", 0);

        assert_eq!(
            h.tree.performed(field),
            vec![NodeAction::SetText("payload".to_string())]
        );
    }

    #[test]
    fn test_insert_without_any_target_is_a_noop() {
        let mut h = harness();
        h.service.start();

        h.service.insert_text(None, "payload", 0);

        assert!(h.clipboard.writes().is_empty());
    }

    #[test]
    fn test_memory_pressure_suspends_insertion() {
        let mut h = harness();
        h.service.start();
        let field = add_editable_node(&h.tree, "existing", Some((8, 8)));
        h.service
            .on_event(&foreign_event(EventKind::ViewFocused).with_source(field));

        h.service.on_memory_pressure(MemoryPressure::Critical);
        h.service.insert_text(None, "payload", 0);
        assert!(h.tree.performed(field).is_empty());

        h.service.on_memory_pressure(MemoryPressure::Normal);
        h.service.insert_text(None, "payload", 0);
        assert_eq!(h.tree.performed(field), vec![NodeAction::Paste]);
    }

    #[test]
    fn test_memory_pressure_collapses_overlay() {
        let mut h = harness();
        h.service.start();
        h.windows.0.store(true, Ordering::SeqCst);
        h.service.on_event(&foreign_event(EventKind::ViewFocused));
        assert!(h.suggestions.is_running());

        h.service.on_memory_pressure(MemoryPressure::Moderate);
        assert!(!h.suggestions.is_running());

        // While suspended, a keyboard re-show does not bring it back.
        h.windows.0.store(false, Ordering::SeqCst);
        h.service.on_event(&foreign_event(EventKind::ViewFocused));
        h.windows.0.store(true, Ordering::SeqCst);
        h.service.on_event(&foreign_event(EventKind::ViewFocused));
        assert!(!h.suggestions.is_running());
    }
}

// =============================================================================
// Clipboard Capture
// =============================================================================

mod capture {
    use super::*;

    #[test]
    fn test_external_clipboard_change_reaches_clip_sink() {
        let mut h = harness();
        h.service.start();
        h.service.on_event(&foreign_event(EventKind::ViewFocused));

        h.clipboard.set_text("user copy", false).unwrap();

        assert_eq!(h.clips.clips(), vec!["user copy".to_string()]);
        let captured = h.bus.records_for(event_names::CLIP_CAPTURED);
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].payload["chars"], 9);
        assert_eq!(captured[0].payload["package"], FOREIGN);
    }

    #[test]
    fn test_capture_skipped_for_blacklisted_foreground_app() {
        let mut h = harness();
        h.service.start();
        h.settings.set_blacklist(&[FOREIGN]);
        h.service.on_event(&foreign_event(EventKind::ViewFocused));

        h.clipboard.set_text("secret", false).unwrap();

        assert!(h.clips.clips().is_empty());
        assert_eq!(h.bus.count_for(event_names::CLIP_CAPTURED), 0);
    }

    #[test]
    fn test_own_package_does_not_become_foreground() {
        let mut h = harness();
        h.service.start();
        h.service.on_event(&foreign_event(EventKind::ViewFocused));
        h.settings.set_blacklist(&[FOREIGN]);

        // Our own UI coming to the front must not clear the remembered
        // foreground app.
        h.service
            .on_event(&RawEvent::new(EventKind::WindowStateChanged, Some(OWN)));
        h.clipboard.set_text("still blocked", false).unwrap();

        assert!(h.clips.clips().is_empty());
    }
}

// =============================================================================
// Lifecycle
// =============================================================================

mod lifecycle {
    use super::*;

    #[test]
    fn test_subscription_spec_covers_all_kinds() {
        let h = harness();
        let spec = h.service.subscription_spec();
        assert_eq!(spec.kinds.len(), 9);
        assert!(spec.notification_timeout_ms > 0);
    }

    #[test]
    fn test_stop_severs_every_collaborator() {
        let mut h = harness();
        h.service.start();
        h.service.stop();

        // Clipboard observer gone.
        h.clipboard.set_text("after stop", false).unwrap();
        assert!(h.clips.clips().is_empty());

        // Event path gone.
        h.service.on_event(&foreign_event(EventKind::ViewLongClicked));
        h.service
            .on_event(&foreign_event(EventKind::ViewTextSelectionChanged));
        assert_eq!(h.launcher.launches(), 0);

        // Settings subscription gone: a toggle no longer starts the
        // detector.
        h.settings.set_improve_detection(true);
        assert!(!h.service.log_detection_running());
    }

    #[test]
    fn test_stopped_instance_stays_stopped() {
        let mut h = harness();
        h.service.start();
        h.service.stop();

        h.service.start();
        h.service.on_event(&foreign_event(EventKind::ViewLongClicked));
        h.service
            .on_event(&foreign_event(EventKind::ViewTextSelectionChanged));

        assert_eq!(h.launcher.launches(), 0);
    }

    #[test]
    fn test_fresh_instance_rebinds_same_collaborators() {
        let mut h = harness();
        h.service.start();
        h.service.stop();

        // The host binds again with a new service over the same
        // collaborators.
        let bindings = HostBindings {
            tree: Arc::clone(&h.tree) as Arc<dyn UiTreeProvider>,
            clipboard: Arc::clone(&h.clipboard) as Arc<dyn Clipboard>,
            screen: Arc::clone(&h.screen) as ScreenStateRef,
            windows: Arc::clone(&h.windows) as WindowStateRef,
            launcher: Arc::clone(&h.launcher) as Arc<dyn ActionLauncher>,
            settings: Arc::clone(&h.settings) as Arc<dyn SettingsSource>,
            clips: Arc::clone(&h.clips) as Arc<dyn ClipSink>,
            suggestions: Arc::clone(&h.suggestions) as Arc<dyn SuggestionSink>,
            log_source: Box::new(h.log_source.clone()),
            log_probe: Arc::clone(&h.probe) as Arc<dyn LogPermissionProbe>,
            bus: Arc::clone(&h.bus) as EventBusRef,
        };
        let mut second = CaptureService::new(bindings, test_config());
        second.start();

        second.on_event(&foreign_event(EventKind::ViewLongClicked));
        second.on_event(&foreign_event(EventKind::ViewTextSelectionChanged));
        assert_eq!(h.launcher.launches(), 1);

        h.clipboard.set_text("captured again", false).unwrap();
        assert_eq!(h.clips.clips(), vec!["captured again".to_string()]);
    }

    #[test]
    fn test_double_start_is_harmless() {
        let mut h = harness();
        h.service.start();
        h.service.start();

        h.service
            .on_event(&foreign_event(EventKind::NotificationStateChanged));
        // Legacy profile: notification event alone does not match, so
        // nothing fires; the second start must not have re-registered
        // anything that would.
        assert_eq!(h.launcher.launches(), 0);
        assert_eq!(h.bus.count_for(event_names::DETECTOR_STATUS), 1);
    }

    #[test]
    fn test_detector_status_emitted_on_start() {
        let mut h = harness();
        h.settings.set_improve_detection(true);
        h.service.start();

        let statuses = h.bus.records_for(event_names::DETECTOR_STATUS);
        assert_eq!(statuses.len(), 1);
        assert_eq!(statuses[0].payload["running"], true);
    }
}
