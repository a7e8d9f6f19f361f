//! Example: Drive the capture service with scripted host events and
//! print what it dispatches and captures.
//!
//! Run with: cargo run -p clipcue-engine --example drive_service

use std::sync::Arc;

use clipcue_context::{InMemoryTree, NullScreenState, NullWindowState};
use clipcue_detect::{ScriptedLogSource, StaticPermissionProbe};
use clipcue_events::{event_names, EventBusRef, EventKind, InMemoryEventBus, RawEvent};
use clipcue_engine::{
    ActionLauncher, CaptureService, ClipSink, HostBindings, RecordingClipSink, RecordingLauncher,
    RecordingSuggestionSink, ServiceConfig, StaticSettings,
};
use clipcue_input::{Clipboard, InMemoryClipboard};

fn main() {
    // Initialize tracing for debug output
    tracing_subscriber::fmt()
        .with_env_filter("clipcue_engine=debug,clipcue_detect=debug")
        .init();

    println!("=== Capture Service Example ===");
    println!("Driving the engine with scripted events on in-memory hosts.\n");

    let clipboard = Arc::new(InMemoryClipboard::new());
    let launcher = Arc::new(RecordingLauncher::new());
    let clips = Arc::new(RecordingClipSink::new());
    let bus = Arc::new(InMemoryEventBus::new());

    let bindings = HostBindings {
        tree: Arc::new(InMemoryTree::new()),
        clipboard: Arc::clone(&clipboard) as Arc<dyn Clipboard>,
        screen: Arc::new(NullScreenState),
        windows: Arc::new(NullWindowState),
        launcher: Arc::clone(&launcher) as Arc<dyn ActionLauncher>,
        settings: Arc::new(StaticSettings::new()),
        clips: Arc::clone(&clips) as Arc<dyn ClipSink>,
        suggestions: Arc::new(RecordingSuggestionSink::new()),
        log_source: Box::new(ScriptedLogSource::new()),
        log_probe: Arc::new(StaticPermissionProbe::new(true)),
        bus: Arc::clone(&bus) as EventBusRef,
    };
    let mut service = CaptureService::new(bindings, ServiceConfig::default());
    service.start();

    // The modern profile treats the system clipboard notification as the
    // copy gesture.
    service.on_event(&RawEvent::new(
        EventKind::NotificationStateChanged,
        Some("com.example.notes"),
    ));
    println!("surface launches: {}", launcher.launches());
    for record in bus.records_for(event_names::TRIGGER_DISPATCHED) {
        println!("dispatched: {}", record.payload);
    }

    // An external copy while com.example.notes is frontmost lands in the
    // clip sink.
    if clipboard.set_text("copied in another app", false).is_ok() {
        println!("captured clips: {:?}", clips.clips());
    }

    service.stop();
    println!("\nDone.");
}
