//! Example: Debounce keyboard-visibility requests and print confirmed
//! transitions.
//!
//! Run with: cargo run -p clipcue-context --example watch_visibility

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clipcue_context::{VisibilityTracker, WindowStateProvider};

struct FlagWindow(AtomicBool);

impl WindowStateProvider for FlagWindow {
    fn input_method_visible(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

fn main() {
    // Initialize tracing for debug output
    tracing_subscriber::fmt()
        .with_env_filter("clipcue_context=debug")
        .init();

    println!("=== Visibility Tracker Example ===");
    println!("Requests settle for 300 ms before the window state is read.\n");

    let windows = Arc::new(FlagWindow(AtomicBool::new(false)));
    let mut tracker = VisibilityTracker::deferred_with_debounce(
        Arc::clone(&windows) as Arc<dyn WindowStateProvider>,
        Duration::from_millis(300),
    );
    tracker.subscribe(Arc::new(|visible| {
        println!("confirmed: keyboard visible = {visible}");
    }));

    // A burst of requests while the keyboard animates in: one commit,
    // read from the window state at confirmation time.
    windows.0.store(true, Ordering::SeqCst);
    tracker.request_update(false);
    tracker.request_update(true);
    std::thread::sleep(Duration::from_millis(500));

    // Keyboard dismissed.
    windows.0.store(false, Ordering::SeqCst);
    tracker.request_update(false);
    std::thread::sleep(Duration::from_millis(500));

    tracker.stop();
    println!("\nDone.");
}
