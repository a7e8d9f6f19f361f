//! Log channel - permission-gated background poll over a system log source.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

/// Default polling interval for the log channel.
pub const DEFAULT_LOG_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Log line markers that correlate with a system clipboard write.
pub const DEFAULT_COPY_MARKERS: &[&str] = &["setPrimaryClip", "ClipboardService"];

#[derive(Debug, thiserror::Error)]
pub enum LogTailError {
    #[error("log read permission not granted")]
    PermissionDenied,
    #[error("log read failed: {0}")]
    Io(String),
}

/// Host-supplied primitive that yields the log lines written since the
/// previous call.
pub trait LogSource: Send {
    fn tail(&mut self) -> Result<Vec<String>, LogTailError>;
}

/// Queries the current grant state of the log-read permission.
pub trait LogPermissionProbe: Send + Sync {
    fn log_read_granted(&self) -> bool;
}

/// Receiver for log-channel outcomes. Callbacks fire on the detector's
/// worker thread.
pub trait LogDetectorListener: Send + Sync {
    /// A log line matched a copy marker.
    fn on_copy_detected(&self);
    /// The log-read permission is not granted. Reported at most once
    /// until a later granted poll cycle resets the notice.
    fn on_permission_denied(&self);
}

#[derive(Debug, Clone)]
pub struct LogDetectorConfig {
    pub interval: Duration,
    pub markers: Vec<String>,
}

impl Default for LogDetectorConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_LOG_POLL_INTERVAL,
            markers: DEFAULT_COPY_MARKERS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

struct DetectorShared {
    listener: Mutex<Option<Arc<dyn LogDetectorListener>>>,
    source: Mutex<Box<dyn LogSource>>,
    probe: Arc<dyn LogPermissionProbe>,
    started: AtomicBool,
    denial_reported: AtomicBool,
    markers: Vec<String>,
}

/// Secondary copy-detection channel: polls a [`LogSource`] on a background
/// schedule and reports marker matches to a registered listener.
///
/// Every cycle first consults the [`LogPermissionProbe`]; on denial the
/// worker reports once and stops polling for the session. The sticky
/// denial notice is cleared by the next granted cycle, so a revocation
/// after a re-grant is reported again.
pub struct LogDetector {
    shared: Arc<DetectorShared>,
    interval: Duration,
    stop_tx: Mutex<Option<Sender<()>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl LogDetector {
    pub fn new(source: Box<dyn LogSource>, probe: Arc<dyn LogPermissionProbe>) -> Self {
        Self::with_config(source, probe, LogDetectorConfig::default())
    }

    pub fn with_config(
        source: Box<dyn LogSource>,
        probe: Arc<dyn LogPermissionProbe>,
        config: LogDetectorConfig,
    ) -> Self {
        Self {
            shared: Arc::new(DetectorShared {
                listener: Mutex::new(None),
                source: Mutex::new(source),
                probe,
                started: AtomicBool::new(false),
                denial_reported: AtomicBool::new(false),
                markers: config.markers,
            }),
            interval: config.interval,
            stop_tx: Mutex::new(None),
            handle: Mutex::new(None),
        }
    }

    pub fn register_listener(&self, listener: Arc<dyn LogDetectorListener>) {
        if let Ok(mut slot) = self.shared.listener.lock() {
            *slot = Some(listener);
        }
    }

    /// Spawn the polling worker. A second call while running is a no-op.
    pub fn start_detecting(&self) {
        if self.shared.started.swap(true, Ordering::SeqCst) {
            tracing::warn!("log detector already running");
            return;
        }

        let Ok(mut handle) = self.handle.lock() else {
            return;
        };
        // A worker that stopped on its own (permission denial) leaves its
        // handle behind; reap it before spawning the replacement.
        if let Some(stale) = handle.take() {
            let _ = stale.join();
        }

        let (tx, rx) = crossbeam_channel::bounded::<()>(1);
        if let Ok(mut stop_tx) = self.stop_tx.lock() {
            *stop_tx = Some(tx);
        }

        let shared = Arc::clone(&self.shared);
        let interval = self.interval;
        *handle = Some(std::thread::spawn(move || poll_loop(shared, rx, interval)));
    }

    /// Cancel the polling worker and wait for it to exit. The worker
    /// sleeps on the stop channel, so cancellation does not wait out the
    /// remainder of a poll interval.
    pub fn stop_detecting(&self) {
        let tx = self.stop_tx.lock().ok().and_then(|mut guard| guard.take());
        if let Some(tx) = tx {
            let _ = tx.send(());
        }
        let handle = self.handle.lock().ok().and_then(|mut guard| guard.take());
        if let Some(handle) = handle {
            let _ = handle.join();
        }
        self.shared.started.store(false, Ordering::SeqCst);
    }

    pub fn is_started(&self) -> bool {
        self.shared.started.load(Ordering::SeqCst)
    }

    /// Stop polling and drop the listener. No callback fires after this
    /// returns.
    pub fn dispose(&self) {
        self.stop_detecting();
        if let Ok(mut slot) = self.shared.listener.lock() {
            *slot = None;
        }
    }
}

impl Drop for LogDetector {
    fn drop(&mut self) {
        self.stop_detecting();
    }
}

fn poll_loop(shared: Arc<DetectorShared>, stop_rx: Receiver<()>, interval: Duration) {
    tracing::info!(interval_ms = interval.as_millis() as u64, "log detector started");
    loop {
        match stop_rx.recv_timeout(interval) {
            Err(RecvTimeoutError::Timeout) => {
                if !poll_cycle(&shared) {
                    break;
                }
            }
            // Explicit stop, or the detector itself was dropped.
            _ => break,
        }
    }
    shared.started.store(false, Ordering::SeqCst);
    tracing::info!("log detector stopped");
}

/// One poll cycle. Returns false when the worker should stop polling for
/// the session (permission denied).
fn poll_cycle(shared: &DetectorShared) -> bool {
    if !shared.probe.log_read_granted() {
        report_denial(shared);
        return false;
    }
    shared.denial_reported.store(false, Ordering::SeqCst);

    let tailed = {
        let Ok(mut source) = shared.source.lock() else {
            return false;
        };
        source.tail()
    };
    let lines = match tailed {
        Ok(lines) => lines,
        Err(LogTailError::PermissionDenied) => {
            report_denial(shared);
            return false;
        }
        Err(LogTailError::Io(err)) => {
            tracing::warn!(error = %err, "log tail failed");
            return true;
        }
    };

    for line in &lines {
        if shared.markers.iter().any(|marker| line.contains(marker.as_str())) {
            tracing::debug!(line = %line, "log line matched copy marker");
            notify_copy(shared);
        }
    }
    true
}

fn notify_copy(shared: &DetectorShared) {
    let listener = shared.listener.lock().ok().and_then(|guard| guard.clone());
    if let Some(listener) = listener {
        listener.on_copy_detected();
    }
}

fn report_denial(shared: &DetectorShared) {
    if shared.denial_reported.swap(true, Ordering::SeqCst) {
        return;
    }
    tracing::warn!("log read permission denied, pausing log detection");
    let listener = shared.listener.lock().ok().and_then(|guard| guard.clone());
    if let Some(listener) = listener {
        listener.on_permission_denied();
    }
}

/// Scripted [`LogSource`] for tests: lines are hand-fed and drained by
/// each `tail` call. Clones share the same queue, so one clone can feed
/// the detector while the other is owned by it.
#[derive(Clone, Default)]
pub struct ScriptedLogSource {
    lines: Arc<Mutex<VecDeque<String>>>,
    fail_permission: Arc<AtomicBool>,
}

impl ScriptedLogSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push_back(line.to_string());
        }
    }

    /// Make subsequent `tail` calls fail with `PermissionDenied`.
    pub fn set_permission_failure(&self, fail: bool) {
        self.fail_permission.store(fail, Ordering::SeqCst);
    }
}

impl LogSource for ScriptedLogSource {
    fn tail(&mut self) -> Result<Vec<String>, LogTailError> {
        if self.fail_permission.load(Ordering::SeqCst) {
            return Err(LogTailError::PermissionDenied);
        }
        let Ok(mut lines) = self.lines.lock() else {
            return Ok(Vec::new());
        };
        Ok(lines.drain(..).collect())
    }
}

/// [`LogPermissionProbe`] with a settable grant state.
pub struct StaticPermissionProbe {
    granted: AtomicBool,
}

impl StaticPermissionProbe {
    pub fn new(granted: bool) -> Self {
        Self {
            granted: AtomicBool::new(granted),
        }
    }

    pub fn set_granted(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }
}

impl LogPermissionProbe for StaticPermissionProbe {
    fn log_read_granted(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }
}
