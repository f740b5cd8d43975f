//! Mock collaborators for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::HostError;
use crate::listener::{ConnectionListener, RecordHook};
use crate::logging::{HostEvent, LogSink};
use crate::pipeline::{Environment, Middleware, Next};
use crate::request::{ProtocolRecord, ProtocolRequest};

/// Shared state behind a [`MockListener`] and all of its clones.
#[derive(Default)]
struct MockListenerState {
    journal: Mutex<Vec<String>>,
    logger: Mutex<Option<Arc<dyn LogSink>>>,
    hook: Mutex<Option<RecordHook>>,
    start_calls: Mutex<Vec<bool>>,
    stop_count: AtomicUsize,
    dispose_count: AtomicUsize,
    fail_next_start: AtomicBool,
}

/// A scripted listener reproducing the collaborator contract.
///
/// Clones share state, so a test can keep a handle while the host owns the
/// listener. Requests are constructed on demand with
/// [`build_request`](MockListener::build_request), which runs the installed
/// record hook exactly once, the way a real listener would on its
/// record-construction path.
#[derive(Clone, Default)]
pub struct MockListener {
    state: Arc<MockListenerState>,
}

impl MockListener {
    /// Creates a new mock listener.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry to the call journal.
    ///
    /// Tests use this from configuration callbacks to assert ordering
    /// against the listener's own entries.
    pub fn note(&self, entry: impl Into<String>) {
        self.state.journal.lock().push(entry.into());
    }

    /// Returns the journal of calls observed so far.
    #[must_use]
    pub fn journal(&self) -> Vec<String> {
        self.state.journal.lock().clone()
    }

    /// Returns the logger the host installed, if any.
    #[must_use]
    pub fn installed_logger(&self) -> Option<Arc<dyn LogSink>> {
        self.state.logger.lock().clone()
    }

    /// Returns the background flags passed to each start call.
    #[must_use]
    pub fn start_calls(&self) -> Vec<bool> {
        self.state.start_calls.lock().clone()
    }

    /// Returns how many times `stop` was called.
    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.state.stop_count.load(Ordering::SeqCst)
    }

    /// Returns how many times `dispose` was called.
    #[must_use]
    pub fn dispose_count(&self) -> usize {
        self.state.dispose_count.load(Ordering::SeqCst)
    }

    /// Makes the next start call fail with an IO error.
    pub fn fail_next_start(&self) {
        self.state.fail_next_start.store(true, Ordering::SeqCst);
    }

    /// Constructs a request the way a real listener would: build, then run
    /// the record hook once, before anything else sees the request.
    #[must_use]
    pub fn build_request(&self, request_id: u16) -> ProtocolRequest {
        let mut request = ProtocolRequest::new(request_id);
        let record = ProtocolRecord { request_id };
        if let Some(hook) = self.state.hook.lock().clone() {
            hook(&mut request, &record);
        }
        request
    }

    /// Records an event through the installed logger, if one is installed.
    pub fn record_event(&self, event: &HostEvent) {
        if let Some(logger) = self.state.logger.lock().clone() {
            logger.record(event);
        }
    }
}

#[async_trait]
impl ConnectionListener for MockListener {
    fn set_logger(&mut self, sink: Arc<dyn LogSink>) {
        self.note("set_logger");
        *self.state.logger.lock() = Some(sink);
    }

    fn set_record_hook(&mut self, hook: RecordHook) {
        self.note("set_record_hook");
        *self.state.hook.lock() = Some(hook);
    }

    async fn start(&mut self, background: bool) -> Result<(), HostError> {
        if self.state.fail_next_start.swap(false, Ordering::SeqCst) {
            return Err(HostError::Io(std::io::Error::new(
                std::io::ErrorKind::AddrInUse,
                "mock listener start failure",
            )));
        }
        self.note("start");
        self.state.start_calls.lock().push(background);
        Ok(())
    }

    fn stop(&mut self) {
        self.note("stop");
        self.state.stop_count.fetch_add(1, Ordering::SeqCst);
    }

    fn dispose(&mut self) {
        self.note("dispose");
        self.state.dispose_count.fetch_add(1, Ordering::SeqCst);
    }
}

/// A sink that panics on every event, for fault-isolation tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct PanickingSink;

impl LogSink for PanickingSink {
    fn record(&self, event: &HostEvent) {
        panic!("sink failure on {}", event.kind());
    }
}

/// Middleware that appends a tag to the environment's `trail` array.
#[derive(Debug)]
pub struct RecordingMiddleware {
    tag: String,
}

impl RecordingMiddleware {
    /// Creates a middleware tagged with `tag`.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

#[async_trait]
impl Middleware for RecordingMiddleware {
    async fn handle(&self, env: &mut Environment, next: Next<'_>) -> Result<(), HostError> {
        let trail = env
            .entry("trail".to_string())
            .or_insert_with(|| serde_json::Value::Array(Vec::new()));
        if let serde_json::Value::Array(items) = trail {
            items.push(serde_json::Value::String(self.tag.clone()));
        }
        next.run(env).await
    }
}
