//! Fan-out sink combining several logging backends into one surface.

use std::sync::Arc;
use tracing::warn;

use super::event::HostEvent;
use super::sink::LogSink;

/// A sink forwarding each event to all contained sinks.
///
/// Insertion order is the fan-out order, nothing more: every sink receives
/// every event. A panicking sink is isolated so it cannot suppress delivery
/// to the remaining sinks.
///
/// The host never installs an empty composite; when no sinks are
/// configured the listener simply runs without a logger.
#[derive(Default)]
pub struct CompositeSink {
    sinks: Vec<Arc<dyn LogSink>>,
}

impl CompositeSink {
    /// Creates a new empty composite.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sink to the fan-out list.
    pub fn add_sink(&mut self, sink: Arc<dyn LogSink>) {
        self.sinks.push(sink);
    }

    /// Returns the number of contained sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Returns true if no sinks are contained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl LogSink for CompositeSink {
    fn record(&self, event: &HostEvent) {
        for sink in &self.sinks {
            if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                sink.record(event);
            })) {
                warn!(event = %event.kind(), "log sink panicked: {:?}", e);
            }
        }
    }
}

impl std::fmt::Debug for CompositeSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeSink")
            .field("sink_count", &self.len())
            .finish()
    }
}
