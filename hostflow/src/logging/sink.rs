//! Log sink trait and implementations.

use tracing::{debug, info, Level};

use super::event::HostEvent;

/// Capability trait for components accepting structured host events.
///
/// `record` runs on the listener's hot path and must not block; sinks that
/// need IO should buffer internally.
pub trait LogSink: Send + Sync {
    /// Records a single event.
    fn record(&self, event: &HostEvent);
}

/// A sink that forwards events to the tracing framework.
#[derive(Debug, Clone)]
pub struct TracingSink {
    /// The log level to use.
    level: Level,
}

impl Default for TracingSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl TracingSink {
    /// Creates a new tracing sink with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level tracing sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }

    /// Creates an info-level tracing sink.
    #[must_use]
    pub fn info() -> Self {
        Self::new(Level::INFO)
    }

    fn log_event(&self, event: &HostEvent) {
        let payload = serde_json::to_value(event).unwrap_or(serde_json::Value::Null);
        match self.level {
            Level::DEBUG => {
                debug!(
                    event = %event.kind(),
                    payload = %payload,
                    "host event: {}", event.kind()
                );
            }
            _ => {
                info!(
                    event = %event.kind(),
                    payload = %payload,
                    "host event: {}", event.kind()
                );
            }
        }
    }
}

impl LogSink for TracingSink {
    fn record(&self, event: &HostEvent) {
        self.log_event(event);
    }
}

/// A collecting sink for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: parking_lot::RwLock<Vec<HostEvent>>,
}

impl CollectingSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<HostEvent> {
        self.events.read().clone()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Returns events matching a kind tag.
    #[must_use]
    pub fn events_of_kind(&self, kind: &str) -> Vec<HostEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.kind() == kind)
            .cloned()
            .collect()
    }
}

impl LogSink for CollectingSink {
    fn record(&self, event: &HostEvent) {
        self.events.write().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_sink_emits_through_subscriber() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::TRACE)
            .with_test_writer()
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            TracingSink::default().record(&HostEvent::ServerStarted);
            TracingSink::debug().record(&HostEvent::ApplicationError {
                message: "boom".to_string(),
            });
        });
    }

    #[test]
    fn test_collecting_sink_records() {
        let sink = CollectingSink::new();
        assert!(sink.is_empty());

        sink.record(&HostEvent::ServerStarted);
        sink.record(&HostEvent::ConnectionReceived {
            peer: "10.0.0.1:4000".to_string(),
        });

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.events()[0], HostEvent::ServerStarted);
    }

    #[test]
    fn test_collecting_sink_filters_by_kind() {
        let sink = CollectingSink::new();
        sink.record(&HostEvent::ServerStarted);
        sink.record(&HostEvent::ServerStopped);
        sink.record(&HostEvent::ServerStarted);

        assert_eq!(sink.events_of_kind("server.started").len(), 2);
        assert_eq!(sink.events_of_kind("server.stopped").len(), 1);
    }

    #[test]
    fn test_collecting_sink_clear() {
        let sink = CollectingSink::new();
        sink.record(&HostEvent::ServerStarted);
        assert_eq!(sink.len(), 1);

        sink.clear();
        assert!(sink.is_empty());
    }
}
