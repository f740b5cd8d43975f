//! Statistics sink aggregating server counters.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::event::HostEvent;
use super::sink::LogSink;

/// A sink that aggregates host events into counters.
///
/// Enabled alongside any user-set sink; the host merges both into one
/// composite at start. Counters are lock-free; timing uses a mutex only on
/// the request-processed path.
#[derive(Debug, Default)]
pub struct StatsSink {
    connections_received: AtomicU64,
    connections_closed: AtomicU64,
    aborted_connections: AtomicU64,
    requests_processed: AtomicU64,
    application_errors: AtomicU64,
    total_request_time: Mutex<Duration>,
    started_at: RwLock<Option<DateTime<Utc>>>,
}

/// A point-in-time copy of the aggregated counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Connections accepted by the listener.
    pub connections_received: u64,
    /// Connections that ended, normally or not.
    pub connections_closed: u64,
    /// Connections torn down without a normal close.
    pub aborted_connections: u64,
    /// Requests that ran to completion through the pipeline.
    pub requests_processed: u64,
    /// Errors surfaced by the application pipeline.
    pub application_errors: u64,
    /// Total wall-clock time spent processing requests.
    pub total_request_time: Duration,
    /// When the listener started accepting, if it has.
    pub started_at: Option<DateTime<Utc>>,
}

impl StatsSink {
    /// Creates a new statistics sink with all counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the current counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            connections_received: self.connections_received.load(Ordering::Relaxed),
            connections_closed: self.connections_closed.load(Ordering::Relaxed),
            aborted_connections: self.aborted_connections.load(Ordering::Relaxed),
            requests_processed: self.requests_processed.load(Ordering::Relaxed),
            application_errors: self.application_errors.load(Ordering::Relaxed),
            total_request_time: *self.total_request_time.lock(),
            started_at: *self.started_at.read(),
        }
    }

    /// Returns the mean request processing time, if any request completed.
    #[must_use]
    pub fn average_request_time(&self) -> Option<Duration> {
        let processed = self.requests_processed.load(Ordering::Relaxed);
        if processed == 0 {
            return None;
        }
        let total = *self.total_request_time.lock();
        Some(total / u32::try_from(processed).unwrap_or(u32::MAX))
    }

    /// Returns how long the server has been accepting connections.
    #[must_use]
    pub fn uptime(&self) -> Option<chrono::Duration> {
        self.started_at.read().map(|started| Utc::now() - started)
    }
}

impl LogSink for StatsSink {
    fn record(&self, event: &HostEvent) {
        match event {
            HostEvent::ServerStarted => {
                *self.started_at.write() = Some(Utc::now());
            }
            HostEvent::ServerStopped => {}
            HostEvent::ConnectionReceived { .. } => {
                self.connections_received.fetch_add(1, Ordering::Relaxed);
            }
            HostEvent::ConnectionClosed { abrupt, .. } => {
                self.connections_closed.fetch_add(1, Ordering::Relaxed);
                if *abrupt {
                    self.aborted_connections.fetch_add(1, Ordering::Relaxed);
                }
            }
            HostEvent::RequestProcessed { elapsed } => {
                self.requests_processed.fetch_add(1, Ordering::Relaxed);
                *self.total_request_time.lock() += *elapsed;
            }
            HostEvent::ApplicationError { .. } => {
                self.application_errors.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}
