//! Structured events recorded through the host's logging surface.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A structured event accepted by every logging sink.
///
/// The listener records connection-level events; request processing records
/// the rest. Sinks receive each event exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HostEvent {
    /// The listener began accepting connections.
    ServerStarted,
    /// The listener stopped accepting connections.
    ServerStopped,
    /// A connection was accepted.
    ConnectionReceived {
        /// Peer address as reported by the listener.
        peer: String,
    },
    /// A connection ended.
    ConnectionClosed {
        /// Peer address as reported by the listener.
        peer: String,
        /// Whether the connection was torn down without a normal close.
        abrupt: bool,
    },
    /// A request ran to completion through the pipeline.
    RequestProcessed {
        /// Wall-clock time the request spent in the pipeline.
        elapsed: Duration,
    },
    /// The application pipeline surfaced an error.
    ApplicationError {
        /// Rendered error message.
        message: String,
    },
}

impl HostEvent {
    /// Returns a stable kind tag for filtering and log keys.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ServerStarted => "server.started",
            Self::ServerStopped => "server.stopped",
            Self::ConnectionReceived { .. } => "connection.received",
            Self::ConnectionClosed { .. } => "connection.closed",
            Self::RequestProcessed { .. } => "request.processed",
            Self::ApplicationError { .. } => "application.error",
        }
    }
}
