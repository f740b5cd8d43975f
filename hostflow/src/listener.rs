//! Connection listener collaborator contract.
//!
//! The listener owns socket accept/read/write and record framing; the host
//! only drives its lifecycle and installs the logging sink and record hook.
//! Test doubles reproducing this contract live in [`crate::testing`].

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::HostError;
use crate::logging::LogSink;
use crate::request::{ProtocolRecord, ProtocolRequest};

/// Hook invoked by the listener the moment it finishes constructing a
/// request, before any application code sees it.
///
/// Runs synchronously on the task that constructed the request, exactly
/// once per request, and must not block.
pub type RecordHook = Arc<dyn Fn(&mut ProtocolRequest, &ProtocolRecord) + Send + Sync>;

/// Contract for the connection listener the host drives.
#[async_trait]
pub trait ConnectionListener: Send {
    /// Installs the logging sink events are recorded through.
    ///
    /// The host calls this at most once, during start, and only when at
    /// least one sink is configured.
    fn set_logger(&mut self, sink: Arc<dyn LogSink>);

    /// Installs the hook run once per constructed request.
    ///
    /// The host installs it during start, strictly after the pipeline entry
    /// point exists.
    fn set_record_hook(&mut self, hook: RecordHook);

    /// Begins accepting connections.
    ///
    /// With `background` set the call returns once the listener is ready to
    /// accept; otherwise it blocks until the listener stops.
    async fn start(&mut self, background: bool) -> Result<(), HostError>;

    /// Stops accepting new connections and closes open ones abruptly.
    ///
    /// There is no drain phase; in-flight requests are cut off.
    fn stop(&mut self);

    /// Releases listener resources. Idempotent.
    fn dispose(&mut self);
}
