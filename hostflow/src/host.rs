//! Host lifecycle manager.
//!
//! The host owns the ordering guarantees around serving: the configuration
//! callback runs and the pipeline entry point exists before any logger is
//! installed, and both strictly precede the listener accepting its first
//! connection. Lifecycle operations are expected from a single controlling
//! task; the ordering is enforced by sequencing, not locking.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::errors::{HostError, LifecycleError};
use crate::listener::ConnectionListener;
use crate::logging::{CompositeSink, LogSink, StatsSink};
use crate::pipeline::{Configure, PipelineBuilder, PipelineEntry};
use crate::request::RecordInjector;
use crate::shutdown::ShutdownSignal;

/// Lifecycle states of a host.
///
/// `Stopped` and `Disposed` are terminal: a host is never restarted, and
/// its shutdown signal is never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    /// Constructed but not yet started.
    Created,
    /// The listener is accepting connections.
    Started,
    /// Stopped; terminal.
    Stopped,
    /// Disposed; terminal.
    Disposed,
}

/// The top-level lifecycle-managed instance bridging a listener to a
/// middleware pipeline.
pub struct Host<L: ConnectionListener> {
    listener: L,
    /// Retained until a start succeeds, so a failed configuration can be
    /// retried.
    configure: Option<Configure>,
    entry: Option<Arc<PipelineEntry>>,
    user_sink: Option<Arc<dyn LogSink>>,
    stats_sink: Option<Arc<StatsSink>>,
    flush_periodically: Arc<AtomicBool>,
    shutdown: Arc<ShutdownSignal>,
    state: HostState,
}

impl<L: ConnectionListener> Host<L> {
    /// Creates a host around a listener and a configuration callback.
    ///
    /// The callback registers middleware against the builder it receives
    /// and is invoked once per successful start.
    pub fn new<F>(listener: L, configure: F) -> Self
    where
        F: FnMut(PipelineBuilder) -> Result<PipelineBuilder, anyhow::Error> + Send + 'static,
    {
        Self {
            listener,
            configure: Some(Box::new(configure)),
            entry: None,
            user_sink: None,
            stats_sink: None,
            flush_periodically: Arc::new(AtomicBool::new(true)),
            shutdown: Arc::new(ShutdownSignal::new()),
            state: HostState::Created,
        }
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> HostState {
        self.state
    }

    /// Returns this host's shutdown signal.
    #[must_use]
    pub fn shutdown_signal(&self) -> &Arc<ShutdownSignal> {
        &self.shutdown
    }

    /// Returns the entry point built by the last successful start.
    #[must_use]
    pub fn pipeline_entry(&self) -> Option<&Arc<PipelineEntry>> {
        self.entry.as_ref()
    }

    /// Sets the user logging sink. Legal only before start; loggers are
    /// assembled once, when the host starts.
    pub fn set_logger(&mut self, sink: Arc<dyn LogSink>) -> Result<(), HostError> {
        if self.state != HostState::Created {
            return Err(LifecycleError::new(
                "set_logger",
                self.state,
                "loggers are assembled once, at start",
            )
            .into());
        }
        self.user_sink = Some(sink);
        Ok(())
    }

    /// Enables the statistics sink alongside any user-set sink and returns
    /// a handle for reading aggregates. Legal only before start; calling it
    /// again returns the same handle.
    pub fn enable_statistics(&mut self) -> Result<Arc<StatsSink>, HostError> {
        if self.state != HostState::Created {
            return Err(LifecycleError::new(
                "enable_statistics",
                self.state,
                "loggers are assembled once, at start",
            )
            .into());
        }
        let sink = self
            .stats_sink
            .get_or_insert_with(|| Arc::new(StatsSink::new()));
        Ok(sink.clone())
    }

    /// Sets whether the host flushes partial output to clients periodically.
    ///
    /// Requests capture the value at the moment they are constructed;
    /// changing it later only affects requests constructed afterwards.
    pub fn set_flush_periodically(&self, value: bool) {
        self.flush_periodically.store(value, Ordering::Relaxed);
    }

    /// Returns the current flush policy.
    #[must_use]
    pub fn flush_periodically(&self) -> bool {
        self.flush_periodically.load(Ordering::Relaxed)
    }

    /// Starts the host.
    ///
    /// Builds the pipeline from the configuration callback, assembles the
    /// composite logger from whichever sinks are present, installs the
    /// record hook, and only then delegates to the listener's start
    /// routine. With `background` set the call returns once the listener
    /// is accepting; otherwise it blocks until the listener stops.
    ///
    /// Any failure before the listener is started leaves the host in
    /// `Created`; a failed configuration may be retried.
    pub async fn start(&mut self, background: bool) -> Result<(), HostError> {
        if self.state != HostState::Created {
            return Err(LifecycleError::new(
                "start",
                self.state,
                "host is not restartable once started, stopped, or disposed",
            )
            .into());
        }
        let Some(configure) = self.configure.as_mut() else {
            return Err(LifecycleError::new(
                "start",
                self.state,
                "configuration was consumed by an earlier start attempt",
            )
            .into());
        };

        // The pipeline must exist before the logger is assembled and before
        // the listener can construct any request.
        let builder = PipelineBuilder::new(self.shutdown.clone());
        let builder = configure(builder).map_err(HostError::Configuration)?;
        let entry = Arc::new(builder.build());
        debug!(middleware_count = entry.middleware_count(), "pipeline built");
        self.entry = Some(entry.clone());
        self.configure = None;

        if let Some(logger) = self.build_logger() {
            self.listener.set_logger(logger);
        }

        let injector = RecordInjector::new(entry, self.flush_periodically.clone());
        self.listener.set_record_hook(injector.into_hook());

        self.listener.start(background).await?;
        self.state = HostState::Started;
        info!("host started");
        Ok(())
    }

    /// Stops the host.
    ///
    /// Notifies shutdown observers, releases the signal's resources, and
    /// tells the listener to stop accepting and to close open connections
    /// abruptly. No drain phase: in-flight requests are cut off. A no-op
    /// unless the host is started.
    pub fn stop(&mut self) {
        if self.state != HostState::Started {
            return;
        }
        self.shutdown.signal("host stopping");
        self.shutdown.release();
        self.listener.stop();
        self.state = HostState::Stopped;
        info!("host stopped");
    }

    /// Disposes the host, releasing the shutdown signal's resources and the
    /// listener's resources. Idempotent; without a preceding stop the
    /// release is silent, with no shutdown notification.
    pub fn dispose(&mut self) {
        if self.state == HostState::Disposed {
            return;
        }
        self.shutdown.release();
        self.listener.dispose();
        self.state = HostState::Disposed;
        debug!("host disposed");
    }

    /// Merges whichever sinks are present into one fan-out surface.
    ///
    /// With no sinks configured, returns `None` so the listener runs
    /// without a logger rather than through an empty composite.
    fn build_logger(&self) -> Option<Arc<dyn LogSink>> {
        if self.user_sink.is_none() && self.stats_sink.is_none() {
            return None;
        }
        let mut composite = CompositeSink::new();
        if let Some(user) = &self.user_sink {
            composite.add_sink(user.clone());
        }
        if let Some(stats) = &self.stats_sink {
            composite.add_sink(stats.clone());
        }
        Some(Arc::new(composite))
    }
}

impl<L: ConnectionListener> std::fmt::Debug for Host<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("state", &self.state)
            .field("entry", &self.entry)
            .field("has_user_sink", &self.user_sink.is_some())
            .field("statistics_enabled", &self.stats_sink.is_some())
            .field("flush_periodically", &self.flush_periodically())
            .finish()
    }
}
