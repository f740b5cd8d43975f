//! Pipeline builder bound to the host's shutdown signal.

use std::sync::Arc;

use super::entry::PipelineEntry;
use super::middleware::Middleware;
use crate::shutdown::ShutdownSignal;

/// The configuration callback supplied at host construction.
///
/// Invoked once per successful start: builder in, finalized builder out.
/// The callback keeps no hidden mutable state beyond what it explicitly
/// closes over; a failure aborts the start before the listener is touched.
pub type Configure =
    Box<dyn FnMut(PipelineBuilder) -> Result<PipelineBuilder, anyhow::Error> + Send>;

/// Builder that a configuration callback registers middleware against.
///
/// Carries the host's shutdown signal so middleware can observe teardown,
/// and materializes the registered chain into a single immutable
/// [`PipelineEntry`].
pub struct PipelineBuilder {
    /// The host's shutdown signal, observable by middleware.
    shutdown: Arc<ShutdownSignal>,
    /// Registered middleware in invocation order.
    chain: Vec<Arc<dyn Middleware>>,
}

impl PipelineBuilder {
    /// Creates a builder bound to a shutdown signal.
    #[must_use]
    pub fn new(shutdown: Arc<ShutdownSignal>) -> Self {
        Self {
            shutdown,
            chain: Vec::new(),
        }
    }

    /// Returns the shutdown signal for middleware to observe.
    #[must_use]
    pub fn shutdown(&self) -> &Arc<ShutdownSignal> {
        &self.shutdown
    }

    /// Registers a middleware at the end of the chain.
    ///
    /// Middleware run in registration order; the first registered is the
    /// outermost.
    #[must_use]
    pub fn wrap(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.chain.push(middleware);
        self
    }

    /// Returns the number of registered middleware.
    #[must_use]
    pub fn middleware_count(&self) -> usize {
        self.chain.len()
    }

    /// Materializes the entry point from the registered chain.
    ///
    /// An empty chain produces a valid identity entry point.
    #[must_use]
    pub fn build(self) -> PipelineEntry {
        PipelineEntry::new(self.chain)
    }
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("middleware_count", &self.middleware_count())
            .field("shutdown", &self.shutdown)
            .finish()
    }
}
