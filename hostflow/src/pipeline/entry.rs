//! The pipeline entry point invoked once per request.

use std::sync::Arc;

use super::middleware::{Environment, Middleware, Next};
use crate::errors::HostError;

/// The single callable produced by composing all registered middleware.
///
/// Built once per host start and immutable afterwards; every concurrently
/// processed request shares the same instance through an `Arc`, so no
/// per-request locking is needed to invoke it.
pub struct PipelineEntry {
    chain: Vec<Arc<dyn Middleware>>,
}

impl PipelineEntry {
    pub(crate) fn new(chain: Vec<Arc<dyn Middleware>>) -> Self {
        Self { chain }
    }

    /// Invokes the pipeline against a request environment.
    ///
    /// An entry point built from zero middleware completes without
    /// transformation.
    pub async fn invoke(&self, env: &mut Environment) -> Result<(), HostError> {
        Next { chain: &self.chain }.run(env).await
    }

    /// Returns the number of middleware composed into this entry point.
    #[must_use]
    pub fn middleware_count(&self) -> usize {
        self.chain.len()
    }
}

impl std::fmt::Debug for PipelineEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineEntry")
            .field("middleware_count", &self.middleware_count())
            .finish()
    }
}
