//! Error types for the hostflow crate.
//!
//! Failures during `start` propagate synchronously to the caller; logging
//! failures are isolated per sink and never surface here. No operation in
//! this crate retries automatically.

use thiserror::Error;

use crate::host::HostState;

/// The main error type for host lifecycle operations.
#[derive(Debug, Error)]
pub enum HostError {
    /// The user configuration callback failed while building the pipeline.
    #[error("configuration failed: {0}")]
    Configuration(#[source] anyhow::Error),

    /// A lifecycle operation was invoked in a state that forbids it.
    #[error("{0}")]
    Lifecycle(#[from] LifecycleError),

    /// A middleware rejected the request.
    #[error("pipeline error: {0}")]
    Pipeline(String),

    /// The listener failed with an IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A generic internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Error raised when a lifecycle operation is rejected.
///
/// Carries the operation that was attempted and the state the host was in,
/// so callers can distinguish a restart attempt from a late `set_logger`.
#[derive(Debug, Clone, Error)]
#[error("{operation} rejected in state {state:?}: {message}")]
pub struct LifecycleError {
    /// The operation that was rejected.
    pub operation: &'static str,
    /// The state the host was in when the operation was attempted.
    pub state: HostState,
    /// The error message.
    pub message: String,
}

impl LifecycleError {
    /// Creates a new lifecycle error.
    #[must_use]
    pub fn new(operation: &'static str, state: HostState, message: impl Into<String>) -> Self {
        Self {
            operation,
            state,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_error_display() {
        let err = LifecycleError::new("start", HostState::Stopped, "host is not restartable");
        let text = err.to_string();
        assert!(text.contains("start"));
        assert!(text.contains("Stopped"));
        assert!(text.contains("not restartable"));
    }

    #[test]
    fn test_lifecycle_error_converts_to_host_error() {
        let err: HostError =
            LifecycleError::new("set_logger", HostState::Started, "logger already assembled")
                .into();
        assert!(matches!(err, HostError::Lifecycle(_)));
    }

    #[test]
    fn test_configuration_error_preserves_source() {
        let err = HostError::Configuration(anyhow::anyhow!("bad middleware"));
        assert!(err.to_string().contains("bad middleware"));
    }
}
