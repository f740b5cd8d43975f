//! Protocol request decoration.
//!
//! The listener creates and destroys request objects; this module only
//! defines their shape and the injection hook that decorates each new
//! request with the pipeline entry point and the host's flush policy.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::errors::HostError;
use crate::listener::RecordHook;
use crate::pipeline::{Environment, PipelineEntry};

/// A wire record produced by the listener's framing layer.
///
/// Framing and parsing are the listener's concern; the host only sees the
/// record alongside the request it opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolRecord {
    /// The listener-assigned id of the request this record opened.
    pub request_id: u16,
}

/// Per-request state constructed by the listener and decorated by the host.
#[derive(Debug)]
pub struct ProtocolRequest {
    /// The listener-assigned request id.
    pub request_id: u16,
    /// The environment handed to the pipeline entry point.
    pub environment: Environment,
    /// Entry point attached by the injection hook; `None` until injected.
    pipeline_entry: Option<Arc<PipelineEntry>>,
    /// Whether partial output is flushed to the client periodically.
    flush_periodically: bool,
}

impl ProtocolRequest {
    /// Creates a request for a listener-assigned id.
    #[must_use]
    pub fn new(request_id: u16) -> Self {
        Self {
            request_id,
            environment: Environment::new(),
            pipeline_entry: None,
            flush_periodically: true,
        }
    }

    /// Returns the injected pipeline entry point, if any.
    #[must_use]
    pub fn pipeline_entry(&self) -> Option<&Arc<PipelineEntry>> {
        self.pipeline_entry.as_ref()
    }

    /// Returns the flush policy captured when this request was constructed.
    #[must_use]
    pub fn flush_periodically(&self) -> bool {
        self.flush_periodically
    }

    /// Runs the request environment through the injected entry point.
    pub async fn process(&mut self) -> Result<(), HostError> {
        let entry = self.pipeline_entry.clone().ok_or_else(|| {
            HostError::Internal("request processed before pipeline injection".to_string())
        })?;
        entry.invoke(&mut self.environment).await
    }
}

/// Attaches the pipeline entry point and flush policy to new requests.
///
/// Installed on the listener during start, strictly after the entry point
/// exists. `inject` runs on the listener's record-construction path: two
/// stores and one atomic load, nothing else.
pub struct RecordInjector {
    entry: Arc<PipelineEntry>,
    flush_periodically: Arc<AtomicBool>,
}

impl RecordInjector {
    pub(crate) fn new(entry: Arc<PipelineEntry>, flush_periodically: Arc<AtomicBool>) -> Self {
        Self {
            entry,
            flush_periodically,
        }
    }

    /// Decorates a freshly constructed request.
    ///
    /// The flush value the request observes is frozen here; later changes
    /// to the host's flag only affect requests constructed after them.
    pub fn inject(&self, request: &mut ProtocolRequest, _record: &ProtocolRecord) {
        request.pipeline_entry = Some(self.entry.clone());
        request.flush_periodically = self.flush_periodically.load(Ordering::Relaxed);
    }

    /// Wraps the injector into the hook shape the listener accepts.
    pub(crate) fn into_hook(self) -> RecordHook {
        Arc::new(move |request: &mut ProtocolRequest, record: &ProtocolRecord| {
            self.inject(request, record);
        })
    }
}

impl std::fmt::Debug for RecordInjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordInjector")
            .field("entry", &self.entry)
            .field(
                "flush_periodically",
                &self.flush_periodically.load(Ordering::Relaxed),
            )
            .finish()
    }
}
