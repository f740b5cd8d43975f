//! # Hostflow
//!
//! A lifecycle host bridging protocol connection listeners to middleware
//! pipelines.
//!
//! Hostflow owns the ordering and failure-safety guarantees around serving a
//! wire protocol through an application middleware chain:
//!
//! - **Pipeline construction**: a user configuration callback registers
//!   middleware against a builder, which materializes a single immutable
//!   entry point shared by every request
//! - **Logger assembly**: independent observability sinks (a user sink, a
//!   statistics sink) are merged into one fan-out logging surface
//! - **Record injection**: every protocol request constructed by the
//!   listener is decorated with the entry point and the host's flush policy
//!   before any application code sees it
//! - **Teardown**: a write-once shutdown signal broadcast to middleware,
//!   with idempotent stop and dispose
//!
//! Socket handling, record framing, and middleware execution semantics
//! belong to the collaborators; hostflow only wires them together.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hostflow::prelude::*;
//!
//! let mut host = Host::new(listener, |builder: PipelineBuilder| {
//!     Ok(builder.wrap(Arc::new(AuthMiddleware::new())))
//! });
//! host.set_logger(Arc::new(TracingSink::default()))?;
//! host.start(true).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod errors;
pub mod host;
pub mod listener;
pub mod logging;
pub mod pipeline;
pub mod request;
pub mod shutdown;
pub mod testing;

#[cfg(test)]
mod integration_tests;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::errors::{HostError, LifecycleError};
    pub use crate::host::{Host, HostState};
    pub use crate::listener::{ConnectionListener, RecordHook};
    pub use crate::logging::{
        CollectingSink, CompositeSink, HostEvent, LogSink, StatsSink, TracingSink,
    };
    pub use crate::pipeline::{
        Environment, Middleware, Next, PipelineBuilder, PipelineEntry,
    };
    pub use crate::request::{ProtocolRecord, ProtocolRequest, RecordInjector};
    pub use crate::shutdown::ShutdownSignal;
}
