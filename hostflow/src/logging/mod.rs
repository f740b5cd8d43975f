//! Logging surface for the host.
//!
//! This module provides:
//! - The structured event model recorded by sinks
//! - The one-method sink capability trait with tracing-backed and
//!   collecting implementations
//! - The composite sink fanning each event out to all contained sinks
//! - The statistics sink aggregating server counters

mod composite;
mod event;
mod sink;
mod stats;

pub use composite::CompositeSink;
pub use event::HostEvent;
pub use sink::{CollectingSink, LogSink, TracingSink};
pub use stats::{StatsSink, StatsSnapshot};
