//! Test doubles for the host's collaborators.
//!
//! The listener contract is reproduced here so lifecycle behavior can be
//! exercised without sockets.

mod mocks;

pub use mocks::{MockListener, PanickingSink, RecordingMiddleware};
