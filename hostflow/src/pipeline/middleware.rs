//! Middleware trait and request environment.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::HostError;

/// Per-request key-value environment handed through the middleware chain.
///
/// The listener seeds it from the protocol record; middleware read and
/// write it freely while the request is processed.
pub type Environment = HashMap<String, serde_json::Value>;

/// Trait for middleware participating in the request pipeline.
///
/// Each middleware receives the request environment and a continuation for
/// the rest of the chain. Not calling `next` short-circuits the request;
/// returning an error fails it.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Handles the request, delegating to `next` to run the remaining chain.
    async fn handle(&self, env: &mut Environment, next: Next<'_>) -> Result<(), HostError>;
}

/// Continuation invoking the remaining middleware chain.
pub struct Next<'a> {
    pub(crate) chain: &'a [Arc<dyn Middleware>],
}

impl Next<'_> {
    /// Runs the rest of the chain.
    ///
    /// An exhausted chain completes immediately, which is what makes an
    /// empty pipeline a valid identity pipeline.
    pub async fn run(self, env: &mut Environment) -> Result<(), HostError> {
        match self.chain.split_first() {
            Some((head, rest)) => head.handle(env, Next { chain: rest }).await,
            None => Ok(()),
        }
    }

    /// Returns the number of middleware remaining in the chain.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.chain.len()
    }
}
