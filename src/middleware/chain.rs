use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::{Middleware, MiddlewareAbort};
use crate::dispatcher::{CycleOutcome, RequestContext};

/// A middleware abort, tagged with the position that raised it.
#[derive(Debug, Clone)]
pub struct ChainAbort {
    /// Zero-based position in the chain
    pub index: usize,
    /// [`Middleware::name`] of the aborting middleware
    pub middleware: String,
    pub abort: MiddlewareAbort,
}

/// Ordered, append-only list of middleware.
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    middlewares: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mw: Arc<dyn Middleware>) {
        debug!(
            middleware = mw.name(),
            position = self.middlewares.len(),
            "Middleware registered"
        );
        self.middlewares.push(mw);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Middleware>> {
        self.middlewares.iter()
    }

    /// Run every `before` in order, stopping at the first abort.
    ///
    /// An empty chain completes immediately.
    pub fn run(&self, ctx: &RequestContext) -> Result<(), ChainAbort> {
        for (index, mw) in self.middlewares.iter().enumerate() {
            if let Err(abort) = mw.before(ctx) {
                warn!(
                    cycle_id = %ctx.id(),
                    middleware = mw.name(),
                    position = index,
                    reason = %abort,
                    "Middleware aborted dispatch cycle"
                );
                return Err(ChainAbort {
                    index,
                    middleware: mw.name().to_owned(),
                    abort,
                });
            }
        }
        Ok(())
    }

    /// Run `after` on the first `reached` middleware, in registration order.
    pub fn run_after(
        &self,
        reached: usize,
        ctx: &RequestContext,
        outcome: &CycleOutcome,
        latency: Duration,
    ) {
        for mw in self.middlewares.iter().take(reached) {
            mw.after(ctx, outcome, latency);
        }
    }
}
