use std::time::Duration;

use tracing::{debug, info};

use super::{Middleware, MiddlewareAbort};
use crate::dispatcher::{CycleOutcome, RequestContext};

/// Emits one structured log line when a cycle starts and one when it ends.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn before(&self, ctx: &RequestContext) -> Result<(), MiddlewareAbort> {
        debug!(
            cycle_id = %ctx.id(),
            fragment = %ctx.fragment(),
            segments = ctx.path().len(),
            history_len = ctx.history().len(),
            "Dispatch cycle start"
        );
        Ok(())
    }

    fn after(&self, ctx: &RequestContext, outcome: &CycleOutcome, latency: Duration) {
        info!(
            cycle_id = %ctx.id(),
            fragment = %ctx.fragment(),
            route = ctx.route().unwrap_or("-"),
            outcome = %outcome,
            latency_us = latency.as_micros() as u64,
            "Dispatch cycle complete"
        );
    }

    fn name(&self) -> &str {
        "tracing"
    }
}
