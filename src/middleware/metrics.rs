use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use super::{Middleware, MiddlewareAbort};
use crate::dispatcher::{CycleOutcome, RequestContext};

/// Middleware for collecting dispatch statistics
///
/// All counters use atomic operations, so a single instance can be shared
/// between dispatchers and read from anywhere.
///
/// Metrics collected:
/// - Total cycle count (incremented in `before`)
/// - Average latency, from `after`
/// - Handled, not-found, aborted and panicked outcome counts
#[derive(Default)]
pub struct MetricsMiddleware {
    cycle_count: AtomicUsize,
    completed: AtomicUsize,
    total_latency_ns: AtomicU64,
    handled: AtomicUsize,
    not_found: AtomicUsize,
    aborted: AtomicUsize,
    panicked: AtomicUsize,
}

impl MetricsMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cycles that reached this middleware
    pub fn cycle_count(&self) -> usize {
        self.cycle_count.load(Ordering::Relaxed)
    }

    /// Mean cycle latency, zero before the first completed cycle.
    pub fn average_latency(&self) -> Duration {
        let count = self.completed.load(Ordering::Relaxed) as u64;
        if count == 0 {
            Duration::from_nanos(0)
        } else {
            Duration::from_nanos(self.total_latency_ns.load(Ordering::Relaxed) / count)
        }
    }

    pub fn handled_count(&self) -> usize {
        self.handled.load(Ordering::Relaxed)
    }

    pub fn not_found_count(&self) -> usize {
        self.not_found.load(Ordering::Relaxed)
    }

    pub fn aborted_count(&self) -> usize {
        self.aborted.load(Ordering::Relaxed)
    }

    pub fn panicked_count(&self) -> usize {
        self.panicked.load(Ordering::Relaxed)
    }
}

impl Middleware for MetricsMiddleware {
    fn before(&self, _ctx: &RequestContext) -> Result<(), MiddlewareAbort> {
        self.cycle_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn after(&self, _ctx: &RequestContext, outcome: &CycleOutcome, latency: Duration) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
        let counter = match outcome {
            CycleOutcome::Handled { .. } => &self.handled,
            CycleOutcome::NotFound => &self.not_found,
            CycleOutcome::Aborted { .. } => &self.aborted,
            CycleOutcome::Panicked { .. } => &self.panicked,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn name(&self) -> &str {
        "metrics"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_cycles() {
        let metrics = MetricsMiddleware::new();
        assert_eq!(metrics.cycle_count(), 0);
        assert_eq!(metrics.average_latency(), Duration::from_nanos(0));
    }

    #[test]
    fn test_counts_outcomes() {
        let metrics = MetricsMiddleware::new();
        let ctx = RequestContext::detached("pages/1");
        for outcome in [
            CycleOutcome::Handled {
                route: "pages".to_string(),
            },
            CycleOutcome::NotFound,
            CycleOutcome::NotFound,
        ] {
            metrics.before(&ctx).unwrap();
            metrics.after(&ctx, &outcome, Duration::from_micros(10));
        }
        assert_eq!(metrics.cycle_count(), 3);
        assert_eq!(metrics.handled_count(), 1);
        assert_eq!(metrics.not_found_count(), 2);
        assert_eq!(metrics.aborted_count(), 0);
        assert_eq!(metrics.average_latency(), Duration::from_micros(10));
    }
}
