//! # Middleware Module
//!
//! Middleware run once per dispatch cycle, in registration order, before the
//! route is resolved.
//!
//! ## Contract
//!
//! [`Middleware::before`] is the continuation: returning `Ok(())` hands control
//! to the next middleware, returning `Err(MiddlewareAbort)` ends the cycle.
//! Middleware N+1 never starts before middleware N has returned. After an
//! abort, later middleware and the route handler are never invoked and the
//! abort is delivered to the dispatcher's error handler.
//!
//! [`Middleware::after`] observes the finished cycle (handled, not found,
//! aborted or panicked) together with its latency. It is called only on
//! middleware whose `before` ran.
//!
//! ## Bundled middleware
//!
//! - [`TracingMiddleware`] - structured log line per cycle
//! - [`MetricsMiddleware`] - atomic counters for cycles, outcomes and latency
//! - [`GuardMiddleware`] - aborts cycles for protected top-level segments

mod chain;
mod core;
mod guard;
mod metrics;
mod tracing;

pub use chain::{ChainAbort, MiddlewareChain};
pub use core::{from_fn, FnMiddleware, Middleware, MiddlewareAbort};
pub use guard::GuardMiddleware;
pub use metrics::MetricsMiddleware;
pub use self::tracing::TracingMiddleware;
