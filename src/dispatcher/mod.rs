//! # Dispatcher Module
//!
//! The dispatcher is the router instance. It owns every piece of state that
//! a routing session needs (internal history, middleware chain, not-found
//! handler, error handler, routing flag and pending-dispatch queue) and runs
//! one dispatch cycle per fragment change.
//!
//! ## Dispatch cycle
//!
//! 1. Extract path segments from the fragment (or the host's current fragment).
//! 2. Record the raw fragment in the history, unless it is the target of a
//!    back/forward step.
//! 3. Build a [`RequestContext`] holding the cycle id, timestamp, path and a
//!    history snapshot.
//! 4. Run the middleware chain. An abort goes to the error handler and ends the
//!    cycle.
//! 5. Resolve the path against the route table.
//! 6. On a match, fill in `route` and `parameters` and call the handler with
//!    the leftover segments.
//! 7. On a miss, call the not-found handler with the failing fragment.
//!
//! ## Serialization
//!
//! Cycles never interleave. A trigger that arrives while a cycle is running
//! (typically a handler calling [`RequestContext::go`]) is queued and runs
//! after the current cycle finishes, on the same thread. A drain that exceeds
//! `max_cycles_per_drain` stops with
//! [`RouterError::DispatchOverflow`](crate::error::RouterError::DispatchOverflow).
//!
//! ## Error handling
//!
//! - Middleware aborts and handler panics are [`DispatchError`]s. They go to the
//!   handler set with [`Dispatcher::set_error_handler`], or are logged at
//!   `warn` when none is set.
//! - Configuration mistakes are [`RouterError`](crate::error::RouterError)s,
//!   returned to the caller.
//! - An unmatched route is normal control flow. Without a not-found handler
//!   nothing observable happens, so registering one is effectively required.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use hashrouter::dispatcher::Dispatcher;
//! use hashrouter::host::MemoryLocation;
//! use hashrouter::router::RouteTable;
//!
//! let location = Arc::new(MemoryLocation::new("pages/45"));
//! let dispatcher = Dispatcher::new(location.clone());
//!
//! let table = RouteTable::new()
//!     .index(|_ctx, _args| {})
//!     .route("pages", |ctx, args| {
//!         assert_eq!(ctx.route(), Some("pages"));
//!         assert_eq!(args, ["45"]);
//!     });
//!
//! dispatcher.start(table).unwrap();
//! assert!(dispatcher.is_routing());
//! assert_eq!(dispatcher.history().entries(), ["pages/45"]);
//! ```

mod context;
mod core;

pub use context::{build_target, NavigateOptions, RequestContext};
pub use core::{CycleOutcome, DispatchError, Dispatcher, ErrorHandler};
