//! # hashrouter
//!
//! **hashrouter** is a fragment-identifier dispatch engine. Given the fragment
//! of a location (`#pages/45/foo`), it resolves a nested route table to a
//! single handler, runs a chain of pre-dispatch middleware, keeps an internal
//! navigation history separate from the host's native one, and falls back to a
//! not-found handler when nothing matches.
//!
//! ## Architecture
//!
//! - **[`path`]** - Splits a fragment into path segments
//! - **[`router`]** - Typed route tables and the recursive resolver
//! - **[`middleware`]** - The `Middleware` trait, the chain, and bundled middleware
//! - **[`history`]** - Internal history log with a cursor
//! - **[`dispatcher`]** - The router instance: one serialized dispatch cycle per fragment change
//! - **[`host`]** - The `Location` collaborator and an in-memory implementation
//! - **[`registry`]** and **[`table`]** - Route tables authored as JSON/YAML/TOML
//! - **[`runtime_config`]** and **[`logging`]** - Environment-driven configuration
//! - **[`cli`]** - The `hashrouter` command
//!
//! ### Dispatch Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host as Location
//!     participant D as Dispatcher
//!     participant H as HistoryTracker
//!     participant MW as MiddlewareChain
//!     participant R as resolve()
//!     participant F as Handler
//!
//!     Host->>D: fragment changed ("pages/45")
//!     D->>H: record("pages/45")
//!     D->>MW: run(ctx)
//!     MW-->>D: Ok / abort
//!     D->>R: resolve(["pages", "45"], table)
//!     R-->>D: Matched { route: "pages", args: ["45"] }
//!     D->>F: handler(ctx, ["45"])
//!     D->>MW: run_after(ctx, outcome, latency)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use hashrouter::{Dispatcher, MemoryLocation, RouteTable};
//!
//! let location = Arc::new(MemoryLocation::new(""));
//! let dispatcher = Dispatcher::new(location.clone());
//!
//! dispatcher.set_not_found_handler(|_ctx, args| eprintln!("no route for {:?}", args));
//! dispatcher.add_middleware_fn("log", |ctx| {
//!     println!("-> #{}", ctx.fragment());
//!     Ok(())
//! });
//!
//! let table = RouteTable::new()
//!     .index(|_ctx, _args| println!("home"))
//!     .route("pages", |_ctx, args| println!("page {:?}", args))
//!     .nest("clients", RouteTable::new().route("list", |_ctx, _args| println!("clients")));
//!
//! dispatcher.start(table).unwrap();
//! location.set_fragment("pages/45");
//! assert_eq!(dispatcher.history().entries(), ["", "pages/45"]);
//! ```
//!
//! ## Route Tables
//!
//! Each level maps segment names to handlers or nested tables. `_` is the index
//! handler of a level, reached when the next segment is missing or empty. `404`
//! at the top level is the not-found handler; it is pulled out by
//! [`Dispatcher::start`] and never matched as a segment. Matching is
//! depth-first with no backtracking: a miss inside a nested table is a miss.
//!
//! Leaf handlers receive the leftover segments as positional arguments, so
//! `pages/45/foo` against `{pages: f}` calls `f(ctx, ["45", "foo"])`.

pub mod cli;
pub mod dispatcher;
pub mod error;
pub mod history;
pub mod host;
pub mod ids;
pub mod logging;
pub mod middleware;
pub mod path;
pub mod registry;
pub mod router;
pub mod runtime_config;
pub mod table;

pub use dispatcher::{CycleOutcome, DispatchError, Dispatcher, NavigateOptions, RequestContext};
pub use error::RouterError;
pub use history::HistorySnapshot;
pub use host::{Location, MemoryLocation, NavigationMode};
pub use middleware::{Middleware, MiddlewareAbort};
pub use registry::HandlerRegistry;
pub use router::{Handler, RouteNode, RouteTable};
pub use runtime_config::RuntimeConfig;
pub use table::load_table;
