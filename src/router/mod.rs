//! # Router Module
//!
//! The router module resolves a fragment's path segments against a nested
//! route table.
//!
//! ## Overview
//!
//! A [`RouteTable`] maps segment names to [`RouteNode`]s. A node is either a
//! handler (a leaf) or another table (an internal node). Two keys are
//! reserved:
//!
//! - `_` ([`ROOT_KEY`]) is the index handler of a table level, reached when the
//!   remaining path is empty or its next segment is the empty string.
//! - `404` ([`NOT_FOUND_KEY`]) is the not-found handler. It is stored apart from
//!   the routes and never matched as a literal segment. Only the top-level
//!   table's not-found handler is used.
//!
//! ## Resolution
//!
//! [`resolve`] is a depth-first, single-branch walk. The first segment picks an
//! entry; a handler entry ends the walk and receives the leftover segments as
//! positional arguments; a table entry recurses with the leftover segments.
//! There is no backtracking: once a table entry is chosen, a miss inside it
//! is a miss overall.
//!
//! ```text
//! {_: f0, pages: f1, clients: {_: g0, list: g1}}
//!
//! ""               -> f0()
//! "pages/45/foo"   -> f1("45", "foo")
//! "clients"        -> g0()
//! "clients/list"   -> g1()
//! "clients/nope"   -> not found
//! ```
//!
//! ## Example
//!
//! ```rust
//! use hashrouter::router::{Resolution, RouteTable, Router};
//!
//! let table = RouteTable::new()
//!     .index(|_ctx, _args| {})
//!     .route("pages", |_ctx, _args| {});
//! let router = Router::new(table);
//!
//! match router.route("pages/45") {
//!     Resolution::Matched { route, args, .. } => {
//!         assert_eq!(route, "pages");
//!         assert_eq!(args, vec!["45".to_string()]);
//!     }
//!     _ => panic!("expected a match"),
//! }
//! ```

mod core;

pub use core::{
    resolve, Handler, Resolution, RouteNode, RouteTable, Router, NOT_FOUND_KEY, ROOT_KEY,
};
