//! # CLI Module
//!
//! Command-line tooling for authored route tables.
//!
//! ## Commands
//!
//! ### `inspect`
//!
//! List every entry in a table file and the fragments that reach a handler:
//!
//! ```bash
//! hashrouter inspect --table routes.yaml
//! ```
//!
//! ### `resolve`
//!
//! Resolve a single fragment and print the matched route, handler name and
//! positional arguments:
//!
//! ```bash
//! hashrouter resolve --table routes.yaml pages/45/foo
//! ```
//!
//! ### `simulate`
//!
//! Start a dispatcher over an in-memory host and replay navigation steps.
//! `@back` and `@forward` step through the internal history:
//!
//! ```bash
//! hashrouter simulate --table routes.yaml pages/1 about @back @forward
//! ```
//!
//! Every command accepts `--json`. The table path can also come from
//! `HASHR_TABLE`.

mod commands;


pub use commands::{
    execute, resolve_fragment, run_cli, simulate, Cli, Commands, ResolveReport, SimulationReport,
    Visit, BACK_TOKEN, FORWARD_TOKEN,
};
