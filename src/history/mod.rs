//! # History Module
//!
//! The router keeps its own log of visited fragments, independent of whatever
//! native history the host maintains.
//!
//! ## Overview
//!
//! - Every dispatch cycle records the fragment that triggered it, before
//!   middleware runs.
//! - The log is append-only. Stepping back and forward moves a cursor; it never
//!   truncates or branches.
//! - The cursor is clamped at both ends. `back` at index 0 and `forward` at the
//!   last index are no-ops.
//! - A fragment reached by stepping is a re-visit. The tracker remembers the
//!   pending re-visit so the dispatch triggered by that navigation does not
//!   append a duplicate entry, which keeps back/forward loops from growing
//!   the log.
//!
//! Request contexts receive a [`HistorySnapshot`], an owned copy that later
//! navigation cannot change.

mod core;

pub use core::{HistorySnapshot, HistoryTracker, RecordOutcome};
