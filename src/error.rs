//! Configuration error taxonomy.
//!
//! Everything in here indicates a programming or authoring mistake in how the
//! router was set up. These errors are loud on purpose: they are returned to
//! the caller and never swallowed by the dispatcher. Unmatched routes are not
//! errors and never show up here.

use std::fmt;
use std::path::PathBuf;

/// Error raised while configuring or driving a [`Dispatcher`](crate::dispatcher::Dispatcher).
#[derive(Debug)]
pub enum RouterError {
    /// A handler name did not resolve to a callable in the registry
    ///
    /// Raised by `set_not_found_named` and by table building when a leaf
    /// names a handler that was never registered.
    NotCallable {
        /// The name that failed to resolve
        name: String,
    },
    /// An authored route table entry is neither a handler name nor a nested table
    InvalidTableEntry {
        /// Slash-joined key path of the offending entry (e.g. `clients/list`)
        fragment: String,
        /// Short description of what was found instead
        found: &'static str,
    },
    /// Reading or parsing a route table file failed
    TableLoad {
        /// The file being loaded
        path: PathBuf,
        /// Underlying I/O or parse error
        source: anyhow::Error,
    },
    /// The file extension does not map to a known table format
    UnsupportedTableFormat {
        /// The file being loaded
        path: PathBuf,
    },
    /// More dispatch cycles were queued in one drain than the configured cap allows
    ///
    /// Usually a handler that unconditionally navigates on every visit.
    DispatchOverflow {
        /// The configured `max_cycles_per_drain`
        limit: usize,
    },
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::NotCallable { name } => {
                write!(f, "route configuration error: '{}' is not a registered handler", name)
            }
            RouterError::InvalidTableEntry { fragment, found } => {
                write!(
                    f,
                    "route configuration error: entry '{}' must be a handler name or a nested table, found {}",
                    fragment, found
                )
            }
            RouterError::TableLoad { path, source } => {
                write!(f, "failed to load route table {}: {}", path.display(), source)
            }
            RouterError::UnsupportedTableFormat { path } => {
                write!(
                    f,
                    "unsupported route table format for {} (expected .json, .yaml, .yml or .toml)",
                    path.display()
                )
            }
            RouterError::DispatchOverflow { limit } => {
                write!(
                    f,
                    "dispatch overflow: more than {} cycles queued in a single drain, pending triggers dropped",
                    limit
                )
            }
        }
    }
}

impl std::error::Error for RouterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouterError::TableLoad { source, .. } => Some(&**source),
            _ => None,
        }
    }
}
