//! # Route Table Module
//!
//! Authored route tables: nested JSON, YAML or TOML mappings whose leaves are
//! handler names.
//!
//! ```yaml
//! _: home
//! "404": not_found
//! pages: show_page
//! clients:
//!   _: client_index
//!   list: client_list
//! ```
//!
//! Loading happens in two steps:
//!
//! 1. [`load_table_value`] reads the file and parses it according to its
//!    extension (`.json`, `.yaml`/`.yml`, `.toml`) into a `serde_json::Value`.
//! 2. [`build_table`] walks that value and binds every leaf to a handler from a
//!    [`HandlerRegistry`](crate::registry::HandlerRegistry).
//!
//! [`load_table`] does both. Unknown handler names fail with
//! [`RouterError::NotCallable`](crate::error::RouterError::NotCallable); any
//! entry that is neither a string nor a mapping fails with
//! [`RouterError::InvalidTableEntry`](crate::error::RouterError::InvalidTableEntry)
//! naming the key path.

mod build;
mod load;

pub use build::{build_table, build_table_with, list_entries, TableEntry};
pub use load::{load_table, load_table_value, TableFormat};
