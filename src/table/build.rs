use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::error::RouterError;
use crate::registry::HandlerRegistry;
use crate::router::{Handler, RouteNode, RouteTable, NOT_FOUND_KEY, ROOT_KEY};

/// One authored leaf: the key path it sits at and the handler name it binds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableEntry {
    /// Slash-joined key path, e.g. `clients/_` or `404`
    pub key_path: String,
    pub handler: String,
}

/// Build a [`RouteTable`] from a parsed table, resolving names against `registry`.
pub fn build_table(value: &Value, registry: &HandlerRegistry) -> Result<RouteTable, RouterError> {
    build_table_with(value, |name| registry.handler(name))
}

/// Build a [`RouteTable`] with a custom name lookup.
///
/// `lookup` returning `None` fails the build with [`RouterError::NotCallable`].
pub fn build_table_with<F>(value: &Value, lookup: F) -> Result<RouteTable, RouterError>
where
    F: Fn(&str) -> Option<Handler>,
{
    build_level(value, "", &lookup)
}

fn build_level<F>(value: &Value, prefix: &str, lookup: &F) -> Result<RouteTable, RouterError>
where
    F: Fn(&str) -> Option<Handler>,
{
    let Value::Object(map) = value else {
        return Err(RouterError::InvalidTableEntry {
            fragment: display_path(prefix),
            found: kind_of(value),
        });
    };

    let mut table = RouteTable::new();
    for (key, entry) in map {
        let key_path = join(prefix, key);
        if key == NOT_FOUND_KEY && !prefix.is_empty() {
            warn!(key_path = %key_path, "Not-found handler below the top level is ignored");
            continue;
        }
        let node = match entry {
            Value::String(name) => {
                let handler = lookup(name).ok_or_else(|| RouterError::NotCallable {
                    name: name.clone(),
                })?;
                RouteNode::Handler(handler)
            }
            Value::Object(_) => RouteNode::Table(build_level(entry, &key_path, lookup)?),
            other => {
                return Err(RouterError::InvalidTableEntry {
                    fragment: key_path,
                    found: kind_of(other),
                })
            }
        };
        table.insert(key, node);
    }
    Ok(table)
}

/// Flatten a parsed table into its leaves, in key order.
///
/// Validates the same shape rules as [`build_table`] without needing handlers.
pub fn list_entries(value: &Value) -> Result<Vec<TableEntry>, RouterError> {
    let mut out = Vec::new();
    collect_entries(value, "", &mut out)?;
    Ok(out)
}

fn collect_entries(
    value: &Value,
    prefix: &str,
    out: &mut Vec<TableEntry>,
) -> Result<(), RouterError> {
    let Value::Object(map) = value else {
        return Err(RouterError::InvalidTableEntry {
            fragment: display_path(prefix),
            found: kind_of(value),
        });
    };

    for (key, entry) in map {
        let key_path = join(prefix, key);
        match entry {
            Value::String(name) => out.push(TableEntry {
                key_path,
                handler: name.clone(),
            }),
            Value::Object(_) => collect_entries(entry, &key_path, out)?,
            other => {
                return Err(RouterError::InvalidTableEntry {
                    fragment: key_path,
                    found: kind_of(other),
                })
            }
        }
    }
    Ok(())
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}/{key}")
    }
}

fn display_path(prefix: &str) -> String {
    if prefix.is_empty() {
        ROOT_KEY.to_owned()
    } else {
        prefix.to_owned()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}
