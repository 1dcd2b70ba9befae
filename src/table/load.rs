use std::path::Path;

use anyhow::Context;
use serde_json::Value;
use tracing::{debug, info};

use super::build::build_table;
use crate::error::RouterError;
use crate::registry::HandlerRegistry;
use crate::router::RouteTable;

/// Authoring formats accepted for route tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Json,
    Yaml,
    Toml,
}

impl TableFormat {
    /// Pick the format from the file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(TableFormat::Json),
            "yaml" | "yml" => Some(TableFormat::Yaml),
            "toml" => Some(TableFormat::Toml),
            _ => None,
        }
    }

    /// Parse `content` in this format.
    pub fn parse(self, content: &str) -> anyhow::Result<Value> {
        let value: Value = match self {
            TableFormat::Json => serde_json::from_str(content).context("invalid JSON")?,
            TableFormat::Yaml => serde_yaml::from_str(content).context("invalid YAML")?,
            TableFormat::Toml => toml::from_str(content).context("invalid TOML")?,
        };
        Ok(value)
    }
}

/// Read and parse a route table file without binding handlers.
pub fn load_table_value(path: impl AsRef<Path>) -> Result<Value, RouterError> {
    let path = path.as_ref();
    let format = TableFormat::from_path(path).ok_or_else(|| RouterError::UnsupportedTableFormat {
        path: path.to_path_buf(),
    })?;

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))
        .map_err(|source| RouterError::TableLoad {
            path: path.to_path_buf(),
            source,
        })?;

    let value = format.parse(&content).map_err(|source| RouterError::TableLoad {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), format = ?format, "Route table file parsed");
    Ok(value)
}

/// Load a route table file and bind its handler names against `registry`.
pub fn load_table(
    path: impl AsRef<Path>,
    registry: &HandlerRegistry,
) -> Result<RouteTable, RouterError> {
    let path = path.as_ref();
    let value = load_table_value(path)?;
    let table = build_table(&value, registry)?;
    info!(
        path = %path.display(),
        routes_count = table.fragments().len(),
        has_not_found = table.not_found_handler().is_some(),
        "Route table loaded"
    );
    Ok(table)
}
