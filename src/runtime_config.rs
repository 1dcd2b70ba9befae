//! # Runtime Configuration Module
//!
//! Environment variable-based configuration for the dispatcher.
//!
//! ## Environment Variables
//!
//! ### `HASHR_MAX_CYCLES`
//!
//! Maximum number of dispatch cycles a single drain may run before it gives
//! up with [`RouterError::DispatchOverflow`](crate::error::RouterError::DispatchOverflow).
//! A drain runs the triggering cycle plus every navigation queued by handlers
//! during it, so this bounds redirect loops. Accepts decimal (`64`) or
//! hexadecimal (`0x40`). Values below 1 are raised to 1.
//!
//! Default: `64`
//!
//! ### `HASHR_REVISIT_MODE`
//!
//! How `back()` / `forward()` write the host fragment: `replace` (default)
//! keeps the host's native history unchanged, `push` adds an entry.
//!
//! ## Usage
//!
//! ```rust
//! use hashrouter::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! assert!(config.max_cycles_per_drain >= 1);
//! ```

use std::env;

use tracing::warn;

use crate::host::NavigationMode;

/// Default for `HASHR_MAX_CYCLES`.
pub const DEFAULT_MAX_CYCLES: usize = 64;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Cycles one drain may run before overflowing (default: 64)
    pub max_cycles_per_drain: usize,
    /// Host navigation mode used by back/forward (default: replace)
    pub revisit_mode: NavigationMode,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_cycles_per_drain: DEFAULT_MAX_CYCLES,
            revisit_mode: NavigationMode::Replace,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    ///
    /// Unparseable values fall back to the defaults with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_cycles_per_drain = match env::var("HASHR_MAX_CYCLES") {
            Ok(val) => parse_count(&val).unwrap_or_else(|| {
                warn!(value = %val, default = DEFAULT_MAX_CYCLES, "Invalid HASHR_MAX_CYCLES");
                DEFAULT_MAX_CYCLES
            }),
            Err(_) => defaults.max_cycles_per_drain,
        };

        let revisit_mode = match env::var("HASHR_REVISIT_MODE") {
            Ok(val) => NavigationMode::parse(&val).unwrap_or_else(|| {
                warn!(value = %val, "Invalid HASHR_REVISIT_MODE, using replace");
                defaults.revisit_mode
            }),
            Err(_) => defaults.revisit_mode,
        };

        Self {
            max_cycles_per_drain: max_cycles_per_drain.max(1),
            revisit_mode,
        }
    }

    #[must_use]
    pub fn with_max_cycles(mut self, max: usize) -> Self {
        self.max_cycles_per_drain = max.max(1);
        self
    }

    #[must_use]
    pub fn with_revisit_mode(mut self, mode: NavigationMode) -> Self {
        self.revisit_mode = mode;
        self
    }
}

/// Parse a decimal or `0x`-prefixed hexadecimal count.
fn parse_count(val: &str) -> Option<usize> {
    let val = val.trim();
    if let Some(hex) = val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RuntimeConfig::default();
        assert_eq!(config.max_cycles_per_drain, 64);
        assert_eq!(config.revisit_mode, NavigationMode::Replace);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("128"), Some(128));
        assert_eq!(parse_count("0x40"), Some(64));
        assert_eq!(parse_count(" 0X10 "), Some(16));
        assert_eq!(parse_count("many"), None);
        assert_eq!(parse_count("0xzz"), None);
    }

    #[test]
    fn test_builders_clamp() {
        let config = RuntimeConfig::default()
            .with_max_cycles(0)
            .with_revisit_mode(NavigationMode::Push);
        assert_eq!(config.max_cycles_per_drain, 1);
        assert_eq!(config.revisit_mode, NavigationMode::Push);
    }
}
