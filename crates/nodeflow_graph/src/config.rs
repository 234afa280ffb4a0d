// SPDX-License-Identifier: MIT OR Apache-2.0
//! Engine configuration.
//!
//! Configuration is stored as RON:
//!
//! ```text
//! EngineConfig(
//!     max_exec_depth: 128,
//!     reject_exec_cycles: true,
//! )
//! ```
//!
//! Missing fields take their default values.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default maximum exec nesting depth
pub const DEFAULT_MAX_EXEC_DEPTH: usize = 256;

/// Default maximum node executions per pass
pub const DEFAULT_MAX_EXEC_STEPS: usize = 100_000;

/// Tunables for graph mutation and execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum depth of nested exec calls before a pass aborts
    pub max_exec_depth: usize,
    /// Maximum node executions in one pass
    pub max_exec_steps: usize,
    /// Reject exec connections that would close a cycle
    pub reject_exec_cycles: bool,
    /// Copy the source output into the target input when a data
    /// connection is added
    pub eager_connect_sync: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_exec_depth: DEFAULT_MAX_EXEC_DEPTH,
            max_exec_steps: DEFAULT_MAX_EXEC_STEPS,
            reject_exec_cycles: false,
            eager_connect_sync: true,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from a RON string
    pub fn from_ron(source: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(source)?)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ron(&content)?;
        tracing::debug!("Loaded engine config from {:?}", path);
        Ok(config)
    }

    /// Serialize to pretty RON
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default().struct_names(true);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }
}

/// Error loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid RON
    #[error("Failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serialization failed
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_exec_depth, DEFAULT_MAX_EXEC_DEPTH);
        assert!(!config.reject_exec_cycles);
        assert!(config.eager_connect_sync);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = EngineConfig::from_ron("(max_exec_depth: 8, reject_exec_cycles: true)").unwrap();
        assert_eq!(config.max_exec_depth, 8);
        assert!(config.reject_exec_cycles);
        assert_eq!(config.max_exec_steps, DEFAULT_MAX_EXEC_STEPS);
    }

    #[test]
    fn test_serialization() {
        let config = EngineConfig {
            max_exec_depth: 16,
            ..EngineConfig::default()
        };
        let ron_str = config.to_ron().unwrap();
        assert_eq!(EngineConfig::from_ron(&ron_str).unwrap(), config);
    }

    #[test]
    fn test_invalid_ron() {
        assert!(matches!(
            EngineConfig::from_ron("(max_exec_depth: \"deep\")"),
            Err(ConfigError::Parse(_))
        ));
    }
}
