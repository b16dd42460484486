// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Engine Configuration
//!
//! Settings that shape one distance computation:
//! - SQL dialect used to parse statements
//! - Directory receiving diagnostics dumps of failed evaluations
//! - Limit on nested subquery evaluation
//! - Whether drivers built from this configuration cache query results
//!
//! Configuration files are YAML or JSON; missing fields take their defaults.
//!
//! ## Example
//!
//! ```rust
//! use sqldist_engine::EngineConfig;
//! use sqldist_ir::Dialect;
//!
//! let config = EngineConfig::from_yaml_str("dialect: postgresql\nmax_subquery_depth: 4\n").unwrap();
//! assert_eq!(config.dialect, Dialect::PostgreSQL);
//! assert!(config.cache_queries);
//! config.validate().unwrap();
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sqldist_ir::Dialect;

/// Default limit on nested subquery evaluation
pub const DEFAULT_MAX_SUBQUERY_DEPTH: usize = 16;

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// SQL dialect
    pub dialect: Dialect,

    /// Where failed evaluations dump their state; no dumps when unset
    pub diagnostics_dir: Option<PathBuf>,

    /// Deepest subquery nesting evaluated before giving up on a branch
    pub max_subquery_depth: usize,

    /// Cache query results for the lifetime of a driver
    pub cache_queries: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::SQLite,
            diagnostics_dir: None,
            max_subquery_depth: DEFAULT_MAX_SUBQUERY_DEPTH,
            cache_queries: true,
        }
    }
}

impl EngineConfig {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Default::default()
        }
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_diagnostics_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.diagnostics_dir = Some(dir.into());
        self
    }

    pub fn with_max_subquery_depth(mut self, depth: usize) -> Self {
        self.max_subquery_depth = depth;
        self
    }

    pub fn with_cache_queries(mut self, enabled: bool) -> Self {
        self.cache_queries = enabled;
        self
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse {
            format: "YAML",
            message: e.to_string(),
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            format: "JSON",
            message: e.to_string(),
        })
    }

    /// Loads a configuration file: `.json` files as JSON, anything else as YAML
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Validate the configuration
    ///
    /// Checks that:
    /// - At least one level of subquery evaluation is allowed
    /// - The diagnostics directory, if it exists, is a directory
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_subquery_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_subquery_depth",
                reason: "must be > 0".to_string(),
            });
        }

        if let Some(dir) = &self.diagnostics_dir {
            if dir.exists() && !dir.is_dir() {
                return Err(ConfigError::InvalidValue {
                    field: "diagnostics_dir",
                    reason: format!("'{}' is not a directory", dir.display()),
                });
            }
        }

        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read configuration '{path}': {message}")]
    Io { path: String, message: String },

    /// The configuration text is malformed
    #[error("Invalid {format} configuration: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    /// A field holds an unusable value
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
