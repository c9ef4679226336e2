//! Engine configuration via `facets.toml`
//!
//! Every field has a default, so an empty file (or no file at all) gives
//! the standard engine: views cached per (entity, contract) in a default
//! sized table.

use facets_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "facets.toml";

/// View engine configuration loaded from `facets.toml`.
///
/// # Example
///
/// ```toml
/// cache_views = true
/// initial_capacity = 1024
/// shard_amount = 16
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Cache generated views. When false every request builds a fresh view
    /// and the invalidation calls have nothing to clear.
    #[serde(default = "default_cache_views")]
    pub cache_views: bool,
    /// Initial capacity of the view table.
    #[serde(default)]
    pub initial_capacity: usize,
    /// Shard count of the view table; a power of two greater than 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard_amount: Option<usize>,
}

fn default_cache_views() -> bool {
    true
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            cache_views: default_cache_views(),
            initial_capacity: 0,
            shard_amount: None,
        }
    }
}

impl ViewConfig {
    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns `Config` if `shard_amount` is not a power of two greater than 1.
    pub fn validate(&self) -> Result<()> {
        if let Some(shards) = self.shard_amount {
            if shards <= 1 || !shards.is_power_of_two() {
                return Err(Error::config(format!(
                    "shard_amount must be a power of two greater than 1, got {}",
                    shards
                )));
            }
        }
        Ok(())
    }

    /// Parse and validate config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ViewConfig = toml::from_str(content)
            .map_err(|e| Error::config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Serialize this config to TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {}", e)))
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Facets view engine configuration
#
# Cache generated views per (entity, contract) (default: true).
# When false, every request builds a fresh view.
cache_views = true

# Initial capacity of the view table (default: 0).
initial_capacity = 0

# Shard count of the view table; must be a power of two greater than 1.
# Defaults to a value derived from the number of CPUs.
# shard_amount = 16
"#
    }
}
