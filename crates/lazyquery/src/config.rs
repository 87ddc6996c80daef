//! Container configuration.
//!
//! Configuration can be built in code or read from TOML:
//!
//! ```toml
//! batch_size = 100
//!
//! [property_defaults]
//! read_only = false
//! sortable = true
//! ```
//!
//! Missing keys fall back to their defaults.

use std::path::Path;

use lazyquery_core::logging::targets;
use lazyquery_core::{ContainerError, Result};
use serde::{Deserialize, Serialize};

/// Flags applied by `add_container_property` when the caller does not pass
/// them explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropertyDefaults {
    /// Whether new properties are read-only.
    pub read_only: bool,
    /// Whether new properties are sortable.
    pub sortable: bool,
}

impl Default for PropertyDefaults {
    fn default() -> Self {
        Self {
            read_only: true,
            sortable: false,
        }
    }
}

/// Settings for containers built on the default lazy view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LazyQueryConfig {
    /// Number of items fetched per batch. Must be positive.
    pub batch_size: usize,
    /// Flags for properties added without explicit flags.
    pub property_defaults: PropertyDefaults,
}

impl Default for LazyQueryConfig {
    fn default() -> Self {
        Self {
            batch_size: Self::DEFAULT_BATCH_SIZE,
            property_defaults: PropertyDefaults::default(),
        }
    }
}

impl LazyQueryConfig {
    /// Batch size used when none is configured.
    pub const DEFAULT_BATCH_SIZE: usize = 50;

    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets the property defaults.
    pub fn property_defaults(mut self, defaults: PropertyDefaults) -> Self {
        self.property_defaults = defaults;
        self
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ContainerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ContainerError::Config(format!("failed to read '{}': {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(
            target: targets::CONFIG,
            path = %path.display(),
            batch_size = config.batch_size,
            "loaded configuration"
        );
        Ok(config)
    }

    /// Serializes the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| ContainerError::Config(e.to_string()))
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ContainerError::Config("batch_size must be positive".into()));
        }
        Ok(())
    }
}
