//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `hatchling-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror
//! the YAML structure and provides a loader that reads and validates the
//! file. Every field has a default matching the engine's reference
//! values, so an empty file (or no file) is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use hatchling_memory::NetworkConfig;
use hatchling_patterns::AnalyzerConfig;
use hatchling_survival::SurvivalConfig;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration for the creature engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Survival state machine tunables.
    pub survival: SurvivalConfig,

    /// Associative memory tunables.
    pub memory: NetworkConfig,

    /// Event analyzer tunables.
    pub patterns: AnalyzerConfig,

    /// Tick runner cadences.
    pub runner: RunnerConfig,
}

impl CoreConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yml::from_str(&contents)?)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Cadences for the async tick runner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Real-time milliseconds between ticks (default: 1000).
    pub tick_interval_ms: u64,

    /// Run a memory decay pass every N ticks (default: 10).
    pub decay_every_ticks: u64,

    /// Save a snapshot every N ticks (default: 60).
    pub snapshot_every_ticks: u64,

    /// Stop after this many ticks; 0 means run until cancelled
    /// (default: 0).
    pub max_ticks: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1_000,
            decay_every_ticks: 10,
            snapshot_every_ticks: 60,
            max_ticks: 0,
        }
    }
}
