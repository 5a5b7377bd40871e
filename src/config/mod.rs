//! Configuration management for linkcount
//!
//! Settings are layered from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Environment Variables
//!
//! Any key can be overridden with `LINKCOUNT__<section>__<key>`:
//! - `LINKCOUNT__SERVER__PORT=9000`
//! - `LINKCOUNT__FETCHER__TIMEOUT_MS=5000`
//! - `LINKCOUNT__TARGETS=https://a.example,https://b.example`
//!
//! # Configuration File
//!
//! Loaded from `config/linkcount.toml` unless `LINKCOUNT_CONFIG` points elsewhere.

mod models;
mod sources;
mod validation;

pub use crate::humanize::ByteSize;
pub use models::{AggregatorConfig, Config, FetcherConfig, ServerConfig};
pub use validation::ValidationError;

use thiserror::Error;

use crate::registry::TargetRegistry;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment) and validate it
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Build the immutable target registry from the configured list
    pub fn registry(&self) -> TargetRegistry {
        TargetRegistry::new(self.targets.iter().cloned())
    }
}
