//! Configuration management for petrocalc
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use petrocalc::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Processing endpoint: {}", config.processing.endpoint);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `PETROCALC__<section>__<key>`
//!
//! Examples:
//! - `PETROCALC__STORAGE__BUCKET=physicscalc`
//! - `PETROCALC__PROCESSING__ENDPOINT=https://calc.internal/api/v1/mloutput`
//! - `PETROCALC__DOWNLOAD__LINK_TTL=120s`
//!
//! S3 credentials are only read from `S3_ACCESS_KEY` / `S3_SECRET_KEY`
//! (or the AWS-style `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`).
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/petrocalc.toml`.
//! This can be overridden using the `PETROCALC_CONFIG` environment variable
//! or the `--config` flag.

mod models;
mod sources;
mod validation;

pub use crate::humanize::{ByteSize, HumanDuration};
pub use models::{
    ColumnConfig, Config, ConstantsPolicy, DownloadConfig, LimitsConfig, LogFormat,
    LoggingConfig, ProcessingConfig, StorageConfig, StorageProvider,
};
pub use validation::ValidationError;

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),

    #[error("Failed to render configuration: {0}")]
    RenderError(#[from] toml::ser::Error),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`PETROCALC__*`)
    /// 2. TOML file (default: `config/petrocalc.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if the file is malformed or validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(None)
    }

    /// Same as [`Config::load`] with an explicit file path taking precedence
    /// over `PETROCALC_CONFIG`.
    pub fn load_with(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = sources::load(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path, skipping environment secrets
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Effective configuration as TOML (secrets are never rendered)
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
