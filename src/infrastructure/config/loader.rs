//! Layered config loading and validation.

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project configuration file, created by `vitals init`.
pub const PROJECT_CONFIG_PATH: &str = ".vitals/config.yaml";

/// Optional local overrides, not meant to be committed.
pub const LOCAL_CONFIG_PATH: &str = ".vitals/local.yaml";

/// Prefix for environment overrides; nested keys use `__`.
pub const ENV_PREFIX: &str = "VITALS_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `logging.level` is not a tracing level.
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// `database.path` is empty.
    #[error("Database path cannot be empty")]
    EmptyDatabasePath,

    /// `database.max_connections` is zero.
    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    /// `database.query_timeout_ms` is zero.
    #[error("Invalid query_timeout_ms: {0}. Must be at least 1")]
    InvalidQueryTimeout(u64),

    /// `cache.ttl_secs` is zero.
    #[error("Invalid cache ttl_secs: {0}. Must be at least 1")]
    InvalidCacheTtl(u64),

    /// `cache.max_capacity` is zero.
    #[error("Invalid cache max_capacity: {0}. Must be at least 1")]
    InvalidCacheCapacity(u64),

    /// `cache.timeout_ms` is zero.
    #[error("Invalid cache timeout_ms: {0}. Must be at least 1")]
    InvalidCacheTimeout(u64),

    /// `server.host` is empty.
    #[error("Server host cannot be empty")]
    EmptyServerHost,
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .vitals/config.yaml (project config, created by init)
    /// 3. .vitals/local.yaml (project local overrides, optional)
    /// 4. Environment variables (VITALS_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Self::figment()
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring env overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load from an explicit file when given, otherwise the project hierarchy
    pub fn load_with(path: Option<&Path>) -> Result<Config> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Self::load(),
        }
    }

    /// The merged provider chain used by [`ConfigLoader::load`]
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(PROJECT_CONFIG_PATH))
            .merge(Yaml::file(LOCAL_CONFIG_PATH))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.database.path.is_empty() {
            return Err(ConfigError::EmptyDatabasePath);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(config.database.max_connections));
        }

        if config.database.query_timeout_ms == 0 {
            return Err(ConfigError::InvalidQueryTimeout(config.database.query_timeout_ms));
        }

        if config.cache.ttl_secs == 0 {
            return Err(ConfigError::InvalidCacheTtl(config.cache.ttl_secs));
        }

        if config.cache.max_capacity == 0 {
            return Err(ConfigError::InvalidCacheCapacity(config.cache.max_capacity));
        }

        if config.cache.timeout_ms == 0 {
            return Err(ConfigError::InvalidCacheTimeout(config.cache.timeout_ms));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        if config.server.host.trim().is_empty() {
            return Err(ConfigError::EmptyServerHost);
        }

        Ok(())
    }
}
