//! Project initialization.
//!
//! Handles:
//! - Configuration directory creation
//! - Default config file creation
//! - Database creation and migrations

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::adapters::sqlite::{initialize_database, verify_connection};

/// Default configuration template content
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# vitals configuration
# Override settings by editing this file, adding .vitals/local.yaml, or
# setting environment variables with the VITALS_ prefix
#
# Example environment variables:
#   export VITALS_DATABASE__PATH=/custom/path/vitals.db
#   export VITALS_CACHE__TTL_SECS=60
#   export VITALS_LOGGING__LEVEL=debug

database:
  # Path to SQLite database file (project-local)
  path: ".vitals/vitals.db"

  # Maximum number of database connections in pool
  max_connections: 5

  # Upper bound on a single store round-trip
  query_timeout_ms: 5000

# Latest-reading aggregate cache
cache:
  # Disable to recompute the aggregate on every read
  enabled: true

  # Seconds a cached aggregate stays valid without an invalidating write
  ttl_secs: 300

  # Maximum number of cache entries
  max_capacity: 16

  # Upper bound on a single cache round-trip
  timeout_ms: 250

logging:
  # Log level: trace, debug, info, warn, error
  level: "info"

  # Log format: json, pretty
  format: "json"

  # Rolling log files are written here when set
  # log_dir: ".vitals/logs"

  # Rotation: daily, hourly, never
  rotation: "daily"

server:
  host: "127.0.0.1"
  port: 8000
  enable_cors: true
"#;

/// Setup paths and directories
#[derive(Debug, Clone)]
pub struct SetupPaths {
    /// Directory `init` was run in
    pub root: PathBuf,
    /// `<root>/.vitals`
    pub config_dir: PathBuf,
    /// `<root>/.vitals/config.yaml`
    pub config_file: PathBuf,
    /// `<root>/.vitals/vitals.db`
    pub database_file: PathBuf,
}

impl SetupPaths {
    /// Paths for a project rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let config_dir = root.join(".vitals");

        Self {
            config_file: config_dir.join("config.yaml"),
            database_file: config_dir.join("vitals.db"),
            config_dir,
            root,
        }
    }

    /// Paths for the current directory
    pub fn current() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(Self::new(current_dir))
    }

    /// Check if the project is already initialized
    pub fn is_initialized(&self) -> bool {
        self.config_file.exists() && self.database_file.exists()
    }
}

/// Create the configuration directory
pub fn create_config_dir(paths: &SetupPaths) -> Result<bool> {
    if paths.config_dir.exists() {
        return Ok(false);
    }

    fs::create_dir_all(&paths.config_dir).context("Failed to create config directory")?;
    Ok(true)
}

/// Create the default configuration file
pub fn create_config_file(paths: &SetupPaths, force: bool) -> Result<bool> {
    if paths.config_file.exists() && !force {
        return Ok(false);
    }

    fs::write(&paths.config_file, DEFAULT_CONFIG_TEMPLATE).context("Failed to write config file")?;
    Ok(true)
}

/// Create the database file if needed and apply embedded migrations
pub async fn run_migrations(paths: &SetupPaths) -> Result<()> {
    if let Some(parent) = paths.database_file.parent() {
        fs::create_dir_all(parent).context("Failed to create database directory")?;
    }

    let url = sqlite_url(&paths.database_file);
    let pool = initialize_database(&url, None)
        .await
        .with_context(|| format!("Failed to initialize database at {}", paths.database_file.display()))?;
    verify_connection(&pool)
        .await
        .with_context(|| format!("Database at {} is not usable", paths.database_file.display()))?;
    pool.close().await;
    Ok(())
}

fn sqlite_url(path: &Path) -> String {
    format!("sqlite:{}", path.display())
}
