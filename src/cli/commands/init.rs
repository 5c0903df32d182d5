//! Implementation of the `vitals init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::cli::output::{output, CommandOutput};
use crate::infrastructure::setup::{create_config_dir, create_config_file, run_migrations, SetupPaths};

/// Arguments for `vitals init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config file with the defaults
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

/// Result of `vitals init`.
#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    /// Whether the command succeeded
    pub success: bool,
    /// Summary line
    pub message: String,
    /// Directory that was initialized
    pub initialized_path: PathBuf,
    /// Whether config.yaml was (re)written
    pub config_written: bool,
    /// Whether migrations ran
    pub database_initialized: bool,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![self.message.clone()];
        if self.config_written {
            lines.push("\nWrote default configuration to .vitals/config.yaml".to_string());
        }
        if self.database_initialized {
            lines.push("Database initialized at .vitals/vitals.db".to_string());
        }
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Create the config directory, config file and database.
pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(&args.path)
    };

    let paths = SetupPaths::new(&target_path);

    if paths.is_initialized() && !args.force {
        let out = InitOutput {
            success: false,
            message: "Project already initialized. Use --force to rewrite the default config.".to_string(),
            initialized_path: target_path,
            config_written: false,
            database_initialized: false,
        };
        output(&out, json_mode);
        return Ok(());
    }

    create_config_dir(&paths)?;
    let config_written = create_config_file(&paths, args.force)?;
    run_migrations(&paths).await?;

    let out = InitOutput {
        success: true,
        message: format!("Initialized vitals project in {}", target_path.display()),
        initialized_path: target_path,
        config_written,
        database_initialized: true,
    };
    output(&out, json_mode);
    Ok(())
}
