//! Aggregate statistics commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::cli::output::{list_table, output, render_list, CommandOutput};
use crate::domain::models::{Config, LatestReadingRow};
use crate::infrastructure::AppContext;

/// Arguments for `vitals stats`.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: StatsCommands,
}

/// Statistics subcommands.
#[derive(Subcommand, Debug)]
pub enum StatsCommands {
    /// Most recent reading of every subject
    Latest,
}

/// Result of `stats latest`.
#[derive(Debug, serde::Serialize)]
pub struct LatestOutput {
    /// One row per subject, newest first
    pub rows: Vec<LatestReadingRow>,
}

impl CommandOutput for LatestOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["subject", "name", "bp", "hr", "timestamp"]);
        for row in &self.rows {
            table.add_row(vec![
                row.subject_id.to_string(),
                row.name.clone(),
                format!("{}/{}", row.systolic, row.diastolic),
                row.heart_rate.map_or_else(|| "-".to_string(), |hr| hr.to_string()),
                row.timestamp.to_rfc3339(),
            ]);
        }
        render_list("subject", &table, self.rows.len())
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.rows).unwrap_or_default()
    }
}

/// Run a `stats` subcommand.
pub async fn execute(args: StatsArgs, config: &Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::from_config(config).await?;

    match args.command {
        StatsCommands::Latest => {
            let rows = ctx
                .aggregate
                .latest_per_subject()
                .await
                .context("Failed to load latest readings")?;
            output(&LatestOutput { rows }, json_mode);
        }
    }

    Ok(())
}
