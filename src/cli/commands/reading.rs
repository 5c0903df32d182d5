//! Reading CLI commands.

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};

use crate::cli::output::{list_table, output, render_list, CommandOutput};
use crate::domain::models::{Config, NewReading, Reading, ReadingFilter};
use crate::infrastructure::AppContext;

/// Arguments for `vitals reading`.
#[derive(Args, Debug)]
pub struct ReadingArgs {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: ReadingCommands,
}

/// Reading subcommands.
#[derive(Subcommand, Debug)]
pub enum ReadingCommands {
    /// Record a blood pressure reading
    Add {
        /// Subject ID
        subject_id: i64,
        /// Systolic pressure (mmHg)
        systolic: i32,
        /// Diastolic pressure (mmHg)
        diastolic: i32,
        /// Heart rate (bpm)
        #[arg(long)]
        heart_rate: Option<i32>,
        /// Measurement time, RFC 3339 (defaults to now)
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// List readings, oldest first
    List {
        /// Only readings for this subject
        #[arg(short, long)]
        subject: Option<i64>,
    },
}

/// Result of `reading list`.
#[derive(Debug, serde::Serialize)]
pub struct ReadingListOutput {
    /// Readings listed
    pub readings: Vec<Reading>,
    /// Number of items listed
    pub total: usize,
}

impl CommandOutput for ReadingListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "subject", "recorded at", "bp", "hr"]);
        for reading in &self.readings {
            table.add_row(vec![
                reading.id.to_string(),
                reading.subject_id.to_string(),
                reading.recorded_at.format("%Y-%m-%d %H:%M").to_string(),
                format!("{}/{}", reading.systolic, reading.diastolic),
                reading.heart_rate.map_or_else(|| "-".to_string(), |hr| hr.to_string()),
            ]);
        }
        render_list("reading", &table, self.total)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Result of `reading add`.
#[derive(Debug, serde::Serialize)]
pub struct ReadingActionOutput {
    /// Whether the command succeeded
    pub success: bool,
    /// Summary line
    pub message: String,
    /// The stored reading
    pub reading: Reading,
}

impl CommandOutput for ReadingActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Run a `reading` subcommand.
pub async fn execute(args: ReadingArgs, config: &Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::from_config(config).await?;

    match args.command {
        ReadingCommands::Add {
            subject_id,
            systolic,
            diastolic,
            heart_rate,
            at,
        } => {
            let mut new_reading = NewReading::new(systolic, diastolic);
            new_reading.heart_rate = heart_rate;
            new_reading.recorded_at = at;

            let reading = ctx.records.add_reading(subject_id, new_reading).await?;
            let out = ReadingActionOutput {
                success: true,
                message: format!(
                    "Reading {} recorded for subject {}: {}/{}",
                    reading.id, reading.subject_id, reading.systolic, reading.diastolic
                ),
                reading,
            };
            output(&out, json_mode);
        }

        ReadingCommands::List { subject } => {
            let readings = ctx
                .records
                .list_readings(ReadingFilter { subject_id: subject })
                .await?;
            let out = ReadingListOutput {
                total: readings.len(),
                readings,
            };
            output(&out, json_mode);
        }
    }

    Ok(())
}
