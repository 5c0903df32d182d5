//! Implementation of the `vitals seed` command.

use anyhow::Result;
use clap::Args;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::AppContext;
use crate::services::{seed_demo_data, SeedReport};

/// Arguments for `vitals seed`.
#[derive(Args, Debug)]
pub struct SeedArgs {}

impl CommandOutput for SeedReport {
    fn to_human(&self) -> String {
        if self.skipped() {
            "Store already has subjects; nothing seeded.".to_string()
        } else {
            format!(
                "Seeded {} subject(s) and {} reading(s).",
                self.subjects_created, self.readings_created
            )
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Seed demo data into an empty store.
pub async fn execute(_args: SeedArgs, config: &Config, json_mode: bool) -> Result<()> {
    let ctx = AppContext::from_config(config).await?;
    let report = seed_demo_data(&ctx.records).await?;
    output(&report, json_mode);
    Ok(())
}
