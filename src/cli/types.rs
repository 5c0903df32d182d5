//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::{
    init::InitArgs, reading::ReadingArgs, seed::SeedArgs, serve::ServeArgs, stats::StatsArgs,
    subject::SubjectArgs,
};

/// Command-line entry point.
#[derive(Parser, Debug)]
#[command(name = "vitals")]
#[command(about = "vitals - blood pressure readings with a cached latest-per-subject view", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .vitals/config.yaml plus overrides)
    #[arg(short, long, global = true, env = "VITALS_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize vitals configuration and database
    Init(InitArgs),

    /// Subject management commands
    Subject(SubjectArgs),

    /// Reading management commands
    Reading(ReadingArgs),

    /// Aggregated statistics
    Stats(StatsArgs),

    /// Populate an empty store with demo data
    Seed(SeedArgs),

    /// Run the HTTP API
    Serve(ServeArgs),
}
