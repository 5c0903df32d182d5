//! vitals CLI entry point.

use anyhow::Context;
use clap::Parser;

use vitals::cli::{commands, Cli, Commands};
use vitals::infrastructure::logging::LoggerImpl;
use vitals::ConfigLoader;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli.command, cli.config.as_deref(), cli.json).await {
        vitals::cli::handle_error(err, cli.json);
    }
}

async fn run(command: Commands, config_path: Option<&std::path::Path>, json: bool) -> anyhow::Result<()> {
    // `init` runs before a config file exists.
    if let Commands::Init(args) = command {
        return commands::init::execute(args, json).await;
    }

    let config = ConfigLoader::load_with(config_path).context("Failed to load configuration")?;
    let _logger = LoggerImpl::init(&config.logging)?;

    match command {
        Commands::Init(_) => Ok(()),
        Commands::Subject(args) => commands::subject::execute(args, &config, json).await,
        Commands::Reading(args) => commands::reading::execute(args, &config, json).await,
        Commands::Stats(args) => commands::stats::execute(args, &config, json).await,
        Commands::Seed(args) => commands::seed::execute(args, &config, json).await,
        Commands::Serve(args) => commands::serve::execute(args, &config).await,
    }
}
