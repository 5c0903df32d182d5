//! Implementation of the `vitals serve` command.

use anyhow::Result;
use clap::Args;

use crate::adapters::http::{HttpConfig, VitalsHttpServer};
use crate::domain::models::Config;
use crate::infrastructure::AppContext;
use crate::services::seed_demo_data;

/// Arguments for `vitals serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Host to bind to (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Seed demo data into an empty store before serving
    #[arg(long)]
    pub seed: bool,
}

/// Serve the HTTP API until ctrl-c.
pub async fn execute(args: ServeArgs, config: &Config) -> Result<()> {
    let ctx = AppContext::from_config(config).await?;

    if args.seed {
        seed_demo_data(&ctx.records).await?;
    }

    let mut http_config = HttpConfig::from(&config.server);
    if let Some(host) = args.host {
        http_config.host = host;
    }
    if let Some(port) = args.port {
        http_config.port = port;
    }

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
        tracing::info!("shutdown signal received");
    };

    VitalsHttpServer::new(ctx, http_config)
        .serve_with_shutdown(shutdown)
        .await
        .map_err(|e| anyhow::anyhow!("HTTP server failed: {e}"))
}
