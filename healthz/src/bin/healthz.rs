use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

use healthz::{config::Config, observability::init_tracing, service_builder::ServiceBuilder};

/// Serve aggregated PostgreSQL and Redis health at /healthz
#[derive(Debug, Parser)]
#[command(name = "healthz", version, about)]
struct Cli {
    /// Configuration file (skips the default search path)
    #[arg(short, long, env = "HEALTHZ_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listening port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Config::load().context("failed to load configuration")?,
    };
    if let Some(port) = cli.port {
        config.service.port = port;
    }

    init_tracing(&config)?;

    let service = ServiceBuilder::new()
        .with_config(config)
        .build()
        .await
        .context("failed to build health service")?;

    service.serve().await?;

    Ok(())
}
