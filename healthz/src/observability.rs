//! Tracing initialisation

use tracing_subscriber::EnvFilter;

use crate::{config::Config, error::Result};

/// Install a JSON tracing subscriber filtered by `service.log_level`
///
/// Falls back to `info` when the level is not a valid filter directive.
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| crate::error::Error::Internal(format!("Failed to initialise tracing: {}", e)))?;

    tracing::info!("Tracing initialized for service: {}", config.service.name);

    Ok(())
}
