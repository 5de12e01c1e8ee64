//! # healthz
//!
//! Aggregated dependency health for services backed by PostgreSQL and Redis.
//!
//! ## Features
//!
//! - **Probe registry**: named, tagged checks with per-probe timeouts
//! - **Concurrent aggregation**: all probes run in parallel, worst status wins
//! - **Stable wire format**: JSON report with per-dependency entries, 503 when unhealthy
//! - **Built-in probes**: PostgreSQL (`SELECT 1`) and Redis (`PING`) over lazy pools
//! - **Graceful shutdown**: Proper signal handling (SIGTERM, SIGINT)
//!
//! ## Example
//!
//! ```rust,no_run
//! use healthz::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     ServiceBuilder::new()
//!         .with_config(config)
//!         .build()
//!         .await?
//!         .serve()
//!         .await
//! }
//! ```

pub mod config;
pub mod error;
pub mod health;
pub mod observability;
pub mod ping;
pub mod pool_health;
pub mod server;
pub mod service_builder;
pub mod state;

#[cfg(feature = "database")]
pub mod database;

#[cfg(feature = "cache")]
pub mod cache;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, DatabaseConfig, HealthConfig, RedisConfig, ServiceConfig};
    pub use crate::error::{Error, Result};
    pub use crate::health::{
        healthz, routes, AggregateResult, Aggregator, BoxError, CheckReport, FnCheck, HealthCheck,
        HealthReport, HealthStatus, ProbeDescriptor, ProbeOutcome, ProbeRegistry,
    };
    pub use crate::observability::init_tracing;
    pub use crate::ping::{Ping, PingCheck};
    pub use crate::server::Server;
    pub use crate::service_builder::{HealthService, ServiceBuilder};
    pub use crate::state::HealthState;

    pub use async_trait::async_trait;
    pub use axum::Router;
}
