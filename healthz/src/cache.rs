//! Redis connection pool and liveness probe

use async_trait::async_trait;
use deadpool_redis::{Config as DeadpoolConfig, Pool, PoolConfig, Runtime, Timeouts};
use serde_json::Value;
use std::ops::DerefMut;

use crate::{
    config::RedisConfig,
    error::Result,
    health::{BoxError, ProbeDescriptor},
    ping::{Ping, PingCheck},
    pool_health::RedisPoolHealth,
};

/// Create a Redis pool without connecting
///
/// Connections are opened on first use; only a malformed URL fails here.
pub fn create_pool(config: &RedisConfig) -> Result<Pool> {
    let mut cfg = DeadpoolConfig::from_url(&config.url);
    let mut pool_cfg = PoolConfig::new(config.max_connections);
    pool_cfg.timeouts = Timeouts {
        wait: Some(config.connection_timeout()),
        create: Some(config.connection_timeout()),
        recycle: Some(config.connection_timeout()),
    };
    cfg.pool = Some(pool_cfg);

    let pool = cfg.create_pool(Some(Runtime::Tokio1))?;

    tracing::info!(
        "Redis pool created: max_connections={}",
        config.max_connections
    );

    Ok(pool)
}

/// Build the Redis probe described by `config`
pub fn probe(pool: Pool, config: &RedisConfig) -> ProbeDescriptor {
    let mut check = PingCheck::new(pool);
    if let Some(threshold) = config.degraded_threshold() {
        check = check.degraded_after(threshold);
    }

    ProbeDescriptor::new(config.name.clone(), check)
        .with_tags(config.tags.iter().cloned())
        .with_timeout(config.timeout())
}

#[async_trait]
impl Ping for Pool {
    async fn ping(&self) -> std::result::Result<(), BoxError> {
        let mut conn = self.get().await?;
        redis::cmd("PING")
            .query_async::<String>(conn.deref_mut())
            .await?;
        Ok(())
    }

    fn diagnostics(&self) -> Vec<(String, Value)> {
        RedisPoolHealth::from_pool(self).into_data()
    }
}
