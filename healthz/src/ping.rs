//! Liveness checks for client handles that can be pinged
//!
//! Connection pools implement [`Ping`]; [`PingCheck`] turns any of them into
//! a [`HealthCheck`] so fakes can stand in for real dependencies in tests.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

use crate::health::{BoxError, CheckReport, HealthCheck};

/// A dependency client with a minimal round-trip operation
#[async_trait]
pub trait Ping: Send + Sync + 'static {
    /// Perform one round-trip against the dependency
    async fn ping(&self) -> Result<(), BoxError>;

    /// Diagnostics attached to every report (pool sizes and the like)
    fn diagnostics(&self) -> Vec<(String, Value)> {
        Vec::new()
    }
}

/// [`HealthCheck`] backed by a [`Ping`] target
///
/// A failed ping is Unhealthy with the client error as description. A
/// successful ping is Healthy, unless a degraded threshold is configured and
/// the round-trip took longer than it.
pub struct PingCheck<P> {
    target: P,
    degraded_after: Option<Duration>,
}

impl<P: Ping> PingCheck<P> {
    pub fn new(target: P) -> Self {
        Self {
            target,
            degraded_after: None,
        }
    }

    /// Report Degraded when a successful ping is slower than `threshold`
    pub fn degraded_after(mut self, threshold: Duration) -> Self {
        self.degraded_after = Some(threshold);
        self
    }

    pub fn target(&self) -> &P {
        &self.target
    }
}

#[async_trait]
impl<P: Ping> HealthCheck for PingCheck<P> {
    async fn check(&self) -> Result<CheckReport, BoxError> {
        let started = Instant::now();
        let outcome = self.target.ping().await;
        let elapsed = started.elapsed();

        let report = match (outcome, self.degraded_after) {
            (Err(e), _) => CheckReport::unhealthy(e.to_string()),
            (Ok(()), Some(threshold)) if elapsed > threshold => CheckReport::degraded(format!(
                "responded in {}ms, above the {}ms threshold",
                elapsed.as_millis(),
                threshold.as_millis()
            )),
            (Ok(()), _) => CheckReport::healthy(),
        };

        Ok(report.extend_data(self.target.diagnostics()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::HealthStatus;

    struct FakeClient {
        latency: Duration,
        error: Option<&'static str>,
    }

    #[async_trait]
    impl Ping for FakeClient {
        async fn ping(&self) -> Result<(), BoxError> {
            tokio::time::sleep(self.latency).await;
            match self.error {
                Some(msg) => Err(msg.into()),
                None => Ok(()),
            }
        }

        fn diagnostics(&self) -> Vec<(String, Value)> {
            vec![("max_connections".to_string(), Value::from(5))]
        }
    }

    fn client(latency_ms: u64, error: Option<&'static str>) -> FakeClient {
        FakeClient {
            latency: Duration::from_millis(latency_ms),
            error,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_ping_is_healthy() {
        let report = PingCheck::new(client(5, None)).check().await.unwrap();

        assert_eq!(report.status, HealthStatus::Healthy);
        assert!(report.description.is_none());
        assert_eq!(report.data.get("max_connections"), Some(&Value::from(5)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_ping_is_unhealthy_with_diagnostics() {
        let report = PingCheck::new(client(2, Some("connection refused")))
            .check()
            .await
            .unwrap();

        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert_eq!(report.description.as_deref(), Some("connection refused"));
        assert!(report.data.contains_key("max_connections"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_ping_is_degraded_when_threshold_set() {
        let check = PingCheck::new(client(300, None)).degraded_after(Duration::from_millis(250));
        let report = check.check().await.unwrap();

        assert_eq!(report.status, HealthStatus::Degraded);
        assert!(report.description.unwrap().contains("250ms threshold"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_ping_is_healthy_without_threshold() {
        let report = PingCheck::new(client(300, None)).check().await.unwrap();
        assert_eq!(report.status, HealthStatus::Healthy);
    }
}
