//! Dependency health checks
//!
//! - [`registry`]: named probes registered at startup
//! - [`engine`]: concurrent execution and worst-wins aggregation
//! - [`writer`]: JSON body and status code for the aggregate
//!
//! The [`healthz`] handler ties them together for axum.

use axum::{
    extract::State,
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::state::HealthState;

pub mod engine;
pub mod probe;
pub mod registry;
pub mod status;
pub mod writer;

pub use engine::{Aggregator, TIMED_OUT};
pub use probe::{BoxError, FnCheck, HealthCheck, ProbeDescriptor, DEFAULT_PROBE_TIMEOUT};
pub use registry::ProbeRegistry;
pub use status::{AggregateResult, CheckReport, HealthStatus, ProbeOutcome};
pub use writer::{HealthReport, HealthReportEntry};

/// Default path of the health endpoint
pub const DEFAULT_HEALTH_PATH: &str = "/healthz";

/// Aggregated dependency health
///
/// Runs every registered probe and answers 200 when the service is Healthy
/// or Degraded, 503 when any dependency is Unhealthy. Never fails: probe
/// errors, panics and timeouts are reported in the body.
pub async fn healthz(State(state): State<HealthState>) -> Response {
    let result = state.aggregator().run(state.registry()).await;
    let (body, status) = writer::write(&result);

    (status, [(CONTENT_TYPE, "application/json")], body).into_response()
}

/// Router serving [`healthz`] at `path`
pub fn routes(state: HealthState, path: &str) -> Router {
    Router::new().route(path, get(healthz)).with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    fn state(probes: Vec<ProbeDescriptor>) -> HealthState {
        let mut registry = ProbeRegistry::new();
        for probe in probes {
            registry.register(probe).unwrap();
        }
        HealthState::new(registry, Aggregator::new())
    }

    async fn get_health(app: Router, path: &str) -> (StatusCode, String, HealthReport) {
        let response = app
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, content_type, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_healthy_dependencies_return_200() {
        let app = routes(
            state(vec![
                ProbeDescriptor::new("postgresql", FnCheck::new(|| async { Ok(CheckReport::healthy()) }))
                    .with_tags(["db", "sql", "postgresql"]),
                ProbeDescriptor::new("redis", FnCheck::new(|| async { Ok(CheckReport::healthy()) }))
                    .with_tags(["cache", "redis"]),
            ]),
            DEFAULT_HEALTH_PATH,
        );

        let (status, content_type, report) = get_health(app, "/healthz").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "application/json");
        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.entries.len(), 2);
        assert_eq!(report.entries[1].tags, vec!["cache", "redis"]);
    }

    #[tokio::test]
    async fn test_unhealthy_dependency_returns_503() {
        let app = routes(
            state(vec![
                ProbeDescriptor::new("postgresql", FnCheck::new(|| async { Ok(CheckReport::healthy()) })),
                ProbeDescriptor::new(
                    "redis",
                    FnCheck::new(|| async { Err::<CheckReport, BoxError>("connection refused".into()) }),
                ),
            ]),
            DEFAULT_HEALTH_PATH,
        );

        let (status, _, report) = get_health(app, "/healthz").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert_eq!(report.entries[0].name, "postgresql");
        assert_eq!(report.entries[1].description.as_deref(), Some("connection refused"));
    }

    #[tokio::test]
    async fn test_degraded_dependency_still_returns_200() {
        let app = routes(
            state(vec![ProbeDescriptor::new(
                "postgresql",
                FnCheck::new(|| async { Ok(CheckReport::degraded("replica lag")) }),
            )]),
            "/status/health",
        );

        let (status, _, report) = get_health(app, "/status/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(report.status, HealthStatus::Degraded);
    }
}
