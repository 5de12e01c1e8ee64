//! HTTP server with graceful shutdown

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    catch_panic::CatchPanicLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{config::Config, error::Result};

/// Server instance
pub struct Server {
    config: Config,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the server with the given router
    pub async fn serve(self, app: Router) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.service.port));
        let listener = TcpListener::bind(&addr).await?;

        self.serve_on(listener, app).await
    }

    /// Run the server on an already bound listener
    pub async fn serve_on(self, listener: TcpListener, app: Router) -> Result<()> {
        let addr = listener.local_addr()?;
        tracing::info!("Starting {} on {}", self.config.service.name, addr);
        tracing::info!(
            "  - Health endpoint: {} (deadline: {:?})",
            self.config.health.path,
            self.config.deadline()
        );
        tracing::info!(
            "  - Request timeout: {} seconds",
            self.config.service.timeout_secs
        );

        let app = self.apply_middleware(app);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Layers are applied in reverse order (bottom layer is innermost)
    pub(crate) fn apply_middleware(&self, app: Router) -> Router {
        app.layer(TimeoutLayer::with_status_code(
            http::StatusCode::REQUEST_TIMEOUT,
            self.config.service.request_timeout(),
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(false))
                .on_response(DefaultOnResponse::new()),
        )
        .layer(CatchPanicLayer::new())
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{self, Aggregator, CheckReport, FnCheck, HealthReport, ProbeDescriptor, ProbeRegistry, TIMED_OUT};
    use crate::service_builder::ServiceBuilder;
    use crate::state::HealthState;
    use axum::{body::Body, http::Request};
    use std::time::Duration;
    use tower::ServiceExt;

    #[test]
    fn test_server_creation() {
        let config = Config::default();
        let server = Server::new(config.clone());
        assert_eq!(server.config().service.port, config.service.port);
    }

    #[tokio::test]
    async fn test_middleware_keeps_routes() {
        let server = Server::new(Config::default());
        let state = HealthState::new(ProbeRegistry::new(), Aggregator::new());
        let app = server.apply_middleware(health::routes(state, "/healthz"));

        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_check_reported_before_request_timeout() {
        let mut config = Config::default();
        config.service.timeout_secs = 1;

        let service = ServiceBuilder::new()
            .with_config(config.clone())
            .with_probe(
                ProbeDescriptor::new(
                    "redis",
                    FnCheck::new(|| async {
                        std::future::pending::<()>().await;
                        Ok(CheckReport::healthy())
                    }),
                )
                .with_timeout(Duration::from_secs(2)),
            )
            .build()
            .await
            .unwrap();
        let app = Server::new(config).apply_middleware(service.router());

        let response = app
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), http::StatusCode::SERVICE_UNAVAILABLE);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let report: HealthReport = serde_json::from_slice(&body).unwrap();
        assert_eq!(report.entries[0].name, "redis");
        assert_eq!(report.entries[0].description.as_deref(), Some(TIMED_OUT));
    }
}
