//! HTTP exposition endpoints.
//!
//! Two routes, both read-only:
//! - `GET /metrics` - Prometheus text exposition
//! - `GET /health`  - service status for monitoring
//!
//! The endpoint stays up regardless of scan failures; a scrape during a
//! broken cycle sees the last recorded values.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::metrics::MetricsState;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,

    /// Service version from Cargo.toml.
    pub version: String,
}

/// Creates the exporter router.
pub fn create_router(state: MetricsState) -> Router {
    Router::new()
        .route("/metrics", get(get_metrics))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Prometheus metrics endpoint.
///
/// Returns all collected metrics in Prometheus exposition format.
async fn get_metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    let output = state.prometheus_handle.render();
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        output,
    )
}

/// Health check endpoint.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use metrics_exporter_prometheus::PrometheusBuilder;

    fn test_state() -> MetricsState {
        // build_recorder avoids installing a process-global recorder, so
        // each test gets its own handle.
        let recorder = PrometheusBuilder::new().build_recorder();
        MetricsState {
            prometheus_handle: recorder.handle(),
        }
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let server = TestServer::new(create_router(test_state())).unwrap();

        let response = server.get("/health").await;
        response.assert_status_ok();

        let health: HealthResponse = response.json();
        assert_eq!(health.status, "ok");
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_metrics_endpoint_serves_exposition_text() {
        let server = TestServer::new(create_router(test_state())).unwrap();

        let response = server.get("/metrics").await;
        response.assert_status_ok();
        let content_type = response.header("content-type");
        assert!(content_type.to_str().unwrap().starts_with("text/plain"));
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let server = TestServer::new(create_router(test_state())).unwrap();

        let response = server.get("/nope").await;
        response.assert_status_not_found();
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
    }
}
