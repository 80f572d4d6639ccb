//! Prometheus metrics handler
//!
//! Exposes `GET /metrics` returning Prometheus text format.
//! The handler renders the service's own registry, never a global recorder.

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::infrastructure::MetricsRegistry;

/// Shared state for the metrics endpoint
#[derive(Clone)]
pub struct MetricsState {
    pub registry: MetricsRegistry,
}

/// `GET /metrics`: Prometheus scrape endpoint
pub async fn prometheus_metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    let body = state.registry.render();
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}
