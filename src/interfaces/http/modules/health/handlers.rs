//! Health check handler

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;

use crate::application::DeviceService;

/// Health check state
#[derive(Clone)]
pub struct HealthState {
    pub service: Arc<DeviceService>,
    pub version: String,
    pub started_at: Arc<Instant>,
}

/// Service health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub devices: Option<usize>,
}

/// `GET /health`
pub async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let uptime = state.started_at.elapsed().as_secs();

    let (status, devices) = match state.service.count().await {
        Ok(count) => (StatusCode::OK, Some(count)),
        Err(e) => {
            warn!("Health check could not read the device store: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, None)
        }
    };

    let label = if status == StatusCode::OK { "ok" } else { "degraded" };
    (
        status,
        Json(HealthResponse {
            status: label.to_string(),
            version: state.version.clone(),
            uptime_seconds: uptime,
            devices,
        }),
    )
}
