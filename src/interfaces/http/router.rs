//! Listener routers
//!
//! The devices listener serves `/devices` and `/health`, the metrics
//! listener serves `/metrics` and `/health`. In the single layout one
//! router carries all three.

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::FromRef, middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::application::DeviceService;
use crate::config::AppConfig;
use crate::domain::DomainResult;
use crate::infrastructure::{InMemoryDeviceRepository, MetricsRegistry};

use super::modules::devices::{self, DeviceState};
use super::modules::health::{self, HealthState};
use super::modules::metrics::{http_metrics_middleware, prometheus_metrics, MetricsState};
use super::modules::request_id::request_id_middleware;

/// State shared by every route. Handlers extract their own slice via `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub devices: Arc<DeviceService>,
    pub metrics: MetricsRegistry,
    pub started_at: Arc<Instant>,
}

impl AppState {
    /// Build the registry, the seeded store and the device service.
    pub async fn from_config(config: &AppConfig) -> DomainResult<Self> {
        let metrics = MetricsRegistry::new(&config.app.version);
        let repository = Arc::new(InMemoryDeviceRepository::new(config.seed_devices()));
        let devices = DeviceService::new(repository, metrics.device_metrics()).await?;

        Ok(Self {
            devices: Arc::new(devices),
            metrics,
            started_at: Arc::new(Instant::now()),
        })
    }
}

// -- FromRef implementations so each handler keeps its own State<T> extractor --

impl FromRef<AppState> for DeviceState {
    fn from_ref(s: &AppState) -> Self {
        DeviceState {
            service: Arc::clone(&s.devices),
        }
    }
}

impl FromRef<AppState> for MetricsState {
    fn from_ref(s: &AppState) -> Self {
        MetricsState {
            registry: s.metrics.clone(),
        }
    }
}

impl FromRef<AppState> for HealthState {
    fn from_ref(s: &AppState) -> Self {
        HealthState {
            service: Arc::clone(&s.devices),
            version: s.metrics.version().to_string(),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

fn device_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/devices",
            get(devices::list_devices)
                .post(devices::create_device)
                // `get` would otherwise answer HEAD as well
                .head(devices::method_not_allowed)
                .fallback(devices::method_not_allowed),
        )
        .route_layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            http_metrics_middleware,
        ))
}

fn metrics_routes() -> Router<AppState> {
    Router::new().route("/metrics", get(prometheus_metrics))
}

fn finish(routes: Router<AppState>, state: AppState) -> Router {
    routes
        .route("/health", get(health::health_check))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router for the devices listener (split layout).
pub fn devices_router(state: AppState) -> Router {
    finish(device_routes(&state), state)
}

/// Router for the metrics listener (split layout).
pub fn metrics_router(state: AppState) -> Router {
    finish(metrics_routes(), state)
}

/// Router serving every route from one listener.
pub fn single_router(state: AppState) -> Router {
    finish(device_routes(&state).merge(metrics_routes()), state)
}
