//! Device handlers
//!
//! `GET` lists, `POST` appends, every other method is answered by
//! [`method_not_allowed`].

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::application::DeviceService;
use crate::domain::Device;
use crate::interfaces::http::common::JsonBody;
use crate::interfaces::http::ApiError;

/// Confirmation body returned by `POST /devices`.
pub const DEVICE_CREATED: &str = "Device created!";

/// Methods served on `/devices`.
pub const ALLOWED_METHODS: &str = "GET, POST";

/// Device handler state
#[derive(Clone)]
pub struct DeviceState {
    pub service: Arc<DeviceService>,
}

/// `GET /devices`: every device in insertion order
pub async fn list_devices(State(state): State<DeviceState>) -> Result<Response, ApiError> {
    let devices = state.service.list().await?;
    let body = serde_json::to_vec(&devices).map_err(|e| ApiError::Encode(e.to_string()))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response())
}

/// `POST /devices`: append one device
pub async fn create_device(
    State(state): State<DeviceState>,
    JsonBody(device): JsonBody<Device>,
) -> Result<(StatusCode, &'static str), ApiError> {
    state.service.register(device).await?;
    Ok((StatusCode::CREATED, DEVICE_CREATED))
}

/// Fallback for unsupported methods on `/devices`
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, ALLOWED_METHODS)],
    )
}
