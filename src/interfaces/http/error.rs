//! API error type
//!
//! Client-facing failures are reported as plain text carrying the raw error
//! message, not as a structured envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::domain::DomainError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body could not be decoded
    #[error("{0}")]
    Decode(String),

    /// Response body could not be encoded
    #[error("{0}")]
    Encode(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Decode(_) | Self::Encode(_) => StatusCode::BAD_REQUEST,
            Self::Domain(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::Domain(e) => error!("Request failed: {}", e),
            other => warn!("Rejected request: {}", other),
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_and_encode_map_to_bad_request() {
        assert_eq!(ApiError::Decode("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Encode("x".into()).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn domain_errors_are_internal() {
        let err = ApiError::from(DomainError::Storage("disk".into()));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Storage error: disk");
    }
}
