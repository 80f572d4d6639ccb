//! Lenient JSON extractor for Axum
//!
//! `JsonBody<T>` works like `axum::Json<T>` with two differences:
//! the `Content-Type` header is not checked, and every failure (unreadable
//! body, syntax error, wrong field types, missing fields) is reported as
//! `400 Bad Request` with the decoder's message as a plain-text body.

use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::interfaces::http::ApiError;

/// An extractor that deserializes the raw request body as JSON.
///
/// ```ignore
/// async fn handler(JsonBody(device): JsonBody<Device>) {
///     // `device` decoded successfully
/// }
/// ```
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Decode(rejection.body_text()))?;

        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct TestBody {
        #[allow(dead_code)]
        name: String,
    }

    async fn handler(JsonBody(_body): JsonBody<TestBody>) -> &'static str {
        "ok"
    }

    fn app() -> Router {
        Router::new().route("/test", post(handler))
    }

    async fn send(req: Request<Body>) -> axum::http::Response<Body> {
        use tower::Service;
        let mut svc = app().into_service();
        svc.call(req).await.unwrap()
    }

    fn post_body(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/test")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn content_type_is_not_required() {
        let resp = send(post_body(r#"{"name": "Alice"}"#)).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn syntax_error_returns_400_with_message() {
        let resp = send(post_body("not json")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert!(String::from_utf8_lossy(&body).contains("expected ident"));
    }

    #[tokio::test]
    async fn missing_field_returns_400() {
        let resp = send(post_body("{}")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_body_returns_400() {
        let resp = send(post_body("")).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
