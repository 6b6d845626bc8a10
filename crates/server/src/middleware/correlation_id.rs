//! Request identity and per-request access logging.
//!
//! Each request gets an `x-request-id` (the caller's, or a fresh UUID v4),
//! which is echoed on the response and attached to the access log line.

use axum::{
    body::Body,
    http::{header::HeaderValue, HeaderName, Request},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use uuid::Uuid;

pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request ids for `tower-http`'s request-id layers.
#[derive(Clone, Copy, Default)]
pub struct UuidRequestIdGenerator;

impl MakeRequestId for UuidRequestIdGenerator {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        Some(RequestId::new(HeaderValue::from_str(&id).ok()?))
    }
}

/// Creates the request ID layer pair.
///
/// Apply `propagate` before `set` so that `set` runs first:
///
/// ```ignore
/// let (set_layer, propagate_layer) = create_request_id_layers();
/// let app = router.layer(propagate_layer).layer(set_layer);
/// ```
pub fn create_request_id_layers(
) -> (SetRequestIdLayer<UuidRequestIdGenerator>, PropagateRequestIdLayer) {
    (
        SetRequestIdLayer::new(X_REQUEST_ID.clone(), UuidRequestIdGenerator),
        PropagateRequestIdLayer::new(X_REQUEST_ID.clone()),
    )
}

fn request_id_of<B>(request: &Request<B>) -> String {
    request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .or_else(|| request.headers().get(&X_REQUEST_ID).and_then(|v| v.to_str().ok()))
        .unwrap_or("-")
        .to_string()
}

/// Logs one line per request with method, path, status and latency.
///
/// Must sit inside the request-id layers so the id is already assigned.
pub async fn access_log_middleware(request: Request<Body>, next: Next) -> Response {
    let request_id = request_id_of(&request);
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    let latency_ms = started.elapsed().as_millis();
    if status.is_server_error() {
        tracing::warn!(%request_id, %method, %path, status = status.as_u16(), latency_ms, "request failed");
    } else {
        tracing::info!(%request_id, %method, %path, status = status.as_u16(), latency_ms, "request completed");
    }

    response
}
