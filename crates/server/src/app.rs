use crate::{middleware, router};
use axum::{middleware as axum_middleware, Router};
use bridge_core::{config::ServerConfig, reconcile::Reconciler};
use std::sync::Arc;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::limit::RequestBodyLimitLayer;

/// Assembles the API router with the full middleware stack.
///
/// Outermost first: CORS, request id (set, then propagate), access log,
/// body size limit, concurrency limit. CORS sits outside everything so that
/// rejections from the inner layers still carry its headers.
pub fn create_app(reconciler: Arc<Reconciler>, config: &ServerConfig) -> Router {
    let (set_request_id, propagate_request_id) = middleware::create_request_id_layers();

    router::create_router(reconciler)
        .layer(GlobalConcurrencyLimitLayer::new(config.max_concurrent_requests))
        .layer(RequestBodyLimitLayer::new(config.request_body_limit_bytes))
        .layer(axum_middleware::from_fn(middleware::access_log_middleware))
        .layer(propagate_request_id)
        .layer(set_request_id)
        .layer(axum_middleware::from_fn(middleware::cors_middleware))
}
