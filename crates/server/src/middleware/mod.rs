//! HTTP middleware for the bridge API.
//!
//! These are transport concerns only (headers, request identity); nothing here
//! touches the chain or the store.

pub mod correlation_id;
pub mod cors;

pub use correlation_id::{
    access_log_middleware, create_request_id_layers, UuidRequestIdGenerator, X_REQUEST_ID,
};
pub use cors::cors_middleware;
