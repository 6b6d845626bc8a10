//! HTTP front end of the bridge: router, middleware and app assembly.

pub mod app;
pub mod middleware;
pub mod router;

pub use app::create_app;
