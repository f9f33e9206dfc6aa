//! Networking types, configuration, request tracking, and server lifecycle.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod module;

pub use config::*;
pub use handlers::AppState;
pub use middleware::track_request;
pub use module::{build_router, NetworkModule};
