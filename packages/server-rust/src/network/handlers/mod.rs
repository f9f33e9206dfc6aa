//! HTTP handler definitions for the calculator server.
//!
//! This module defines `AppState` (the shared state carried through axum
//! extractors) and re-exports all handler functions for convenient access
//! when building the router.

pub mod health;
pub mod history;
pub mod independent;
pub mod logs;
pub mod stack;

pub use health::health_handler;
pub use history::history_handler;
pub use independent::calculate_handler;
pub use logs::{get_level_handler, set_level_handler};
pub use stack::{operate_handler, push_handler, remove_handler, size_handler};

use std::sync::Arc;

use axum::extract::{Extension, State};
use serde::Serialize;
use stackcalc_core::{LoggerName, RequestContext};

use crate::service::{ApiError, CalculatorService};

/// Shared application state passed to all axum handlers via `State` extraction.
///
/// Holds an `Arc` reference to the calculator service so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Calculator state, history ledger, loggers, and request numbering.
    pub service: Arc<CalculatorService>,
}

impl AppState {
    #[must_use]
    pub fn new(service: Arc<CalculatorService>) -> Self {
        Self { service }
    }
}

/// Successful response envelope shared by every endpoint.
#[derive(Debug, Serialize)]
pub struct ResultBody<T> {
    pub result: T,
}

/// Fallback for unknown paths and method mismatches. Reports the miss on
/// the request logger and answers 404.
pub async fn not_found_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
) -> ApiError {
    state
        .service
        .fail(LoggerName::Request, context.id, ApiError::RouteNotFound)
}
