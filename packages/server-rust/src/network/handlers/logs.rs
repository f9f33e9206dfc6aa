//! Logger level endpoint handlers.
//!
//! Both endpoints answer with the level name as plain text, matching the
//! text bodies their errors use.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Extension, Query, State};
use serde::Deserialize;
use stackcalc_core::{LoggerName, RequestContext};

use super::AppState;
use crate::service::ApiError;

/// Query of `GET /logs/level`.
#[derive(Debug, Deserialize)]
pub struct GetLevelParams {
    #[serde(rename = "logger-name")]
    pub logger_name: Option<String>,
}

/// Query of `PUT /logs/level`.
#[derive(Debug, Deserialize)]
pub struct SetLevelParams {
    #[serde(rename = "logger-name")]
    pub logger_name: Option<String>,
    #[serde(rename = "logger-level")]
    pub logger_level: Option<String>,
}

/// Returns the named logger's current threshold.
///
/// A missing `logger-name` is treated as the empty name, which no logger
/// carries, so the unknown-logger error covers it too.
///
/// # Errors
///
/// Returns `ApiError` for an unparseable query string or a name outside
/// the closed set.
pub async fn get_level_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    query: Result<Query<GetLevelParams>, QueryRejection>,
) -> Result<&'static str, ApiError> {
    let Query(params) = query.map_err(|_| {
        state
            .service
            .fail(LoggerName::Request, context.id, ApiError::MalformedQuery)
    })?;
    let name = params.logger_name.unwrap_or_default();
    let level = state.service.log_level(context.id, &name)?;
    Ok(level.as_str())
}

/// Replaces the named logger's threshold and echoes the new value.
///
/// # Errors
///
/// Returns `ApiError` for an unparseable query string, or when the logger
/// name or the level value does not validate; the logger name is checked
/// first.
pub async fn set_level_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    query: Result<Query<SetLevelParams>, QueryRejection>,
) -> Result<&'static str, ApiError> {
    let Query(params) = query.map_err(|_| {
        state
            .service
            .fail(LoggerName::Request, context.id, ApiError::MalformedQuery)
    })?;
    let name = params.logger_name.unwrap_or_default();
    let value = params.logger_level.unwrap_or_default();
    let level = state.service.set_log_level(context.id, &name, &value)?;
    Ok(level.as_str())
}
