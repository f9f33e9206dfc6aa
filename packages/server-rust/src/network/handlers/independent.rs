//! Independent flavor endpoint handler.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, State};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use stackcalc_core::{LoggerName, RequestContext};

use super::{AppState, ResultBody};
use crate::service::ApiError;

/// Body of `POST /calculator/independent/calculate`.
///
/// Arguments stay as raw JSON values here; the evaluator owns the numeric
/// coercion rules and their error messages.
#[derive(Debug, Deserialize)]
pub struct CalculateRequest {
    pub operation: String,
    #[serde(default)]
    pub arguments: Vec<Value>,
}

/// Evaluates a self-contained operation without touching the stack.
///
/// # Errors
///
/// Returns `ApiError` for a malformed body or a failed evaluation.
pub async fn calculate_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    body: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<Json<ResultBody<i64>>, ApiError> {
    let Json(calculate) = body.map_err(|_| {
        state
            .service
            .fail(LoggerName::Independent, context.id, ApiError::MalformedBody)
    })?;
    let result =
        state
            .service
            .calculate_independent(context.id, &calculate.operation, &calculate.arguments)?;
    Ok(Json(ResultBody { result }))
}
