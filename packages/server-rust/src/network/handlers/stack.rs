//! Stack flavor endpoint handlers.
//!
//! Four operations over the one shared stack: size, push, operate, remove.
//! All state changes go through [`crate::service::CalculatorService`]; the
//! handlers only translate between HTTP and the service calls.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Extension, Query, State};
use axum::Json;
use serde::Deserialize;
use stackcalc_core::{LoggerName, RequestContext};

use super::{AppState, ResultBody};
use crate::service::ApiError;

/// Body of `PUT /calculator/stack/arguments`.
#[derive(Debug, Deserialize)]
pub struct PushArguments {
    /// Values pushed in list order. A missing list pushes nothing.
    #[serde(default)]
    pub arguments: Vec<i64>,
}

/// Query of `GET /calculator/stack/operate`.
#[derive(Debug, Deserialize)]
pub struct OperateParams {
    pub operation: Option<String>,
}

/// Query of `DELETE /calculator/stack/arguments`.
#[derive(Debug, Deserialize)]
pub struct RemoveParams {
    pub count: Option<usize>,
}

/// Returns the current stack depth.
pub async fn size_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
) -> Json<ResultBody<usize>> {
    Json(ResultBody {
        result: state.service.stack_size(context.id),
    })
}

/// Pushes the request's arguments and returns the new depth.
///
/// # Errors
///
/// Returns `ApiError::MalformedBody` if the body is not a JSON object with
/// an integer list.
pub async fn push_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    body: Result<Json<PushArguments>, JsonRejection>,
) -> Result<Json<ResultBody<usize>>, ApiError> {
    let Json(push) = body.map_err(|_| {
        state
            .service
            .fail(LoggerName::Stack, context.id, ApiError::MalformedBody)
    })?;
    Ok(Json(ResultBody {
        result: state.service.push_arguments(context.id, &push.arguments),
    }))
}

/// Performs the named operation against the stack top. A missing
/// `operation` parameter behaves as the empty name.
///
/// # Errors
///
/// Returns `ApiError` for an unparseable query string or an operation
/// that cannot be performed.
pub async fn operate_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    query: Result<Query<OperateParams>, QueryRejection>,
) -> Result<Json<ResultBody<i64>>, ApiError> {
    let Query(params) = query.map_err(|_| {
        state
            .service
            .fail(LoggerName::Stack, context.id, ApiError::MalformedQuery)
    })?;
    let operation = params.operation.unwrap_or_default();
    let result = state.service.operate_on_stack(context.id, &operation)?;
    Ok(Json(ResultBody { result }))
}

/// Discards values from the stack top and returns the new depth. A missing
/// `count` parameter removes nothing.
///
/// # Errors
///
/// Returns `ApiError` for an unparseable query string or a count beyond
/// the current depth.
pub async fn remove_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    query: Result<Query<RemoveParams>, QueryRejection>,
) -> Result<Json<ResultBody<usize>>, ApiError> {
    let Query(params) = query.map_err(|_| {
        state
            .service
            .fail(LoggerName::Stack, context.id, ApiError::MalformedQuery)
    })?;
    let count = params.count.unwrap_or(0);
    let result = state.service.remove_arguments(context.id, count)?;
    Ok(Json(ResultBody { result }))
}
