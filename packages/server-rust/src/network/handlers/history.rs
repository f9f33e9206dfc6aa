//! History endpoint handler.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Extension, Query, State};
use axum::Json;
use serde::Deserialize;
use stackcalc_core::{Flavor, HistoryRecord, LoggerName, RequestContext};

use super::{AppState, ResultBody};
use crate::service::ApiError;

/// Query of `GET /calculator/history`.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub flavor: Option<String>,
}

/// Returns recorded actions, optionally filtered by flavor.
///
/// A missing or unrecognized flavor value returns both flavors, so a typo
/// widens the answer instead of erroring.
///
/// # Errors
///
/// Returns `ApiError::MalformedQuery` if the query string does not parse.
pub async fn history_handler(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    query: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<ResultBody<Vec<HistoryRecord>>>, ApiError> {
    let Query(params) = query.map_err(|_| {
        state
            .service
            .fail(LoggerName::Request, context.id, ApiError::MalformedQuery)
    })?;
    let flavor = params.flavor.as_deref().and_then(Flavor::parse);
    Ok(Json(ResultBody {
        result: state.service.history(context.id, flavor),
    }))
}
