//! The failure surface of the HTTP API.
//!
//! Every failure a handler can produce is an [`ApiError`]. The
//! [`IntoResponse`] impl at the bottom is the single place where failures
//! turn into status codes and payloads; no other code maps errors to HTTP.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use stackcalc_core::{EvalError, StackError};
use thiserror::Error;

/// A request that could not be served. `Display` renders the exact
/// client-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The stack engine rejected the request.
    #[error(transparent)]
    Stack(#[from] StackError),
    /// Independent evaluation rejected the request.
    #[error(transparent)]
    Eval(#[from] EvalError),
    /// No route matched the path or method.
    #[error("Not Found")]
    RouteNotFound,
    /// `/logs/level` addressed a logger outside the closed set.
    #[error("Logger '{0}' not found")]
    UnknownLogger(String),
    /// `/logs/level` supplied a level other than ERROR, INFO, or DEBUG.
    #[error("Invalid logger level")]
    InvalidLoggerLevel,
    /// The request body failed to parse as the expected JSON shape.
    #[error("Error: malformed request body")]
    MalformedBody,
    /// The query string failed to parse as the expected shape.
    #[error("Error: malformed query string")]
    MalformedQuery,
    /// Anything uncaught, including handler panics.
    #[error("Server encountered an unexpected error ! message: {0}")]
    Unexpected(String),
}

/// How a failure payload is encoded on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// `{"errorMessage": "..."}`.
    Json,
    /// Bare message text.
    Text,
}

impl ApiError {
    /// Status code for this failure. This mapping exists nowhere else.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Stack(_) | Self::Eval(_) => StatusCode::CONFLICT,
            Self::RouteNotFound | Self::UnknownLogger(_) => StatusCode::NOT_FOUND,
            Self::InvalidLoggerLevel | Self::MalformedBody | Self::MalformedQuery => {
                StatusCode::BAD_REQUEST
            }
            Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The `/logs/level` failures answer in plain text; everything else is a
    /// JSON object.
    #[must_use]
    pub fn content_kind(&self) -> ContentKind {
        match self {
            Self::UnknownLogger(_) | Self::InvalidLoggerLevel => ContentKind::Text,
            _ => ContentKind::Json,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.to_string();
        match self.content_kind() {
            ContentKind::Json => {
                (status, Json(json!({ "errorMessage": message }))).into_response()
            }
            ContentKind::Text => (status, message).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::Value;
    use stackcalc_core::EvalError;

    use super::*;

    #[test]
    fn calculator_failures_are_conflicts() {
        let error = ApiError::Eval(EvalError::NotNumeric);
        assert_eq!(error.status_code(), StatusCode::CONFLICT);

        let error = ApiError::Stack(StackError::RemoveExceedsSize { count: 5, size: 0 });
        assert_eq!(error.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn lookup_failures_are_not_found() {
        assert_eq!(ApiError::RouteNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::UnknownLogger("x".to_string()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn input_failures_are_bad_requests() {
        assert_eq!(
            ApiError::InvalidLoggerLevel.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::MalformedBody.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::MalformedQuery.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn unexpected_is_internal_server_error() {
        let error = ApiError::Unexpected("boom".to_string());
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            error.to_string(),
            "Server encountered an unexpected error ! message: boom"
        );
    }

    #[test]
    fn only_logger_failures_are_plain_text() {
        assert_eq!(
            ApiError::UnknownLogger("x".to_string()).content_kind(),
            ContentKind::Text
        );
        assert_eq!(ApiError::InvalidLoggerLevel.content_kind(), ContentKind::Text);
        assert_eq!(ApiError::RouteNotFound.content_kind(), ContentKind::Json);
        assert_eq!(ApiError::MalformedBody.content_kind(), ContentKind::Json);
        assert_eq!(
            ApiError::Eval(EvalError::NotNumeric).content_kind(),
            ContentKind::Json
        );
    }

    #[test]
    fn unknown_logger_message_quotes_the_name() {
        let error = ApiError::UnknownLogger("nope".to_string());
        assert_eq!(error.to_string(), "Logger 'nope' not found");
    }

    #[tokio::test]
    async fn json_failures_use_the_error_message_envelope() {
        let response = ApiError::RouteNotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, serde_json::json!({ "errorMessage": "Not Found" }));
    }

    #[tokio::test]
    async fn text_failures_are_bare_messages() {
        let response = ApiError::InvalidLoggerLevel.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(bytes.as_ref(), b"Invalid logger level");
    }
}
