//! Request tracking middleware for the calculator server.
//!
//! Every inbound request, matched or not, passes through [`track_request`]:
//! it draws the next request number, logs the arrival line, carries a
//! [`RequestContext`] to the handlers, converts panics into the generic
//! 500 answer, and logs the request duration once the response exists.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use futures_util::FutureExt;
use stackcalc_core::{LoggerName, RequestContext};

use super::handlers::AppState;

/// Numbers the request, narrates it on the request logger, and shields the
/// connection from handler panics.
pub async fn track_request(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let service = &state.service;
    let id = service.next_request_id();
    let context = RequestContext::new(id);

    service.log().info(
        LoggerName::Request,
        id,
        format!(
            "Incoming request | #{id} | resource: {} | HTTP Verb {}",
            request.uri(),
            request.method()
        ),
    );
    request.extensions_mut().insert(context.clone());

    let response = match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => service
            .fail_unexpected(id, panic_detail(panic.as_ref()))
            .into_response(),
    };

    let elapsed = context.received_at.elapsed().as_millis();
    service.log().debug(
        LoggerName::Request,
        id,
        format!("request #{id} duration: {elapsed}ms"),
    );
    response
}

/// Best-effort rendering of a panic payload. `panic!` with a message yields
/// a `&str` or `String` payload; anything else is opaque.
fn panic_detail(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic".to_string()
    }
}
