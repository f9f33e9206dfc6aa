//! Network module with deferred startup lifecycle.
//!
//! Implements the deferred startup pattern: `new()` creates resources,
//! `start()` binds the TCP listener, and `serve()` starts accepting
//! connections. This separation allows embedders to reach the shared
//! calculator service between `start()` and `serve()`.

use std::future::Future;
use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::config::NetworkConfig;
use super::handlers::{
    calculate_handler, get_level_handler, health_handler, history_handler, not_found_handler,
    operate_handler, push_handler, remove_handler, set_level_handler, size_handler, AppState,
};
use super::middleware::track_request;
use crate::service::CalculatorService;

/// Assembles the axum router with all routes and middleware.
///
/// Routes:
/// - `GET /calculator/health` -- liveness check
/// - `GET /calculator/stack/size` -- current stack depth
/// - `PUT /calculator/stack/arguments` -- push values
/// - `GET /calculator/stack/operate` -- perform an operation on the stack
/// - `DELETE /calculator/stack/arguments` -- discard values from the top
/// - `POST /calculator/independent/calculate` -- stateless evaluation
/// - `GET /calculator/history` -- recorded actions
/// - `GET|PUT /logs/level` -- logger threshold registry
///
/// Unknown paths and method mismatches both land on the 404 fallback, and
/// the tracking middleware wraps the fallback too, so every request gets a
/// number and an arrival line.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    let layers = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            track_request,
        ));

    Router::new()
        .route("/calculator/health", get(health_handler))
        .route("/calculator/stack/size", get(size_handler))
        .route("/calculator/stack/operate", get(operate_handler))
        .route(
            "/calculator/stack/arguments",
            put(push_handler).delete(remove_handler),
        )
        .route("/calculator/independent/calculate", post(calculate_handler))
        .route("/calculator/history", get(history_handler))
        .route("/logs/level", get(get_level_handler).put(set_level_handler))
        .fallback(not_found_handler)
        .method_not_allowed_fallback(not_found_handler)
        .layer(layers)
        .with_state(state)
}

/// Manages the full HTTP server lifecycle.
///
/// Follows the deferred startup pattern:
/// 1. `new()` -- allocates the shared calculator service
/// 2. `start()` -- binds the TCP listener to the configured address
/// 3. `serve()` -- accepts connections until shutdown is signalled
pub struct NetworkModule {
    config: NetworkConfig,
    state: AppState,
    listener: Option<TcpListener>,
}

impl NetworkModule {
    /// Creates a new network module without binding any port.
    #[must_use]
    pub fn new(config: NetworkConfig) -> Self {
        Self::with_service(config, Arc::new(CalculatorService::new()))
    }

    /// Creates a module around an existing service, for embedders that
    /// construct the service themselves.
    #[must_use]
    pub fn with_service(config: NetworkConfig, service: Arc<CalculatorService>) -> Self {
        Self {
            config,
            state: AppState::new(service),
            listener: None,
        }
    }

    /// Returns a shared reference to the calculator service.
    #[must_use]
    pub fn service(&self) -> Arc<CalculatorService> {
        Arc::clone(&self.state.service)
    }

    /// Binds the TCP listener to the configured host and port.
    ///
    /// Returns the actual bound port, which may differ from the configured
    /// port when port 0 is used (OS-assigned ephemeral port).
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound (e.g., port in use).
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        info!("TCP listener bound to {}:{}", self.config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Starts serving connections until the shutdown signal fires.
    ///
    /// Consumes `self` because the listener is moved into the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the server encounters a fatal I/O error.
    ///
    /// # Panics
    ///
    /// Panics if `start()` was not called before `serve()`.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let listener = self
            .listener
            .expect("start() must be called before serve()");
        let router = build_router(self.state);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use stackcalc_core::LoggerName;
    use tower::ServiceExt;

    use super::*;
    use crate::service::MemorySink;

    fn test_router() -> (Router, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let service = Arc::new(CalculatorService::with_sink(sink.clone()));
        (build_router(AppState::new(service)), sink)
    }

    async fn send(router: &Router, method: &str, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        dispatch(router, request).await
    }

    async fn send_json(
        router: &Router,
        method: &str,
        uri: &str,
        body: Value,
    ) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        dispatch(router, request).await
    }

    async fn send_raw(router: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        dispatch(router, request).await
    }

    async fn dispatch(router: &Router, request: Request<Body>) -> (StatusCode, String) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn as_json(raw: &str) -> Value {
        serde_json::from_str(raw).unwrap()
    }

    #[tokio::test]
    async fn health_answers_plain_ok() {
        let (router, _) = test_router();
        let (status, body) = send(&router, "GET", "/calculator/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn push_operate_size_round_trip() {
        let (router, _) = test_router();

        let (status, body) = send_json(
            &router,
            "PUT",
            "/calculator/stack/arguments",
            json!({"arguments": [10, 2]}),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(as_json(&body), json!({"result": 2}));

        let (status, body) =
            send(&router, "GET", "/calculator/stack/operate?operation=divide").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(as_json(&body), json!({"result": 5}));

        let (status, body) = send(&router, "GET", "/calculator/stack/size").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(as_json(&body), json!({"result": 0}));
    }

    #[tokio::test]
    async fn underflow_conflicts_and_preserves_the_stack() {
        let (router, _) = test_router();
        send_json(
            &router,
            "PUT",
            "/calculator/stack/arguments",
            json!({"arguments": [5]}),
        )
        .await;

        let (status, body) = send(&router, "GET", "/calculator/stack/operate?operation=plus").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            as_json(&body),
            json!({"errorMessage": "Error: cannot implement operation plus. It requires 2 arguments and the stack has only 1 arguments"})
        );

        let (_, body) = send(&router, "GET", "/calculator/stack/size").await;
        assert_eq!(as_json(&body), json!({"result": 1}));
    }

    #[tokio::test]
    async fn independent_division_by_zero_conflicts() {
        let (router, _) = test_router();
        let (status, body) = send_json(
            &router,
            "POST",
            "/calculator/independent/calculate",
            json!({"operation": "divide", "arguments": [10, 0]}),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            as_json(&body),
            json!({"errorMessage": "Error while performing operation Divide: division by 0"})
        );
    }

    #[tokio::test]
    async fn negative_factorial_conflicts() {
        let (router, _) = test_router();
        let (status, body) = send_json(
            &router,
            "POST",
            "/calculator/independent/calculate",
            json!({"operation": "fact", "arguments": [-3]}),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            as_json(&body),
            json!({"errorMessage": "Error while performing operation Factorial: not supported for the negative number"})
        );
    }

    #[tokio::test]
    async fn remove_from_an_empty_stack_conflicts() {
        let (router, _) = test_router();
        let (status, body) = send(&router, "DELETE", "/calculator/stack/arguments?count=5").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            as_json(&body),
            json!({"errorMessage": "Error: cannot remove 5 from the stack. It has only 0 arguments"})
        );
    }

    #[tokio::test]
    async fn logger_level_round_trip() {
        let (router, _) = test_router();

        let (status, body) = send(&router, "GET", "/logs/level?logger-name=stack-logger").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "INFO");

        let (status, body) = send(
            &router,
            "PUT",
            "/logs/level?logger-name=stack-logger&logger-level=DEBUG",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "DEBUG");

        let (_, body) = send(&router, "GET", "/logs/level?logger-name=stack-logger").await;
        assert_eq!(body, "DEBUG");
    }

    #[tokio::test]
    async fn unknown_logger_is_a_plain_text_404() {
        let (router, _) = test_router();
        let (status, body) = send(&router, "GET", "/logs/level?logger-name=nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Logger 'nope' not found");
    }

    #[tokio::test]
    async fn invalid_level_is_a_plain_text_400() {
        let (router, _) = test_router();
        let (status, body) = send(
            &router,
            "PUT",
            "/logs/level?logger-name=stack-logger&logger-level=WAT",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Invalid logger level");
    }

    #[tokio::test]
    async fn unknown_path_and_wrong_method_both_answer_404() {
        let (router, _) = test_router();

        let (status, body) = send(&router, "GET", "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(as_json(&body), json!({"errorMessage": "Not Found"}));

        let (status, body) = send(&router, "POST", "/calculator/stack/size").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(as_json(&body), json!({"errorMessage": "Not Found"}));
    }

    #[tokio::test]
    async fn malformed_bodies_are_rejected_with_400() {
        let (router, _) = test_router();

        let (status, body) =
            send_raw(&router, "PUT", "/calculator/stack/arguments", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            as_json(&body),
            json!({"errorMessage": "Error: malformed request body"})
        );

        let (status, body) = send_raw(
            &router,
            "POST",
            "/calculator/independent/calculate",
            "{\"operation\": ",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            as_json(&body),
            json!({"errorMessage": "Error: malformed request body"})
        );
    }

    #[tokio::test]
    async fn unparseable_count_is_rejected_with_400() {
        let (router, _) = test_router();
        for uri in [
            "/calculator/stack/arguments?count=abc",
            "/calculator/stack/arguments?count=-1",
        ] {
            let (status, body) = send(&router, "DELETE", uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(
                as_json(&body),
                json!({"errorMessage": "Error: malformed query string"})
            );
        }
    }

    #[tokio::test]
    async fn duplicate_query_keys_are_rejected_with_400() {
        let (router, sink) = test_router();
        for (method, uri) in [
            ("GET", "/calculator/stack/operate?operation=plus&operation=times"),
            ("GET", "/calculator/history?flavor=STACK&flavor=INDEPENDENT"),
            ("GET", "/logs/level?logger-name=a&logger-name=b"),
            ("PUT", "/logs/level?logger-name=a&logger-name=b"),
        ] {
            let (status, body) = send(&router, method, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(
                as_json(&body),
                json!({"errorMessage": "Error: malformed query string"})
            );
        }

        // The operate failure is owned by the stack logger, the rest by the
        // request logger.
        assert_eq!(
            sink.messages(LoggerName::Stack),
            vec!["Server encountered an error ! message: Error: malformed query string".to_string()]
        );
        let request_failures = sink
            .messages(LoggerName::Request)
            .iter()
            .filter(|m| m.contains("malformed query string"))
            .count();
        assert_eq!(request_failures, 3);
    }

    #[tokio::test]
    async fn remove_answers_the_new_size() {
        let (router, _) = test_router();
        send_json(
            &router,
            "PUT",
            "/calculator/stack/arguments",
            json!({"arguments": [1, 2, 3]}),
        )
        .await;

        let (status, body) = send(&router, "DELETE", "/calculator/stack/arguments?count=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(as_json(&body), json!({"result": 1}));
    }

    #[tokio::test]
    async fn empty_push_body_pushes_nothing() {
        let (router, _) = test_router();
        let (status, body) =
            send_json(&router, "PUT", "/calculator/stack/arguments", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(as_json(&body), json!({"result": 0}));
    }

    #[tokio::test]
    async fn missing_operation_param_conflicts() {
        let (router, _) = test_router();
        let (status, body) = send(&router, "GET", "/calculator/stack/operate").await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            as_json(&body),
            json!({"errorMessage": "Error: unknown operation: "})
        );
    }

    #[tokio::test]
    async fn history_reports_both_flavors_in_order() {
        let (router, _) = test_router();
        send_json(
            &router,
            "PUT",
            "/calculator/stack/arguments",
            json!({"arguments": [3, 4]}),
        )
        .await;
        send(&router, "GET", "/calculator/stack/operate?operation=times").await;
        send_json(
            &router,
            "POST",
            "/calculator/independent/calculate",
            json!({"operation": "abs", "arguments": [-7]}),
        )
        .await;

        let (status, body) = send(&router, "GET", "/calculator/history").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            as_json(&body),
            json!({"result": [
                {"flavor": "STACK", "operation": "times", "arguments": [3, 4], "result": 12},
                {"flavor": "INDEPENDENT", "operation": "abs", "arguments": [-7], "result": 7},
            ]})
        );

        let (_, body) = send(&router, "GET", "/calculator/history?flavor=INDEPENDENT").await;
        assert_eq!(as_json(&body)["result"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn every_request_gets_an_arrival_line() {
        let (router, sink) = test_router();
        send(&router, "GET", "/calculator/history?flavor=STACK").await;
        send(&router, "GET", "/nope").await;

        let messages = sink.messages(LoggerName::Request);
        assert!(messages.contains(
            &"Incoming request | #1 | resource: /calculator/history?flavor=STACK | HTTP Verb GET"
                .to_string()
        ));
        assert!(messages
            .contains(&"Incoming request | #2 | resource: /nope | HTTP Verb GET".to_string()));
    }

    #[tokio::test]
    async fn duration_lines_appear_once_the_request_logger_is_debug() {
        let (router, sink) = test_router();
        send(&router, "GET", "/calculator/health").await;
        assert!(!sink
            .messages(LoggerName::Request)
            .iter()
            .any(|m| m.contains("duration")));

        send(
            &router,
            "PUT",
            "/logs/level?logger-name=request-logger&logger-level=DEBUG",
        )
        .await;
        send(&router, "GET", "/calculator/health").await;

        let messages = sink.messages(LoggerName::Request);
        assert!(messages
            .iter()
            .any(|m| m.starts_with("request #3 duration: ") && m.ends_with("ms")));
    }

    #[test]
    fn new_creates_module_without_binding() {
        let module = NetworkModule::new(NetworkConfig::default());
        assert!(module.listener.is_none());
    }

    #[test]
    fn service_returns_shared_arc() {
        let module = NetworkModule::new(NetworkConfig::default());
        let s1 = module.service();
        let s2 = module.service();
        assert!(Arc::ptr_eq(&s1, &s2));
    }

    #[tokio::test]
    async fn start_binds_to_os_assigned_port() {
        let mut module = NetworkModule::new(NetworkConfig::default());
        let port = module.start().await.expect("start should succeed");
        assert!(port > 0, "OS-assigned port should be > 0");
        assert!(module.listener.is_some());
    }

    #[tokio::test]
    #[should_panic(expected = "start() must be called before serve()")]
    async fn serve_panics_without_start() {
        let module = NetworkModule::new(NetworkConfig::default());
        let _ = module.serve(std::future::pending::<()>()).await;
    }
}
