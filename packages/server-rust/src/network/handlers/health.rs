//! Health endpoint handler.

/// Liveness check -- always answers `OK` as plain text.
///
/// Only confirms the process is running and responsive. It does not touch
/// the calculator state.
pub async fn health_handler() -> &'static str {
    "OK"
}
