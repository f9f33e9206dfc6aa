//! Stackcalc server: HTTP calculator with a shared stack, a history ledger,
//! and per-logger runtime log levels.

pub mod network;
pub mod service;

pub use network::{build_router, AppState, NetworkConfig, NetworkModule};
pub use service::{ApiError, CalculatorService};
