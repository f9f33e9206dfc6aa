//! Service layer: calculator state, error taxonomy, and subsystem logging.
//!
//! The pieces compose bottom-up:
//!
//! 1. **Logging** (`logging`): per-logger level gating in front of a sink
//! 2. **Errors** (`error`): one error type carrying status and body shape
//! 3. **Calculator** (`calculator`): stack, ledger, and request numbering

pub mod calculator;
pub mod error;
pub mod logging;

// Re-export key types for convenient access.
pub use calculator::CalculatorService;
pub use error::{ApiError, ContentKind};
pub use logging::{CapturedLine, LogSink, MemorySink, ServiceLogger, TracingSink};
