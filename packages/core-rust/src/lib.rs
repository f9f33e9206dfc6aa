//! Stackcalc core: calculator operations, the evaluation pipeline, the LIFO
//! stack engine, the action history ledger, and runtime log levels.
//!
//! Everything here is transport-agnostic. The HTTP server crate wraps these
//! types in shared state and translates their error enums onto the wire.

pub mod context;
pub mod eval;
pub mod history;
pub mod levels;
pub mod ops;
pub mod stack;

pub use context::RequestContext;
pub use eval::{evaluate, EvalError, Evaluation};
pub use history::{Flavor, HistoryLedger, HistoryRecord};
pub use levels::{LevelRegistry, LogLevel, LoggerName};
pub use ops::{ApplyError, Operation};
pub use stack::{OperateOutcome, Stack, StackError};
