//! The calculator service: every piece of shared state behind one object.
//!
//! Handlers hold an `Arc<CalculatorService>` through router state and call
//! one method per endpoint. Each method takes the request number, does its
//! own subsystem logging (success and failure), and returns a typed result.
//! Nothing here knows about HTTP; the handlers and the [`ApiError`] response
//! impl own that translation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use stackcalc_core::{
    evaluate, Flavor, HistoryLedger, HistoryRecord, LevelRegistry, LogLevel, LoggerName, Stack,
};

use crate::service::error::ApiError;
use crate::service::logging::{LogSink, ServiceLogger, TracingSink};

/// Shared calculator state plus the loggers that narrate it.
///
/// Locks are only ever taken for short synchronous sections and never held
/// across an await point. The ledger append for a stack action happens under
/// the stack mutex so ledger order matches stack serialization order.
pub struct CalculatorService {
    stack: Mutex<Stack>,
    ledger: RwLock<HistoryLedger>,
    request_counter: AtomicU64,
    log: ServiceLogger,
}

impl CalculatorService {
    /// Service wired to the production `tracing` sink.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(Arc::new(TracingSink))
    }

    /// Service emitting through `sink`. Tests pass a capturing sink.
    #[must_use]
    pub fn with_sink(sink: Arc<dyn LogSink>) -> Self {
        Self {
            stack: Mutex::new(Stack::new()),
            ledger: RwLock::new(HistoryLedger::new()),
            request_counter: AtomicU64::new(0),
            log: ServiceLogger::new(Arc::new(LevelRegistry::new()), sink),
        }
    }

    /// The service loggers, for router-level lines (arrival, duration).
    #[must_use]
    pub fn log(&self) -> &ServiceLogger {
        &self.log
    }

    /// Assigns the next request number. The first request is 1.
    pub fn next_request_id(&self) -> u64 {
        self.request_counter.fetch_add(1, Ordering::Relaxed) + 1
    }

    // ---- Stack flavor ----

    /// Current stack depth.
    pub fn stack_size(&self, request: u64) -> usize {
        let mut content = {
            let stack = self.stack.lock();
            stack.snapshot()
        };
        let size = content.len();
        content.reverse();
        self.log
            .info(LoggerName::Stack, request, format!("Stack size is {size}"));
        self.log.debug(
            LoggerName::Stack,
            request,
            format!("Stack content (first == top): [{}]", join(&content)),
        );
        size
    }

    /// Pushes `values` in list order and returns the new size.
    pub fn push_arguments(&self, request: u64, values: &[i64]) -> usize {
        let (before, after) = {
            let mut stack = self.stack.lock();
            let before = stack.size();
            (before, stack.push_many(values))
        };
        self.log.info(
            LoggerName::Stack,
            request,
            format!(
                "Adding total of {} argument(s) to the stack | Stack size: {after}",
                values.len()
            ),
        );
        self.log.debug(
            LoggerName::Stack,
            request,
            format!(
                "Adding arguments: {} | Stack size before {before} | stack size after {after}",
                join(values)
            ),
        );
        after
    }

    /// Removes `count` values from the top and returns the new size.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if `count` exceeds the current depth.
    pub fn remove_arguments(&self, request: u64, count: usize) -> Result<usize, ApiError> {
        let removed = self.stack.lock().remove_top(count);
        match removed {
            Ok(size) => {
                self.log.info(
                    LoggerName::Stack,
                    request,
                    format!(
                        "Removing total {count} argument(s) from the stack | Stack size: {size}"
                    ),
                );
                Ok(size)
            }
            Err(error) => Err(self.fail(LoggerName::Stack, request, error.into())),
        }
    }

    /// Resolves and performs `operation` against the stack, recording the
    /// action on success.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for an unknown name, too few operands, or a
    /// failed evaluation; the stack is unchanged in every failure case.
    pub fn operate_on_stack(&self, request: u64, operation: &str) -> Result<i64, ApiError> {
        let outcome = {
            let mut stack = self.stack.lock();
            let outcome = stack.operate(operation);
            if let Ok(done) = &outcome {
                self.ledger.write().append(HistoryRecord {
                    flavor: Flavor::Stack,
                    operation: operation.to_string(),
                    arguments: done.arguments.clone(),
                    result: done.result,
                });
            }
            outcome
        };
        match outcome {
            Ok(done) => {
                self.log.info(
                    LoggerName::Stack,
                    request,
                    format!(
                        "Performing operation {operation}. Result is {} | stack size: {}",
                        done.result, done.remaining
                    ),
                );
                self.log.debug(
                    LoggerName::Stack,
                    request,
                    format!(
                        "Performing operation: {operation}({}) = {}",
                        join(&done.arguments),
                        done.result
                    ),
                );
                Ok(done.result)
            }
            Err(error) => Err(self.fail(LoggerName::Stack, request, error.into())),
        }
    }

    // ---- Independent flavor ----

    /// Evaluates an operation carried entirely by the request, recording the
    /// action on success. The stack is never consulted.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` when any validation step or the arithmetic fails.
    pub fn calculate_independent(
        &self,
        request: u64,
        operation: &str,
        arguments: &[Value],
    ) -> Result<i64, ApiError> {
        match evaluate(operation, arguments) {
            Ok(evaluation) => {
                self.ledger.write().append(HistoryRecord {
                    flavor: Flavor::Independent,
                    operation: operation.to_string(),
                    arguments: evaluation.arguments.clone(),
                    result: evaluation.result,
                });
                self.log.info(
                    LoggerName::Independent,
                    request,
                    format!(
                        "Performing operation {operation}. Result is {}",
                        evaluation.result
                    ),
                );
                self.log.debug(
                    LoggerName::Independent,
                    request,
                    format!(
                        "Performing operation: {operation}({}) = {}",
                        join(&evaluation.arguments),
                        evaluation.result
                    ),
                );
                Ok(evaluation.result)
            }
            Err(error) => Err(self.fail(LoggerName::Independent, request, error.into())),
        }
    }

    // ---- History ----

    /// Recorded actions, optionally filtered by flavor. `None` returns both
    /// flavors in chronological order.
    pub fn history(&self, request: u64, flavor: Option<Flavor>) -> Vec<HistoryRecord> {
        let (records, stack_total, independent_total) = {
            let ledger = self.ledger.read();
            (
                ledger.query(flavor),
                ledger.count(Flavor::Stack),
                ledger.count(Flavor::Independent),
            )
        };
        if flavor != Some(Flavor::Independent) {
            self.log.info(
                LoggerName::Stack,
                request,
                format!("History: So far total {stack_total} stack actions"),
            );
        }
        if flavor != Some(Flavor::Stack) {
            self.log.info(
                LoggerName::Independent,
                request,
                format!("History: So far total {independent_total} independent actions"),
            );
        }
        records
    }

    // ---- Logger registry ----

    /// Current threshold of the named logger.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::UnknownLogger` for a name outside the closed set.
    pub fn log_level(&self, request: u64, name: &str) -> Result<LogLevel, ApiError> {
        match LoggerName::parse(name) {
            Some(logger) => Ok(self.log.levels().level(logger)),
            None => Err(self.fail(
                LoggerName::Request,
                request,
                ApiError::UnknownLogger(name.to_string()),
            )),
        }
    }

    /// Replaces the named logger's threshold. The logger is validated before
    /// the level, so an unknown logger wins over an invalid level.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` for an unknown logger or a level value other than
    /// the exact uppercase names.
    pub fn set_log_level(
        &self,
        request: u64,
        name: &str,
        value: &str,
    ) -> Result<LogLevel, ApiError> {
        let Some(logger) = LoggerName::parse(name) else {
            return Err(self.fail(
                LoggerName::Request,
                request,
                ApiError::UnknownLogger(name.to_string()),
            ));
        };
        let Some(level) = LogLevel::parse(value) else {
            return Err(self.fail(LoggerName::Request, request, ApiError::InvalidLoggerLevel));
        };
        self.log.levels().set_level(logger, level);
        Ok(level)
    }

    // ---- Failure reporting ----

    /// Logs a failure at ERROR on the owning subsystem's logger and hands
    /// the error back for the response path.
    pub fn fail(&self, owner: LoggerName, request: u64, error: ApiError) -> ApiError {
        self.log.error(
            owner,
            request,
            format!("Server encountered an error ! message: {error}"),
        );
        error
    }

    /// Logs an uncaught failure on the request logger and wraps it into the
    /// generic 500 error. The log line and the response body share the same
    /// wording.
    pub fn fail_unexpected(&self, request: u64, detail: String) -> ApiError {
        let error = ApiError::Unexpected(detail);
        self.log
            .error(LoggerName::Request, request, error.to_string());
        error
    }
}

impl Default for CalculatorService {
    fn default() -> Self {
        Self::new()
    }
}

/// Comma-space joined rendering used by the log lines.
fn join(values: &[i64]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
