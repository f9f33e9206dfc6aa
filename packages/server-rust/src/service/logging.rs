//! Service loggers and the sink they emit through.
//!
//! The three loggers (`request-logger`, `stack-logger`, `independent-logger`)
//! are gated by [`LevelRegistry`] thresholds before anything reaches the
//! sink. Production uses [`TracingSink`]; tests swap in [`MemorySink`] to
//! assert on exact lines and on suppression.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use stackcalc_core::{LevelRegistry, LogLevel, LoggerName};

/// Destination for emissions that passed their logger's threshold.
pub trait LogSink: Send + Sync {
    fn emit(&self, logger: LoggerName, level: LogLevel, request: u64, message: &str);
}

/// Production sink: forwards to `tracing` events carrying the logger name
/// and request number as fields. The subscriber's own filtering is an
/// operator concern and sits behind the registry gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, logger: LoggerName, level: LogLevel, request: u64, message: &str) {
        match level {
            LogLevel::Debug => {
                tracing::debug!(logger = logger.as_str(), request, "{message}");
            }
            LogLevel::Info => {
                tracing::info!(logger = logger.as_str(), request, "{message}");
            }
            LogLevel::Error => {
                tracing::error!(logger = logger.as_str(), request, "{message}");
            }
        }
    }
}

/// One line captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLine {
    pub logger: LoggerName,
    pub level: LogLevel,
    pub request: u64,
    pub message: String,
}

/// Capturing sink for tests: records every line that passed the threshold.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<CapturedLine>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything captured so far, in emission order.
    #[must_use]
    pub fn lines(&self) -> Vec<CapturedLine> {
        self.lines.lock().clone()
    }

    /// Messages captured for one logger, in emission order.
    #[must_use]
    pub fn messages(&self, logger: LoggerName) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|line| line.logger == logger)
            .map(|line| line.message.clone())
            .collect()
    }
}

impl LogSink for MemorySink {
    fn emit(&self, logger: LoggerName, level: LogLevel, request: u64, message: &str) {
        self.lines.lock().push(CapturedLine {
            logger,
            level,
            request,
            message: message.to_string(),
        });
    }
}

/// The gate in front of the sink. Cheap to clone and share.
#[derive(Clone)]
pub struct ServiceLogger {
    levels: Arc<LevelRegistry>,
    sink: Arc<dyn LogSink>,
}

impl ServiceLogger {
    #[must_use]
    pub fn new(levels: Arc<LevelRegistry>, sink: Arc<dyn LogSink>) -> Self {
        Self { levels, sink }
    }

    /// The thresholds this logger consults.
    #[must_use]
    pub fn levels(&self) -> &LevelRegistry {
        &self.levels
    }

    pub fn debug(&self, logger: LoggerName, request: u64, message: String) {
        self.log(logger, LogLevel::Debug, request, &message);
    }

    pub fn info(&self, logger: LoggerName, request: u64, message: String) {
        self.log(logger, LogLevel::Info, request, &message);
    }

    pub fn error(&self, logger: LoggerName, request: u64, message: String) {
        self.log(logger, LogLevel::Error, request, &message);
    }

    fn log(&self, logger: LoggerName, level: LogLevel, request: u64, message: &str) {
        if self.levels.enabled(logger, level) {
            self.sink.emit(logger, level, request, message);
        }
    }
}

impl fmt::Debug for ServiceLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceLogger")
            .field("levels", &self.levels)
            .finish_non_exhaustive()
    }
}
