//! Runtime log levels for the three service loggers.
//!
//! Each logger has an independent severity threshold held in an atomic, so
//! emission checks on the hot path never take a lock. The threshold is the
//! minimum severity that gets recorded; everything below it is suppressed.

use std::sync::atomic::{AtomicU8, Ordering};

/// Message severity. Ordered `Debug < Info < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Error,
}

impl LogLevel {
    /// Wire name, also used in plain-text responses.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Error => "ERROR",
        }
    }

    /// Parses the exact uppercase wire names. Lowercase or mixed-case input
    /// is rejected.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "DEBUG" => Some(Self::Debug),
            "INFO" => Some(Self::Info),
            "ERROR" => Some(Self::Error),
            _ => None,
        }
    }

    fn encode(self) -> u8 {
        match self {
            Self::Debug => 0,
            Self::Info => 1,
            Self::Error => 2,
        }
    }

    fn decode(raw: u8) -> Self {
        match raw {
            0 => Self::Debug,
            2 => Self::Error,
            _ => Self::Info,
        }
    }
}

/// The closed set of service loggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoggerName {
    /// Request lifecycle: arrival, duration, transport-level failures.
    Request,
    /// The stack-based calculator flavor.
    Stack,
    /// The independent calculator flavor.
    Independent,
}

impl LoggerName {
    /// Every logger, in registry order.
    pub const ALL: [Self; 3] = [Self::Request, Self::Stack, Self::Independent];

    /// Wire name of the logger.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Request => "request-logger",
            Self::Stack => "stack-logger",
            Self::Independent => "independent-logger",
        }
    }

    /// Parses the exact wire name.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|name| name.as_str() == text)
    }

    /// Threshold the logger starts with.
    #[must_use]
    pub fn default_level(self) -> LogLevel {
        match self {
            Self::Request | Self::Stack => LogLevel::Info,
            Self::Independent => LogLevel::Debug,
        }
    }

    fn index(self) -> usize {
        match self {
            Self::Request => 0,
            Self::Stack => 1,
            Self::Independent => 2,
        }
    }
}

/// Per-logger severity thresholds, replaceable at runtime.
#[derive(Debug)]
pub struct LevelRegistry {
    levels: [AtomicU8; 3],
}

impl LevelRegistry {
    /// A registry with every logger at its default threshold.
    #[must_use]
    pub fn new() -> Self {
        Self {
            levels: LoggerName::ALL.map(|name| AtomicU8::new(name.default_level().encode())),
        }
    }

    /// Current threshold of a logger.
    #[must_use]
    pub fn level(&self, logger: LoggerName) -> LogLevel {
        LogLevel::decode(self.levels[logger.index()].load(Ordering::Relaxed))
    }

    /// Atomically replaces a logger's threshold. Emissions that observe the
    /// store use the new threshold.
    pub fn set_level(&self, logger: LoggerName, level: LogLevel) {
        self.levels[logger.index()].store(level.encode(), Ordering::Relaxed);
    }

    /// Whether an emission at `level` passes the logger's threshold.
    #[must_use]
    pub fn enabled(&self, logger: LoggerName, level: LogLevel) -> bool {
        level >= self.level(logger)
    }
}

impl Default for LevelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
