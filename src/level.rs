//! Severity levels and the level gate
//!
//! Levels are totally ordered `Debug < Info < Warn < Error < Panic`. A record
//! passes the gate when its level is at or above the configured one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LogError;

/// Log severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Panic,
}

impl Level {
    /// All levels, lowest first
    pub const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Panic,
    ];

    /// Lowercase name used in configuration and structured output
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Panic => "panic",
        }
    }

    /// Uppercase label used by the console encoder
    pub fn label(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Panic => "PANIC",
        }
    }

    /// Position in the total order, starting at 0 for `Debug`
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    /// Parse a level name, case-insensitively
    pub fn parse(name: &str) -> Option<Level> {
        match name.trim().to_ascii_lowercase().as_str() {
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "panic" => Some(Level::Panic),
            _ => None,
        }
    }

    /// Whether records at this level carry a stacktrace
    pub fn wants_stacktrace(&self) -> bool {
        *self >= Level::Error
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::parse(s).ok_or_else(|| LogError::Config(format!("unknown log level {:?}", s)))
    }
}

impl From<Level> for tracing::Level {
    fn from(level: Level) -> Self {
        match level {
            Level::Debug => tracing::Level::DEBUG,
            Level::Info => tracing::Level::INFO,
            Level::Warn => tracing::Level::WARN,
            Level::Error | Level::Panic => tracing::Level::ERROR,
        }
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE | tracing::Level::DEBUG => Level::Debug,
            tracing::Level::INFO => Level::Info,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::ERROR => Level::Error,
        }
    }
}

/// Filter that suppresses records below a configured level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelGate {
    min: Level,
}

impl LevelGate {
    pub fn new(min: Level) -> Self {
        Self { min }
    }

    /// Build a gate from a level name, falling back to `Info` for unknown names
    pub fn from_name(name: &str) -> Self {
        Self::new(Level::parse(name).unwrap_or(Level::Info))
    }

    /// Build a gate from a level name, rejecting unknown names
    pub fn strict(name: &str) -> Result<Self, LogError> {
        name.parse().map(Self::new)
    }

    pub fn min_level(&self) -> Level {
        self.min
    }

    /// Whether a record at `level` should be emitted
    pub fn allows(&self, level: Level) -> bool {
        level >= self.min
    }
}

impl Default for LevelGate {
    fn default() -> Self {
        Self::new(Level::Info)
    }
}
