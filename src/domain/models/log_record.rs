//! Log records and severities

use chrono::{DateTime, Local};
use std::fmt;
use tracing::Level;

/// Timestamp layout used in every persisted log line
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Severity of a log record, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Diagnostic detail (TRACE events fold in here)
    Debug,
    /// Normal operation
    Info,
    /// Something unexpected that the application recovered from
    Warning,
    /// A failed operation
    Error,
    /// A failure the application cannot continue from, such as a panic
    Critical,
}

impl Severity {
    /// Upper-case name as written to the log file
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    /// Map a `tracing` level onto a severity.
    ///
    /// `tracing` stops at ERROR, so CRITICAL is carried by an ERROR event
    /// flagged with the `critical` field. TRACE folds into DEBUG.
    pub fn from_tracing(level: Level, critical: bool) -> Self {
        match level {
            Level::ERROR if critical => Self::Critical,
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warning,
            Level::INFO => Self::Info,
            _ => Self::Debug,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A single log event before it is rendered to text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Local time the record was created
    pub timestamp: DateTime<Local>,
    /// Severity shown in the level column
    pub severity: Severity,
    /// Hierarchical source name (module path or `log` target)
    pub source: String,
    /// Message text including structured fields
    pub message: String,
}

impl LogRecord {
    /// Record stamped with the current local time
    pub fn new(severity: Severity, source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now(),
            severity,
            source: source.into(),
            message: message.into(),
        }
    }

    /// Render as `timestamp | LEVEL    | source | message`
    pub fn to_line(&self) -> String {
        format!(
            "{} | {:<8} | {} | {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.severity,
            self.source,
            self.message
        )
    }
}
