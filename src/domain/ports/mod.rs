//! Port trait definitions (Hexagonal Architecture)
//!
//! - LogSink: destination for formatted, sanitized log records

pub mod log_sink;

pub use log_sink::LogSink;
