//! WhisperWriter logging - persistent, sanitized, rotating application logs
//!
//! Every log event in the process is rendered as
//! `YYYY-MM-DD HH:MM:SS | LEVEL    | source | message`, stripped of long
//! binary/hex payloads, capped in length, and appended to
//! `<cwd>/logs/whisper-writer.log`, which rotates at 2 MiB with three
//! numbered backups.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): log records, severities, the `LogSink` port
//! - **Infrastructure Layer** (`infrastructure`): sanitizer, rotating file
//!   sink, sink registry, subscriber setup and panic hook
//!
//! # Example
//!
//! ```no_run
//! whisper_writer_logging::setup();
//! whisper_writer_logging::install_exception_hook();
//!
//! tracing::info!("recording started");
//! println!("logs: {}", whisper_writer_logging::get_log_path().display());
//! ```

pub mod domain;
pub mod infrastructure;

#[doc(hidden)]
pub use tracing;

// Re-export commonly used types for convenience
pub use domain::models::{LogRecord, Severity};
pub use domain::ports::LogSink;
pub use domain::{LoggingError, LoggingResult};
pub use infrastructure::logging::{
    get_log_path, install_exception_hook, sanitize, setup, setup_with, try_setup_with, LogConfig,
    MemorySink, RotatingFileSink, RotationPolicy, SetupOutcome, SinkRegistry,
};
