//! Logging infrastructure
//!
//! Persistent logging using tracing and tracing-subscriber:
//! - Sanitized `timestamp | LEVEL | source | message` lines
//! - Size-based file rotation with numbered backups
//! - Quiet thresholds for chatty dependencies
//! - Panic recording

pub mod config;
pub mod format;
pub mod logger;
pub mod memory;
pub mod panic_hook;
pub mod registry;
pub mod rotation;
pub mod sanitizer;

pub use config::{get_log_path, parse_log_level, LogConfig};
pub use format::{SanitizingFormat, CRITICAL_FIELD};
pub use logger::{attach_log_file, build_layer, setup, setup_with, try_setup_with, SetupOutcome};
pub use memory::MemorySink;
pub use panic_hook::install_exception_hook;
pub use registry::{FanOutWriter, SinkRegistry};
pub use rotation::{RotatingFileSink, RotationPolicy};
pub use sanitizer::sanitize;

/// Log an event at CRITICAL severity
///
/// Takes the same arguments as [`tracing::error!`]; the event is marked
/// with the `critical` field so it renders as `CRITICAL`.
///
/// ```
/// whisper_writer_logging::critical!("audio backend lost: {}", "device removed");
/// whisper_writer_logging::critical!(target: "whisper_writer::audio", "stream closed");
/// ```
#[macro_export]
macro_rules! critical {
    (target: $target:expr, $($arg:tt)+) => {
        $crate::tracing::error!(target: $target, critical = true, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::tracing::error!(critical = true, $($arg)+)
    };
}
