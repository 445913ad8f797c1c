//! Domain models

pub mod log_record;

pub use log_record::{LogRecord, Severity, TIMESTAMP_FORMAT};
