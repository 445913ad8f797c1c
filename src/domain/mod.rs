//! Domain layer for the logging facility
//!
//! Log records, severities, the sink port and error types. Nothing here
//! touches the filesystem or the global subscriber.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{LoggingError, LoggingResult};
