//! Log destination port

use std::fmt;
use std::io;
use std::path::Path;
use tracing::level_filters::LevelFilter;

/// Port trait for a log destination
///
/// A sink receives records that have already been formatted and sanitized.
/// Every call to [`LogSink::write_record`] carries exactly one complete
/// record (including its trailing newline), so implementations can treat
/// each call as an atomic unit.
///
/// Implementations must be safe to call concurrently from any thread
/// without caller-side locking.
///
/// # Examples
///
/// ```
/// use std::io;
/// use whisper_writer_logging::domain::ports::LogSink;
///
/// #[derive(Debug)]
/// struct Discard;
///
/// impl LogSink for Discard {
///     fn write_record(&self, _record: &[u8]) -> io::Result<()> {
///         Ok(())
///     }
/// }
///
/// assert!(Discard.path().is_none());
/// ```
pub trait LogSink: Send + Sync + fmt::Debug {
    /// Persist one formatted record
    ///
    /// # Errors
    /// Returns the underlying I/O error. Callers of the logging macros never
    /// observe it; the subscriber reports it on stderr and moves on.
    fn write_record(&self, record: &[u8]) -> io::Result<()>;

    /// File backing this sink, if any
    ///
    /// Used as the sink's identity: a registry holds at most one sink per path.
    fn path(&self) -> Option<&Path> {
        None
    }

    /// Most verbose level this sink accepts
    fn max_level(&self) -> LevelFilter {
        LevelFilter::TRACE
    }

    /// Flush buffered output
    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}
