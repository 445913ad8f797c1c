//! In-memory log destination

use crate::domain::ports::LogSink;
use std::io;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::level_filters::LevelFilter;

/// Sink keeping every record in memory
///
/// Stands in for the log file in tests, or backs an in-app log viewer.
#[derive(Debug)]
pub struct MemorySink {
    records: Mutex<Vec<String>>,
    level: LevelFilter,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySink {
    /// Empty sink accepting every level
    pub const fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            level: LevelFilter::TRACE,
        }
    }

    /// Restrict the sink to events at `level` or more severe
    #[must_use]
    pub fn with_max_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Records in arrival order, each with its trailing newline
    pub fn lines(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// All records concatenated
    pub fn contents(&self) -> String {
        self.lock().concat()
    }

    /// Number of records captured
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing was captured yet
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LogSink for MemorySink {
    fn write_record(&self, record: &[u8]) -> io::Result<()> {
        self.lock().push(String::from_utf8_lossy(record).into_owned());
        Ok(())
    }

    fn max_level(&self) -> LevelFilter {
        self.level
    }
}
