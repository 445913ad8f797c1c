//! Size-based log file rotation
//!
//! The active file is rotated before a record would push it to
//! `max_bytes`. Backups are numbered: the most recent is `<file>.1`, the
//! oldest `<file>.<backup_count>`; anything older is dropped. With no
//! backups configured the file is never rotated and keeps growing.

use crate::domain::errors::{LoggingError, LoggingResult};
use crate::domain::ports::LogSink;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::level_filters::LevelFilter;

/// Rotation limits for a [`RotatingFileSink`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Maximum size of the active file in bytes (0 disables rotation)
    pub max_bytes: u64,
    /// Number of numbered backups to keep (0 disables rotation)
    pub backup_count: usize,
}

impl RotationPolicy {
    /// Policy with the given size limit and backup count
    pub const fn new(max_bytes: u64, backup_count: usize) -> Self {
        Self {
            max_bytes,
            backup_count,
        }
    }

    /// Whether writing `incoming` bytes onto a file of `current` bytes
    /// requires rotating first
    ///
    /// An empty file is never rotated, even for a record larger than the
    /// limit. Rotation is off when either `max_bytes` or `backup_count` is
    /// zero, so records are never discarded by a rollover.
    pub const fn should_rotate(&self, current: u64, incoming: u64) -> bool {
        self.max_bytes > 0
            && self.backup_count > 0
            && current > 0
            && current + incoming >= self.max_bytes
    }
}

#[derive(Debug)]
struct ActiveFile {
    file: Option<File>,
    size: u64,
}

/// Log destination writing to a size-bounded, rotating file
///
/// One mutex guards the open file and its size, so the rotation check and
/// the write of a record happen as one step.
#[derive(Debug)]
pub struct RotatingFileSink {
    path: PathBuf,
    policy: RotationPolicy,
    level: LevelFilter,
    active: Mutex<ActiveFile>,
}

impl RotatingFileSink {
    /// Open (or create) the active file in append mode
    ///
    /// The parent directory must already exist.
    pub fn open(path: impl Into<PathBuf>, policy: RotationPolicy) -> LoggingResult<Self> {
        let path = path.into();
        let (file, size) = open_append(&path).map_err(|source| LoggingError::OpenFailed {
            path: path.clone(),
            source,
        })?;

        Ok(Self {
            path,
            policy,
            level: LevelFilter::TRACE,
            active: Mutex::new(ActiveFile {
                file: Some(file),
                size,
            }),
        })
    }

    /// Restrict the sink to events at `level` or more severe
    #[must_use]
    pub fn with_max_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Rotation limits of this sink
    pub const fn policy(&self) -> RotationPolicy {
        self.policy
    }

    /// Path of the numbered backup `index` (1 is the most recent)
    pub fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    /// Bytes currently in the active file
    pub fn current_size(&self) -> u64 {
        self.lock().size
    }

    fn lock(&self) -> MutexGuard<'_, ActiveFile> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn rotate(&self, active: &mut ActiveFile) -> LoggingResult<()> {
        // close before renaming
        active.file = None;

        let rotated = self.shift_backups();

        // reopen even after a failed shift so later records still land somewhere
        let reopened = open_append(&self.path);
        if let Ok((file, size)) = reopened {
            active.file = Some(file);
            active.size = size;
        }

        rotated.map_err(|source| LoggingError::RotationFailed {
            path: self.path.clone(),
            source,
        })
    }

    fn shift_backups(&self) -> io::Result<()> {
        for index in (1..self.policy.backup_count).rev() {
            let from = self.backup_path(index);
            if from.exists() {
                replace(&from, &self.backup_path(index + 1))?;
            }
        }

        if self.path.exists() {
            replace(&self.path, &self.backup_path(1))?;
        }

        Ok(())
    }
}

impl LogSink for RotatingFileSink {
    fn write_record(&self, record: &[u8]) -> io::Result<()> {
        let mut active = self.lock();
        let incoming = record.len() as u64;

        if self.policy.should_rotate(active.size, incoming) {
            self.rotate(&mut active).map_err(io::Error::other)?;
        }

        if active.file.is_none() {
            let (file, size) = open_append(&self.path)?;
            active.file = Some(file);
            active.size = size;
        }

        if let Some(file) = active.file.as_mut() {
            file.write_all(record)?;
            active.size += incoming;
        }

        Ok(())
    }

    fn path(&self) -> Option<&Path> {
        Some(&self.path)
    }

    fn max_level(&self) -> LevelFilter {
        self.level
    }

    fn flush(&self) -> io::Result<()> {
        match self.lock().file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

fn open_append(path: &Path) -> io::Result<(File, u64)> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let size = file.metadata()?.len();
    Ok((file, size))
}

fn replace(from: &Path, to: &Path) -> io::Result<()> {
    if to.exists() {
        fs::remove_file(to)?;
    }
    fs::rename(from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(n: usize, width: usize) -> Vec<u8> {
        let mut line = format!("record {n:05} ");
        line.push_str(&"-".repeat(width.saturating_sub(line.len() + 1)));
        line.push('\n');
        line.into_bytes()
    }

    #[test]
    fn test_should_rotate() {
        let policy = RotationPolicy::new(1024, 3);

        assert!(!policy.should_rotate(0, 4096));
        assert!(!policy.should_rotate(1000, 23));
        assert!(policy.should_rotate(1000, 24));
        assert!(policy.should_rotate(2048, 1));
        assert!(!RotationPolicy::new(0, 3).should_rotate(1 << 30, 1));
        assert!(!RotationPolicy::new(1024, 0).should_rotate(1 << 30, 1));
    }

    #[test]
    fn test_open_creates_file_and_reads_size() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("test.log");
        std::fs::write(&log_path, b"existing\n").unwrap();

        let sink = RotatingFileSink::open(&log_path, RotationPolicy::new(1024, 3)).unwrap();
        assert_eq!(sink.current_size(), 9);
        assert_eq!(sink.path(), Some(log_path.as_path()));

        let missing = temp_dir.path().join("fresh.log");
        let sink = RotatingFileSink::open(&missing, RotationPolicy::new(1024, 3)).unwrap();
        assert!(missing.exists());
        assert_eq!(sink.current_size(), 0);
    }

    #[test]
    fn test_open_fails_without_directory() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("missing").join("test.log");

        let result = RotatingFileSink::open(&log_path, RotationPolicy::new(1024, 3));
        assert!(matches!(result, Err(LoggingError::OpenFailed { .. })));
    }

    #[test]
    fn test_backup_path_naming() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("whisper-writer.log");
        let sink = RotatingFileSink::open(&log_path, RotationPolicy::new(1024, 3)).unwrap();

        assert_eq!(
            sink.backup_path(2),
            temp_dir.path().join("whisper-writer.log.2")
        );
    }

    #[test]
    fn test_rotation_moves_active_to_first_backup() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("test.log");
        let sink = RotatingFileSink::open(&log_path, RotationPolicy::new(1024, 3)).unwrap();

        let first = record(1, 600);
        let second = record(2, 600);
        sink.write_record(&first).unwrap();
        sink.write_record(&second).unwrap();

        assert_eq!(std::fs::read(sink.backup_path(1)).unwrap(), first);
        assert_eq!(std::fs::read(&log_path).unwrap(), second);
        assert_eq!(sink.current_size(), 600);
    }

    #[test]
    fn test_backups_never_exceed_count() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("test.log");
        let sink = RotatingFileSink::open(&log_path, RotationPolicy::new(1024, 3)).unwrap();

        // every record fills more than half a file, so each write rotates
        for n in 0..8 {
            sink.write_record(&record(n, 600)).unwrap();
        }

        let mut names: Vec<String> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["test.log", "test.log.1", "test.log.2", "test.log.3"]);

        // newest in the active file, then .1 .. .3 in age order
        assert_eq!(std::fs::read(&log_path).unwrap(), record(7, 600));
        assert_eq!(std::fs::read(sink.backup_path(1)).unwrap(), record(6, 600));
        assert_eq!(std::fs::read(sink.backup_path(3)).unwrap(), record(4, 600));
    }

    #[test]
    fn test_two_mebibyte_default_threshold() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("whisper-writer.log");
        let sink = RotatingFileSink::open(&log_path, RotationPolicy::new(2 * 1024 * 1024, 3)).unwrap();

        let line = record(0, 1024);
        for _ in 0..2047 {
            sink.write_record(&line).unwrap();
        }
        assert!(!sink.backup_path(1).exists());

        // the 2048th KiB would reach the limit
        sink.write_record(&line).unwrap();
        assert!(sink.backup_path(1).exists());
        assert_eq!(std::fs::metadata(sink.backup_path(1)).unwrap().len(), 2047 * 1024);
        assert_eq!(std::fs::metadata(&log_path).unwrap().len(), 1024);
    }

    #[test]
    fn test_zero_backups_keeps_growing() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("test.log");
        let sink = RotatingFileSink::open(&log_path, RotationPolicy::new(1024, 0)).unwrap();

        for n in 0..4 {
            sink.write_record(&record(n, 600)).unwrap();
        }

        let contents = std::fs::read(&log_path).unwrap();
        let expected: Vec<u8> = (0..4).flat_map(|n| record(n, 600)).collect();
        assert_eq!(contents, expected);
        assert_eq!(sink.current_size(), 2400);
        assert!(!sink.backup_path(1).exists());
    }

    #[test]
    fn test_oversized_record_on_empty_file_is_written() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("test.log");
        let sink = RotatingFileSink::open(&log_path, RotationPolicy::new(100, 3)).unwrap();

        sink.write_record(&record(1, 500)).unwrap();

        assert!(!sink.backup_path(1).exists());
        assert_eq!(sink.current_size(), 500);
    }
}
