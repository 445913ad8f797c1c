//! Logging configuration and fixed file locations

use crate::domain::errors::{LoggingError, LoggingResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::level_filters::LevelFilter;

/// Directory, relative to the working directory, holding the log files
pub const LOG_DIR: &str = "logs";
/// Active log file name
pub const LOG_FILE_NAME: &str = "whisper-writer.log";
/// Size at which the active file is rotated (2 MiB)
pub const LOG_MAX_BYTES: u64 = 2 * 1024 * 1024;
/// Number of numbered backups kept next to the active file
pub const LOG_BACKUP_COUNT: usize = 3;

/// Dependency namespaces that only get WARN and above
///
/// UI toolkit, input hook, HTTP client, audio I/O and numeric arrays.
pub const NOISY_TARGETS: &[&str] = &["winit", "rdev", "reqwest", "hyper", "cpal", "ndarray"];

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Directory for log files, resolved against the working directory
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Active log file name
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Rotate once the active file would reach this many bytes (0 disables)
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    /// Rotated backups to keep
    #[serde(default = "default_backup_count")]
    pub backup_count: usize,

    /// Minimum level written to the file (trace, debug, info, warn, error)
    #[serde(default = "default_level")]
    pub level: String,

    /// Targets restricted to `quiet_level`
    #[serde(default = "default_quiet_targets")]
    pub quiet_targets: Vec<String>,

    /// Minimum level for `quiet_targets`
    #[serde(default = "default_quiet_level")]
    pub quiet_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            file_name: default_file_name(),
            max_bytes: default_max_bytes(),
            backup_count: default_backup_count(),
            level: default_level(),
            quiet_targets: default_quiet_targets(),
            quiet_level: default_quiet_level(),
        }
    }
}

impl LogConfig {
    /// Configuration writing into `dir` instead of `<cwd>/logs`
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: dir.into(),
            ..Self::default()
        }
    }

    /// Absolute path of the active log file
    ///
    /// Relative directories are resolved against the current working
    /// directory. If that cannot be read, the relative path is returned.
    pub fn log_path(&self) -> PathBuf {
        let path = self.log_dir.join(&self.file_name);
        std::path::absolute(&path).unwrap_or(path)
    }

    /// Validate configuration values
    pub fn validate(&self) -> LoggingResult<()> {
        parse_log_level(&self.level)?;
        parse_log_level(&self.quiet_level)?;

        if self.file_name.trim().is_empty() {
            return Err(LoggingError::EmptyFileName);
        }

        Ok(())
    }

    pub(crate) fn file_level(&self) -> LoggingResult<LevelFilter> {
        parse_log_level(&self.level)
    }

    pub(crate) fn quiet_level_filter(&self) -> LoggingResult<LevelFilter> {
        parse_log_level(&self.quiet_level)
    }
}

/// Parse a level name into a filter
///
/// Accepts the `tracing` names plus `warning` and `critical`, which is
/// filtered as `error`.
pub fn parse_log_level(level: &str) -> LoggingResult<LevelFilter> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(LevelFilter::TRACE),
        "debug" => Ok(LevelFilter::DEBUG),
        "info" => Ok(LevelFilter::INFO),
        "warn" | "warning" => Ok(LevelFilter::WARN),
        "error" | "critical" => Ok(LevelFilter::ERROR),
        "off" => Ok(LevelFilter::OFF),
        _ => Err(LoggingError::InvalidLogLevel(level.to_string())),
    }
}

/// Resolved path of the default log file, for display to the user
pub fn get_log_path() -> PathBuf {
    LogConfig::default().log_path()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(LOG_DIR)
}

fn default_file_name() -> String {
    LOG_FILE_NAME.to_string()
}

const fn default_max_bytes() -> u64 {
    LOG_MAX_BYTES
}

const fn default_backup_count() -> usize {
    LOG_BACKUP_COUNT
}

fn default_level() -> String {
    "debug".to_string()
}

fn default_quiet_targets() -> Vec<String> {
    NOISY_TARGETS.iter().map(ToString::to_string).collect()
}

fn default_quiet_level() -> String {
    "warn".to_string()
}
