//! Subscriber setup for persistent logging

use super::config::LogConfig;
use super::format::SanitizingFormat;
use super::registry::SinkRegistry;
use super::rotation::{RotatingFileSink, RotationPolicy};
use crate::domain::errors::{LoggingError, LoggingResult};
use crate::domain::ports::LogSink;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::Subscriber;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

static GLOBAL_SUBSCRIBER: OnceLock<Result<(), String>> = OnceLock::new();

/// Result of attaching the rotating log file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupOutcome {
    /// A new rotating file destination was attached
    Attached(PathBuf),
    /// A destination for this path was already attached; nothing changed
    AlreadyAttached(PathBuf),
}

impl SetupOutcome {
    /// Path of the log file either way
    pub fn path(&self) -> &Path {
        match self {
            Self::Attached(path) | Self::AlreadyAttached(path) => path,
        }
    }
}

/// Initialize persistent logging with the default configuration
///
/// Safe to call any number of times from any entry point: the rotating
/// file is attached once per path and the global subscriber is installed
/// once per process. Never panics; failures are reported on stderr and the
/// application keeps running without a log file.
pub fn setup() {
    setup_with(&LogConfig::default());
}

/// [`setup`] with an explicit configuration
pub fn setup_with(config: &LogConfig) {
    if let Err(err) = try_setup_with(config) {
        eprintln!("whisper-writer: persistent logging unavailable: {err:#}");
    }
}

/// Fallible form of [`setup_with`]
///
/// Attaches the rotating file to [`SinkRegistry::global`] and installs the
/// global subscriber on first use. The first successful call decides the
/// quiet targets and levels of the global subscriber.
pub fn try_setup_with(config: &LogConfig) -> Result<SetupOutcome> {
    config.validate().context("invalid logging configuration")?;

    let registry = SinkRegistry::global();
    let attached = attach_log_file(registry, config);
    install_global_subscriber(registry, config)?;
    let outcome = attached?;

    if let SetupOutcome::Attached(path) = &outcome {
        tracing::debug!(path = %path.display(), "persistent logging enabled");
    }

    Ok(outcome)
}

/// Attach a rotating file destination for `config` to `registry`
///
/// Does nothing when a destination for the same resolved path is already
/// attached. A failure to create the log directory is ignored; it only
/// shows up as the open failure that follows.
pub fn attach_log_file(registry: &SinkRegistry, config: &LogConfig) -> Result<SetupOutcome> {
    let path = config.log_path();
    let level = config.file_level()?;
    let policy = RotationPolicy::new(config.max_bytes, config.backup_count);

    let attached = registry
        .attach_with(&path, || {
            if let Some(dir) = path.parent() {
                let _ = std::fs::create_dir_all(dir);
            }
            let sink = RotatingFileSink::open(&path, policy)?.with_max_level(level);
            Ok::<_, LoggingError>(Arc::new(sink) as Arc<dyn LogSink>)
        })
        .with_context(|| format!("failed to attach log file {}", path.display()))?;

    Ok(if attached {
        SetupOutcome::Attached(path)
    } else {
        SetupOutcome::AlreadyAttached(path)
    })
}

/// Build the filtering and formatting layer writing into `registry`
///
/// Events below `config.level` are dropped, and targets listed in
/// `config.quiet_targets` only pass at `config.quiet_level` or above.
/// Applications that assemble their own subscriber can add this layer
/// instead of calling [`setup`].
pub fn build_layer<S>(
    registry: SinkRegistry,
    config: &LogConfig,
) -> LoggingResult<impl Layer<S> + Send + Sync + 'static>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let quiet_level = config.quiet_level_filter()?;
    let filter = Targets::new()
        .with_default(config.file_level()?)
        .with_targets(
            config
                .quiet_targets
                .iter()
                .map(|target| (target.clone(), quiet_level)),
        );

    let fmt_layer = tracing_subscriber::fmt::layer()
        .event_format(SanitizingFormat::new())
        .with_ansi(false)
        .with_writer(registry);

    Ok(filter.and_then(fmt_layer))
}

fn install_global_subscriber(registry: &SinkRegistry, config: &LogConfig) -> Result<()> {
    GLOBAL_SUBSCRIBER
        .get_or_init(|| {
            let layer = build_layer(registry.clone(), config).map_err(|err| err.to_string())?;
            tracing_subscriber::registry()
                .with(layer)
                .try_init()
                .map_err(|err| err.to_string())
        })
        .clone()
        .map_err(|reason| anyhow::anyhow!("global subscriber not installed: {reason}"))
}

// Re-export tracing macros for convenience
pub use tracing::{debug, error, info, trace, warn};
