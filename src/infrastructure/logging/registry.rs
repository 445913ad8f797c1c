//! Process-wide set of log destinations
//!
//! The registry is the writer behind the formatting layer: every formatted
//! record is handed to each attached [`LogSink`] whose level admits it.
//! [`SinkRegistry::global`] is created on first use and lives for the rest
//! of the process; there is no teardown.

use crate::domain::ports::LogSink;
use std::io;
use std::path::Path;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

type Sinks = Vec<Arc<dyn LogSink>>;

static GLOBAL: OnceLock<SinkRegistry> = OnceLock::new();

/// Shared handle to a list of log destinations
///
/// Clones share the same list. At most one sink per file path is attached.
#[derive(Debug, Clone, Default)]
pub struct SinkRegistry {
    sinks: Arc<RwLock<Sinks>>,
}

impl SinkRegistry {
    /// Empty registry, independent of the global one
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry used by the global subscriber
    pub fn global() -> &'static Self {
        GLOBAL.get_or_init(Self::new)
    }

    /// Attach a sink
    ///
    /// Returns `false`, leaving the registry unchanged, when a sink with the
    /// same path is already attached.
    pub fn attach(&self, sink: Arc<dyn LogSink>) -> bool {
        let mut sinks = self.write();
        if let Some(path) = sink.path() {
            if contains(&sinks, path) {
                return false;
            }
        }
        sinks.push(sink);
        true
    }

    /// Attach the sink produced by `open` unless `path` is already served
    ///
    /// The lookup and the insert happen under one write lock, so concurrent
    /// callers never attach two sinks for the same path. `open` is only
    /// called when the path is free.
    ///
    /// # Returns
    /// * `Ok(true)` - a new sink was attached
    /// * `Ok(false)` - a sink for `path` was already attached
    pub fn attach_with<F, E>(&self, path: &Path, open: F) -> Result<bool, E>
    where
        F: FnOnce() -> Result<Arc<dyn LogSink>, E>,
    {
        let mut sinks = self.write();
        if contains(&sinks, path) {
            return Ok(false);
        }
        sinks.push(open()?);
        Ok(true)
    }

    /// Whether a sink for `path` is attached
    pub fn contains_path(&self, path: &Path) -> bool {
        contains(&self.read(), path)
    }

    /// Number of attached sinks
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether no sink is attached
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Flush every attached sink, returning the first error
    pub fn flush(&self) -> io::Result<()> {
        let mut first_error = None;
        for sink in self.read().iter() {
            if let Err(err) = sink.flush() {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn read(&self) -> RwLockReadGuard<'_, Sinks> {
        self.sinks.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Sinks> {
        self.sinks.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn contains(sinks: &Sinks, path: &Path) -> bool {
    sinks.iter().any(|sink| sink.path() == Some(path))
}

/// Writer handed out per record; fans the record out to every admitting sink
#[derive(Debug)]
pub struct FanOutWriter<'a> {
    sinks: RwLockReadGuard<'a, Sinks>,
    level: Option<Level>,
}

impl io::Write for FanOutWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut first_error = None;
        let admitting = self
            .sinks
            .iter()
            .filter(|sink| self.level.is_none_or(|level| sink.max_level() >= level));

        for sink in admitting {
            if let Err(err) = sink.write_record(buf) {
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            // never ErrorKind::Interrupted, which would make write_all repeat the record
            Some(err) => Err(io::Error::other(err)),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        for sink in self.sinks.iter() {
            sink.flush()?;
        }
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SinkRegistry {
    type Writer = FanOutWriter<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        FanOutWriter {
            sinks: self.read(),
            level: None,
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        FanOutWriter {
            sinks: self.read(),
            level: Some(*meta.level()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::logging::memory::MemorySink;
    use std::io::Write;
    use std::path::PathBuf;
    use tracing::level_filters::LevelFilter;

    #[derive(Debug)]
    struct PathSink(PathBuf);

    impl LogSink for PathSink {
        fn write_record(&self, _record: &[u8]) -> io::Result<()> {
            Ok(())
        }

        fn path(&self) -> Option<&Path> {
            Some(&self.0)
        }
    }

    #[derive(Debug)]
    struct BrokenSink;

    impl LogSink for BrokenSink {
        fn write_record(&self, _record: &[u8]) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Interrupted, "disk went away"))
        }
    }

    #[test]
    fn test_attach_rejects_duplicate_path() {
        let registry = SinkRegistry::new();
        let path = PathBuf::from("/tmp/ww/whisper-writer.log");

        assert!(registry.attach(Arc::new(PathSink(path.clone()))));
        assert!(!registry.attach(Arc::new(PathSink(path.clone()))));
        assert!(registry.attach(Arc::new(PathSink(PathBuf::from("/tmp/other.log")))));
        assert_eq!(registry.len(), 2);
        assert!(registry.contains_path(&path));
    }

    #[test]
    fn test_pathless_sinks_always_attach() {
        let registry = SinkRegistry::new();
        assert!(registry.is_empty());

        assert!(registry.attach(Arc::new(MemorySink::new())));
        assert!(registry.attach(Arc::new(MemorySink::new())));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_attach_with_skips_open_for_known_path() {
        let registry = SinkRegistry::new();
        let path = PathBuf::from("/tmp/ww/whisper-writer.log");

        let attached: Result<bool, io::Error> =
            registry.attach_with(&path, || {
                Ok(Arc::new(PathSink(path.clone())) as Arc<dyn LogSink>)
            });
        assert!(attached.unwrap());

        let attached: Result<bool, io::Error> =
            registry.attach_with(&path, || panic!("must not open twice"));
        assert!(!attached.unwrap());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_attach_with_propagates_open_error() {
        let registry = SinkRegistry::new();
        let result = registry.attach_with(Path::new("/nope.log"), || {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        });

        assert!(result.is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_concurrent_attach_with_single_winner() {
        let registry = SinkRegistry::new();
        let path = PathBuf::from("/tmp/ww/race.log");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                let path = path.clone();
                std::thread::spawn(move || {
                    registry
                        .attach_with(&path, || {
                            Ok::<_, io::Error>(Arc::new(PathSink(path.clone())) as Arc<dyn LogSink>)
                        })
                        .unwrap()
                })
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|attached| *attached)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_fan_out_respects_sink_level() {
        use crate::infrastructure::logging::format::SanitizingFormat;
        use tracing_subscriber::layer::SubscriberExt;

        let registry = SinkRegistry::new();
        let everything = Arc::new(MemorySink::new());
        let warnings = Arc::new(MemorySink::new().with_max_level(LevelFilter::WARN));
        registry.attach(everything.clone());
        registry.attach(warnings.clone());

        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .event_format(SanitizingFormat::new())
                .with_writer(registry.clone()),
        );
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("hotkey pressed");
            tracing::warn!("microphone muted");
        });

        assert_eq!(everything.len(), 2);
        assert_eq!(warnings.len(), 1);
        assert!(warnings.contents().contains("microphone muted"));

        // without metadata every sink receives the record
        registry.make_writer().write_all(b"untagged line\n").unwrap();
        assert_eq!(warnings.len(), 2);
    }

    #[test]
    fn test_failing_sink_does_not_block_others() {
        let registry = SinkRegistry::new();
        let memory = Arc::new(MemorySink::new());
        registry.attach(Arc::new(BrokenSink));
        registry.attach(memory.clone());

        let result = registry.make_writer().write(b"still delivered\n");

        let err = result.unwrap_err();
        assert_ne!(err.kind(), io::ErrorKind::Interrupted);
        assert_eq!(memory.lines(), vec!["still delivered\n"]);
    }
}
