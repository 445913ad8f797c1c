//! Line formatter for log events

use super::sanitizer::sanitize;
use crate::domain::models::{LogRecord, Severity};
use std::fmt::{self, Write as _};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Field that upgrades an ERROR event to CRITICAL
pub const CRITICAL_FIELD: &str = "critical";

const MESSAGE_FIELD: &str = "message";
const LOG_TARGET_FIELD: &str = "log.target";

/// Event formatter producing `timestamp | LEVEL    | source | message` lines
///
/// The rendered line goes through [`sanitize`] before it reaches the writer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SanitizingFormat;

impl SanitizingFormat {
    /// Create the formatter
    pub const fn new() -> Self {
        Self
    }

    /// Build the record for an event without rendering it
    pub fn record(event: &Event<'_>) -> LogRecord {
        let mut visitor = RecordVisitor::default();
        event.record(&mut visitor);

        let metadata = event.metadata();
        let source = visitor
            .log_target
            .take()
            .unwrap_or_else(|| metadata.target().to_string());
        let severity = Severity::from_tracing(*metadata.level(), visitor.critical);

        LogRecord::new(severity, source, visitor.into_message())
    }
}

impl<S, N> FormatEvent<S, N> for SanitizingFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let line = Self::record(event).to_line();
        writeln!(writer, "{}", sanitize(&line))
    }
}

/// Collects the message and structured fields of an event
#[derive(Debug, Default)]
struct RecordVisitor {
    message: String,
    fields: String,
    log_target: Option<String>,
    critical: bool,
}

impl RecordVisitor {
    fn into_message(self) -> String {
        if self.fields.is_empty() {
            self.message
        } else if self.message.is_empty() {
            self.fields.trim_start().to_string()
        } else {
            self.message + &self.fields
        }
    }

    fn push_field(&mut self, field: &Field, value: fmt::Arguments<'_>) {
        let _ = write!(self.fields, " {}={}", field.name(), value);
    }
}

impl Visit for RecordVisitor {
    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == CRITICAL_FIELD {
            self.critical = value;
        } else {
            self.push_field(field, format_args!("{value}"));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            MESSAGE_FIELD => self.message = value.to_string(),
            LOG_TARGET_FIELD => self.log_target = Some(value.to_string()),
            name if name.starts_with("log.") => {}
            _ => self.push_field(field, format_args!("{value}")),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            MESSAGE_FIELD => self.message = format!("{value:?}"),
            name if name.starts_with("log.") => {}
            _ => self.push_field(field, format_args!("{value:?}")),
        }
    }
}
