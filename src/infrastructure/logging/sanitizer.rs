//! Redaction of binary payloads in formatted log lines
//!
//! Audio buffers and raw byte dumps occasionally end up in log messages.
//! Before a line is persisted, long escaped-byte runs (`\x00\x01...`) and
//! long hex-looking runs are replaced with fixed markers, then the line is
//! capped at [`MESSAGE_MAX_CHARS`] characters.
//!
//! Both passes use the `regex` crate, whose finite-automaton engine runs in
//! time linear in the input, so adversarial lines cannot trigger
//! catastrophic backtracking.

use regex::{NoExpand, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;

/// Consecutive `\xHH` escapes needed before a run is redacted
pub const ESCAPE_RUN_THRESHOLD: usize = 40;
/// Length of a hex/whitespace/comma run needed before it is redacted
pub const HEX_RUN_THRESHOLD: usize = 60;
/// Maximum characters kept from a redacted line
pub const MESSAGE_MAX_CHARS: usize = 3500;

/// Replacement for a run of escaped bytes
pub const BINARY_MARKER: &str = "[... binary data omitted ...]";
/// Replacement for a run of hex-looking characters
pub const HEX_MARKER: &str = "[... binary/hex data omitted ...]";
/// Appended after a line cut at [`MESSAGE_MAX_CHARS`]
pub const TRUNCATION_MARKER: &str = "\n... [message truncated - large data omitted]";

static ESCAPED_BYTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?:\\x[0-9a-fA-F]{{2}}){{{ESCAPE_RUN_THRESHOLD},}}"))
        .expect("escaped byte pattern is valid")
});

static HEX_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"[0-9a-fA-Fx\s,]{{{HEX_RUN_THRESHOLD},}}"))
        .expect("hex run pattern is valid")
});

/// Redact binary/hex runs, then truncate overlong text
///
/// Returns the input untouched (borrowed) when nothing matched. Redaction
/// always happens before truncation so a cut never splits a payload that
/// would otherwise have been replaced.
///
/// # Examples
///
/// ```
/// use whisper_writer_logging::sanitize;
///
/// assert_eq!(sanitize("recording started"), "recording started");
///
/// let dump = "\\x00".repeat(64);
/// assert_eq!(sanitize(&dump), "[... binary data omitted ...]");
/// ```
pub fn sanitize(text: &str) -> Cow<'_, str> {
    if text.is_empty() {
        return Cow::Borrowed(text);
    }

    let escaped = ESCAPED_BYTES.replace_all(text, NoExpand(BINARY_MARKER));

    // The hex pass also catches byte runs that are not in escape form
    let hex_replaced = match HEX_RUN.replace_all(&escaped, NoExpand(HEX_MARKER)) {
        Cow::Owned(replaced) => Some(replaced),
        Cow::Borrowed(_) => None,
    };
    let redacted = hex_replaced.map_or(escaped, Cow::Owned);

    if let Some((cut, _)) = redacted.char_indices().nth(MESSAGE_MAX_CHARS) {
        let mut truncated = String::with_capacity(cut + TRUNCATION_MARKER.len());
        truncated.push_str(&redacted[..cut]);
        truncated.push_str(TRUNCATION_MARKER);
        return Cow::Owned(truncated);
    }

    redacted
}
