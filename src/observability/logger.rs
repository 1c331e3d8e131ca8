//! Structured JSON logger
//!
//! - One log line = one event
//! - `event` and `severity` first, then fields sorted by key
//! - Synchronous, no buffering
//! - Process-wide minimum severity, INFO by default
//! - ERROR and FATAL on stderr, the rest on stdout unless routed to stderr

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use serde_json::{Map, Value};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Per-record detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Rejected definitions
    Warn = 2,
    /// Operation failures
    Error = 3,
    /// Unrecoverable
    Fatal = 4,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    fn from_u8(level: u8) -> Self {
        match level {
            0 => Severity::Trace,
            1 => Severity::Info,
            2 => Severity::Warn,
            3 => Severity::Error,
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

static MIN_SEVERITY: AtomicU8 = AtomicU8::new(Severity::Info as u8);
static ALL_TO_STDERR: AtomicBool = AtomicBool::new(false);

/// Output stream for a log line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Stdout,
    Stderr,
}

/// A structured logger that outputs JSON lines
pub struct Logger;

impl Logger {
    /// Sets the process-wide threshold; events below it are dropped.
    pub fn set_min_severity(severity: Severity) {
        MIN_SEVERITY.store(severity as u8, Ordering::Relaxed);
    }

    pub fn min_severity() -> Severity {
        Severity::from_u8(MIN_SEVERITY.load(Ordering::Relaxed))
    }

    /// Whether an event at `severity` would be written.
    pub fn enabled(severity: Severity) -> bool {
        severity >= Self::min_severity()
    }

    /// Sends every log line to stderr, keeping stdout for program output.
    pub fn route_all_to_stderr(enabled: bool) {
        ALL_TO_STDERR.store(enabled, Ordering::Relaxed);
    }

    /// Stream a line at `severity` is written to.
    pub fn target(severity: Severity) -> Target {
        if severity >= Severity::Error || ALL_TO_STDERR.load(Ordering::Relaxed) {
            Target::Stderr
        } else {
            Target::Stdout
        }
    }

    /// Log an event to the stream chosen by `target`.
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if !Self::enabled(severity) {
            return;
        }
        let line = Self::render(severity, event, fields);
        match Self::target(severity) {
            Target::Stderr => Self::write_line(&line, &mut io::stderr()),
            Target::Stdout => Self::write_line(&line, &mut io::stdout()),
        }
    }

    /// Renders one log line without the trailing newline.
    pub fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut object = Map::new();
        object.insert("event".to_string(), Value::from(event));
        object.insert("severity".to_string(), Value::from(severity.as_str()));

        let mut sorted: Vec<_> = fields.iter().collect();
        sorted.sort_by_key(|(k, _)| *k);
        for (key, value) in sorted {
            object.insert((*key).to_string(), Value::from(*value));
        }

        Value::Object(object).to_string()
    }

    fn write_line<W: Write>(line: &str, writer: &mut W) {
        // Logging never fails the caller
        let _ = writeln!(writer, "{}", line);
        let _ = writer.flush();
    }

    /// Log at TRACE level
    pub fn trace(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Trace, event, fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Trace < Severity::Info);
        assert!(Severity::Warn < Severity::Fatal);
    }

    #[test]
    fn test_render_key_order() {
        let line = Logger::render(Severity::Info, "SCHEMA_REGISTERED", &[("schema", "T"), ("fields", "3")]);
        assert_eq!(
            line,
            r#"{"event":"SCHEMA_REGISTERED","severity":"INFO","fields":"3","schema":"T"}"#
        );
    }

    #[test]
    fn test_render_escapes() {
        let line = Logger::render(Severity::Warn, "E", &[("msg", "a \"quoted\"\nline")]);
        let parsed: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["msg"], "a \"quoted\"\nline");
    }

    #[test]
    fn test_errors_always_on_stderr() {
        assert_eq!(Logger::target(Severity::Error), Target::Stderr);
        assert_eq!(Logger::target(Severity::Fatal), Target::Stderr);
    }

    #[test]
    fn test_fatal_always_enabled() {
        assert!(Logger::enabled(Severity::Fatal));
    }
}
