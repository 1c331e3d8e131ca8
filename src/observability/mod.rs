//! Observability subsystem
//!
//! Structured JSON-lines logging of registry and record lifecycle events.
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. Logging never fails or alters the logged operation
//! 3. Synchronous, no background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use elision::observability::{Logger, Severity, Event, log_event_with_fields};
//!
//! Logger::set_min_severity(Severity::Trace);
//! log_event_with_fields(Event::SchemaRegistered, &[("schema", "T")]);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity, Target};

/// Log an event with fields at its own severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
