//! Observable events
//!
//! Events are explicit and typed; each carries its default severity.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Registry
    /// A definition was registered
    SchemaRegistered,
    /// A directory of definitions was loaded
    SchemaLoaded,
    /// A definition was rejected at registration
    SchemaRejected,

    // Records
    /// A record was constructed
    RecordConstructed,
    /// Construction failed; no record produced
    ConstructionRejected,
    /// Post-construction assignment failed
    AssignmentRejected,
}

impl Event {
    /// Returns the event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SchemaRegistered => "SCHEMA_REGISTERED",
            Event::SchemaLoaded => "SCHEMA_LOADED",
            Event::SchemaRejected => "SCHEMA_REJECTED",
            Event::RecordConstructed => "RECORD_CONSTRUCTED",
            Event::ConstructionRejected => "CONSTRUCTION_REJECTED",
            Event::AssignmentRejected => "ASSIGNMENT_REJECTED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::SchemaRegistered | Event::SchemaLoaded => Severity::Info,
            Event::SchemaRejected => Severity::Warn,
            Event::RecordConstructed | Event::ConstructionRejected | Event::AssignmentRejected => {
                Severity::Trace
            }
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
