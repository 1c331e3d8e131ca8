//! Schema subsystem
//!
//! Record types are declared once, validated at registration and never
//! mutated afterwards.
//!
//! # Design Principles
//!
//! - Elision metadata is declared explicitly per field
//! - Elidable fields must admit null
//! - Defaults are coerced at registration, not at use
//! - Nested record types are registered bottom-up
//! - Registered schemas are shared read-only

mod config;
mod errors;
mod registry;
mod types;
mod validator;

pub use config::{ExtraFields, RecordConfig};
pub use errors::{
    SchemaError, SchemaErrorCode, SchemaResult, Severity, ValidationDetails, ValidationError,
    ValidationResult,
};
pub use registry::SchemaRegistry;
pub use types::{EnumMember, FieldDef, FieldType, Schema, SchemaDefinition};
pub use validator::SchemaValidator;
