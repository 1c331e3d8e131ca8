//! Record subsystem
//!
//! Construction pipeline, leaves first:
//!
//! 1. `resolve`: validate supplied arguments, classify every field as
//!    unset / defaulted / explicit
//! 2. `elide`: drop elidable null fields
//! 3. `RecordInstance`: the surviving fields, serialized via `to_map`
//!
//! Nested records are constructed (and elided) before their parent sees
//! them.

mod elision;
mod errors;
mod instance;
mod resolver;

pub use elision::{elide, omit};
pub use errors::{AttributeNotPresentError, ConstructionError, MissingFieldError, RecordResult};
pub use instance::RecordInstance;
pub use resolver::{resolve, FieldState, Resolved, ResolvedField};
