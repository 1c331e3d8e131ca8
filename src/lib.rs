//! elision - schema-driven conditional field elision and defaulting
//!
//! Record types declare, per field, whether a null final value drops the
//! field from the record's output map and which default to substitute when
//! the caller omits it. Nested records elide independently.
//!
//! ```ignore
//! use elision::record::RecordInstance;
//! use elision::schema::{FieldDef, Schema, SchemaDefinition};
//! use serde_json::json;
//!
//! let schema = Schema::register(
//!     SchemaDefinition::new("T")
//!         .field("a", FieldDef::required_string())
//!         .field("c", FieldDef::optional_string().elidable().with_default("X")),
//! )?;
//! let record = RecordInstance::from_json(&schema, json!({"a": 1, "c": null}))?;
//! assert_eq!(record.to_json(), json!({"a": "1"}));
//! ```

pub mod cli;
pub mod observability;
pub mod record;
pub mod schema;
pub mod value;

pub use record::{ConstructionError, RecordInstance};
pub use schema::{FieldDef, FieldType, Schema, SchemaDefinition, SchemaError, SchemaRegistry};
pub use value::Value;
