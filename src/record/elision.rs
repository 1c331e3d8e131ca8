//! Elision engine
//!
//! A field is omitted from a record when it is elidable, not required and
//! its final value is null. How the value was reached (default or explicit)
//! does not matter.
//!
//! Only top-level fields are ever omitted. Nested records arrive already
//! elided by their own construction and are opaque here; array elements are
//! kept verbatim, nulls included.

use indexmap::IndexMap;

use super::resolver::Resolved;
use crate::observability::{Logger, Severity};
use crate::schema::{FieldDef, Schema};
use crate::value::Value;

/// The omission rule for one field.
pub fn omit(def: &FieldDef, value: &Value) -> bool {
    def.elide && !def.is_required() && value.is_null()
}

/// Applies the omission rule to every resolved field, keeping declaration
/// order for the survivors.
pub fn elide(schema: &Schema, mut resolved: Resolved) -> IndexMap<String, Value> {
    let mut surviving = IndexMap::with_capacity(resolved.len());

    for (name, def) in schema.fields() {
        let Some(field) = resolved.shift_remove(name) else {
            continue;
        };

        if omit(def, &field.value) {
            if Logger::enabled(Severity::Trace) {
                Logger::trace("FIELD_ELIDED", &[("field", name), ("schema", schema.name())]);
            }
            continue;
        }

        surviving.insert(name.to_string(), field.value);
    }

    surviving
}
