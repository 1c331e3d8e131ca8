//! Field-state resolution
//!
//! Classifies every declared field of one construction call:
//! - `Explicit`: the caller supplied the name, even with null
//! - `Defaulted`: not supplied, the declared default was substituted
//! - `Unset`: not supplied, no default, optional; the value is null
//!
//! An explicit null never triggers default substitution.

use indexmap::IndexMap;

use super::errors::{MissingFieldError, RecordResult};
use crate::observability::{Logger, Severity};
use crate::schema::{ExtraFields, Schema, SchemaValidator, ValidationDetails, ValidationError};
use crate::value::Value;

/// How a field obtained its working value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldState {
    Unset,
    Defaulted,
    Explicit,
}

/// One field's state and canonical value for a single construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedField {
    pub state: FieldState,
    pub value: Value,
}

impl ResolvedField {
    pub fn new(state: FieldState, value: Value) -> Self {
        Self { state, value }
    }
}

/// Resolved fields in declaration order.
pub type Resolved = IndexMap<String, ResolvedField>;

/// Validates the supplied arguments and resolves every declared field.
///
/// The first failure in declaration order aborts resolution. Undeclared
/// names are dropped or rejected per the schema's `extra` policy. When a
/// name is supplied twice the last value wins.
pub fn resolve<I, K, V>(schema: &Schema, raw_args: I) -> RecordResult<Resolved>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    let mut args: IndexMap<String, Value> = raw_args
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect();

    let validator = SchemaValidator::for_schema(schema);
    let mut resolved = Resolved::with_capacity(schema.field_count());

    for (name, def) in schema.fields() {
        let field = if let Some(raw) = args.shift_remove(name) {
            let value = validator.validate(&def.field_type, raw, name)?;
            ResolvedField::new(FieldState::Explicit, value)
        } else if let Some(default) = &def.default {
            ResolvedField::new(FieldState::Defaulted, default.clone())
        } else if def.is_required() {
            return Err(MissingFieldError::new(schema.name(), name).into());
        } else {
            ResolvedField::new(FieldState::Unset, Value::Null)
        };
        resolved.insert(name.to_string(), field);
    }

    if let Some(extra) = args.keys().next() {
        match schema.config().extra {
            ExtraFields::Forbid => {
                return Err(ValidationError::new(schema.name(), ValidationDetails::extra_field(extra)).into());
            }
            ExtraFields::Ignore => {
                if Logger::enabled(Severity::Trace) {
                    let ignored: Vec<&str> = args.keys().map(String::as_str).collect();
                    Logger::trace(
                        "EXTRA_FIELDS_IGNORED",
                        &[("fields", ignored.join(",").as_str()), ("schema", schema.name())],
                    );
                }
            }
        }
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ConstructionError;
    use crate::schema::{FieldDef, RecordConfig, SchemaDefinition};
    use std::sync::Arc;

    fn schema() -> Arc<Schema> {
        Schema::register(
            SchemaDefinition::new("T")
                .field("a", FieldDef::required_string())
                .field("b", FieldDef::optional_string())
                .field("c", FieldDef::optional_string().elidable().with_default("X")),
        )
        .unwrap()
    }

    fn args(pairs: &[(&str, Value)]) -> Vec<(String, Value)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_three_states() {
        let resolved = resolve(&schema(), args(&[("a", Value::Int(1))])).unwrap();

        assert_eq!(resolved["a"], ResolvedField::new(FieldState::Explicit, Value::from("1")));
        assert_eq!(resolved["b"], ResolvedField::new(FieldState::Unset, Value::Null));
        assert_eq!(resolved["c"], ResolvedField::new(FieldState::Defaulted, Value::from("X")));
    }

    #[test]
    fn test_explicit_null_never_defaults() {
        let resolved = resolve(&schema(), args(&[("a", "1".into()), ("c", Value::Null)])).unwrap();
        assert_eq!(resolved["c"], ResolvedField::new(FieldState::Explicit, Value::Null));
    }

    #[test]
    fn test_missing_required_field() {
        let err = resolve(&schema(), args(&[("b", "x".into())])).unwrap_err();
        assert_eq!(err, ConstructionError::MissingField(MissingFieldError::new("T", "a")));
    }

    #[test]
    fn test_declaration_order_kept() {
        let resolved = resolve(&schema(), args(&[("c", "z".into()), ("a", "1".into())])).unwrap();
        let names: Vec<&str> = resolved.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_extra_ignored_by_default() {
        let resolved = resolve(&schema(), args(&[("a", "1".into()), ("zzz", Value::Int(3))])).unwrap();
        assert!(!resolved.contains_key("zzz"));
    }

    #[test]
    fn test_extra_forbidden() {
        let schema = Schema::register(
            SchemaDefinition::new("Strict")
                .field("a", FieldDef::optional_int())
                .with_config(RecordConfig::forbid_extra()),
        )
        .unwrap();

        let err = resolve(&schema, args(&[("zzz", Value::Int(3))])).unwrap_err();
        match err {
            ConstructionError::Validation(err) => assert_eq!(err.field(), "zzz"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validation_failure_aborts() {
        let err = resolve(&schema(), args(&[("a", Value::Array(vec![]))])).unwrap_err();
        assert_eq!(err.code(), "ELIDE_VALIDATION_FAILED");
    }
}
