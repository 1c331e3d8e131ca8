//! Record instances and their map representation
//!
//! An instance holds only the fields that survived elision, in declaration
//! order. Absent means elided, never "present with null".

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value as Json};

use super::elision::elide;
use super::errors::{AttributeNotPresentError, ConstructionError, RecordResult};
use super::resolver::resolve;
use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::schema::{Schema, SchemaValidator, ValidationDetails, ValidationError};
use crate::value::Value;

/// Immutable-by-default snapshot of a constructed record.
#[derive(Debug, Clone)]
pub struct RecordInstance {
    schema: Arc<Schema>,
    values: IndexMap<String, Value>,
}

impl RecordInstance {
    /// Validates, resolves and elides `raw_args` into a record.
    ///
    /// Construction is all-or-nothing: any failure returns the error and no
    /// record. Nested records among the arguments keep their own elision.
    pub fn construct<I, K, V>(schema: &Arc<Schema>, raw_args: I) -> RecordResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let resolved = match resolve(schema, raw_args) {
            Ok(resolved) => resolved,
            Err(err) => {
                if Logger::enabled(Severity::Trace) {
                    log_event_with_fields(
                        Event::ConstructionRejected,
                        &[("code", err.code()), ("schema", schema.name())],
                    );
                }
                return Err(err);
            }
        };

        let declared = resolved.len();
        let values = elide(schema, resolved);

        if Logger::enabled(Severity::Trace) {
            log_event_with_fields(
                Event::RecordConstructed,
                &[
                    ("elided", (declared - values.len()).to_string().as_str()),
                    ("fields", values.len().to_string().as_str()),
                    ("schema", schema.name()),
                ],
            );
        }

        Ok(Self {
            schema: Arc::clone(schema),
            values,
        })
    }

    /// Constructs from a JSON object of raw arguments.
    pub fn from_json(schema: &Arc<Schema>, json: Json) -> RecordResult<Self> {
        match json {
            Json::Object(args) => Self::construct(
                schema,
                args.into_iter().map(|(name, value)| (name, Value::from(value))),
            ),
            other => Err(ValidationError::new(
                schema.name(),
                ValidationDetails::type_mismatch("$root", "object", Value::from(other).type_name()),
            )
            .into()),
        }
    }

    /// Returns a surviving field's value.
    pub fn get(&self, name: &str) -> Result<&Value, AttributeNotPresentError> {
        self.values
            .get(name)
            .ok_or_else(|| AttributeNotPresentError::new(self.schema.name(), name))
    }

    /// Whether the field survived elision.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Surviving fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Type identity
    pub fn type_name(&self) -> &str {
        self.schema.name()
    }

    /// Validates and stores a new value for a present field.
    ///
    /// Elision is not re-run: assigning null to a present elidable field
    /// stores null. Elided fields cannot be re-added.
    pub fn set(&mut self, name: &str, raw: impl Into<Value>) -> RecordResult<()> {
        let result = self.assign(name, raw.into());
        if let Err(err) = &result {
            if Logger::enabled(Severity::Trace) {
                log_event_with_fields(
                    Event::AssignmentRejected,
                    &[("code", err.code()), ("field", name), ("schema", self.type_name())],
                );
            }
        }
        result
    }

    fn assign(&mut self, name: &str, raw: Value) -> RecordResult<()> {
        if !self.schema.config().validate_assignment {
            return Err(ConstructionError::AssignmentDisabled {
                schema: self.schema.name().to_string(),
                field: name.to_string(),
            });
        }

        let def = match self.schema.field(name) {
            Some(def) if self.values.contains_key(name) => def,
            _ => return Err(AttributeNotPresentError::new(self.schema.name(), name).into()),
        };

        let value = SchemaValidator::for_schema(&self.schema).validate(&def.field_type, raw, name)?;
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
        }
        Ok(())
    }

    /// Nested map/array form of the surviving fields.
    ///
    /// Nested records contribute their own surviving fields; arrays are
    /// converted element by element.
    pub fn to_map(&self) -> Map<String, Json> {
        self.values
            .iter()
            .map(|(name, value)| (name.clone(), value.to_json()))
            .collect()
    }

    pub fn to_json(&self) -> Json {
        Json::Object(self.to_map())
    }
}

impl PartialEq for RecordInstance {
    fn eq(&self, other: &Self) -> bool {
        self.schema.same_type(&other.schema)
            && self.values.len() == other.values.len()
            && self.values.iter().eq(other.values.iter())
    }
}

impl Eq for RecordInstance {}

// Hashes the name only; `eq` additionally requires the same definition.
impl Hash for RecordInstance {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_name().hash(state);
        for (name, value) in &self.values {
            name.hash(state);
            value.hash(state);
        }
    }
}

impl Serialize for RecordInstance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(&self.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, RecordConfig, SchemaDefinition};
    use serde_json::json;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(record: &RecordInstance) -> u64 {
        let mut hasher = DefaultHasher::new();
        record.hash(&mut hasher);
        hasher.finish()
    }

    fn schema() -> Arc<Schema> {
        Schema::register(
            SchemaDefinition::new("T")
                .field("a", FieldDef::required_string())
                .field("b", FieldDef::optional_string())
                .field("c", FieldDef::optional_string().elidable().with_default("X")),
        )
        .unwrap()
    }

    #[test]
    fn test_unset_elidable_gets_default() {
        let record = RecordInstance::from_json(&schema(), json!({"a": "1"})).unwrap();
        assert_eq!(record.to_json(), json!({"a": "1", "b": null, "c": "X"}));
    }

    #[test]
    fn test_explicit_null_is_elided() {
        let record = RecordInstance::from_json(&schema(), json!({"a": "1", "c": null})).unwrap();
        assert_eq!(record.to_json(), json!({"a": "1", "b": null}));
        assert!(!record.contains("c"));
    }

    #[test]
    fn test_get_elided_field_fails() {
        let record = RecordInstance::from_json(&schema(), json!({"a": "1", "c": null})).unwrap();
        let err = record.get("c").unwrap_err();
        assert_eq!(err, AttributeNotPresentError::new("T", "c"));
        assert_eq!(record.get("b").unwrap(), &Value::Null);
    }

    #[test]
    fn test_non_object_input_rejected() {
        let err = RecordInstance::from_json(&schema(), json!([1, 2])).unwrap_err();
        match err {
            ConstructionError::Validation(err) => {
                assert_eq!(err.field(), "$root");
                assert_eq!(err.details().actual, "array");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_set_revalidates() {
        let mut record = RecordInstance::from_json(&schema(), json!({"a": "1"})).unwrap();
        record.set("a", 5).unwrap();
        assert_eq!(record.get("a").unwrap(), &Value::from("5"));

        let err = record.set("a", Value::Null).unwrap_err();
        assert_eq!(err.code(), "ELIDE_VALIDATION_FAILED");
        assert_eq!(record.get("a").unwrap(), &Value::from("5"));
    }

    #[test]
    fn test_set_does_not_rerun_elision() {
        let mut record = RecordInstance::from_json(&schema(), json!({"a": "1"})).unwrap();
        record.set("c", Value::Null).unwrap();
        assert_eq!(record.to_json(), json!({"a": "1", "b": null, "c": null}));
    }

    #[test]
    fn test_set_cannot_readd_elided_field() {
        let mut record = RecordInstance::from_json(&schema(), json!({"a": "1", "c": null})).unwrap();
        let err = record.set("c", "back").unwrap_err();
        assert!(matches!(err, ConstructionError::AttributeNotPresent(_)));
        assert!(!record.contains("c"));
    }

    #[test]
    fn test_set_disabled_by_config() {
        let frozen = Schema::register(
            SchemaDefinition::new("Frozen")
                .field("a", FieldDef::optional_string())
                .with_config(RecordConfig::frozen()),
        )
        .unwrap();
        let mut record = RecordInstance::from_json(&frozen, json!({"a": "x"})).unwrap();
        let err = record.set("a", "y").unwrap_err();
        assert_eq!(err.code(), "ELIDE_ASSIGNMENT_DISABLED");
    }

    #[test]
    fn test_equality_includes_type_identity() {
        let fields = |name: &str| {
            Schema::register(SchemaDefinition::new(name).field("x", FieldDef::optional_int())).unwrap()
        };
        let a = RecordInstance::from_json(&fields("A"), json!({"x": 1})).unwrap();
        let a2 = RecordInstance::from_json(&fields("A"), json!({"x": 1})).unwrap();
        let b = RecordInstance::from_json(&fields("B"), json!({"x": 1})).unwrap();

        assert_eq!(a, a2);
        assert_eq!(hash_of(&a), hash_of(&a2));
        assert_ne!(a, b);
        assert_ne!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_empty_records_compare_by_type() {
        let schema = |name: &str| {
            Schema::register(SchemaDefinition::new(name).field("x", FieldDef::optional_int().elidable()))
                .unwrap()
        };
        let a = RecordInstance::from_json(&schema("A"), json!({})).unwrap();
        let a2 = RecordInstance::from_json(&schema("A"), json!({"x": null})).unwrap();
        let b = RecordInstance::from_json(&schema("B"), json!({})).unwrap();

        assert!(a.is_empty());
        assert_eq!(a, a2);
        assert_eq!(hash_of(&a), hash_of(&a2));
        assert_ne!(a, b);
    }

    #[test]
    fn test_serialize_matches_to_map() {
        let record = RecordInstance::from_json(&schema(), json!({"a": 1, "b": "y"})).unwrap();
        let serialized = serde_json::to_value(&record).unwrap();
        assert_eq!(serialized, record.to_json());
    }

    #[test]
    fn test_same_name_different_definition_not_equal() {
        let plain =
            Schema::register(SchemaDefinition::new("A").field("x", FieldDef::optional_int())).unwrap();
        let wider = Schema::register(
            SchemaDefinition::new("A")
                .field("x", FieldDef::optional_int().elidable())
                .field("y", FieldDef::optional_int().elidable()),
        )
        .unwrap();

        let a = RecordInstance::from_json(&plain, json!({"x": 1})).unwrap();
        let other = RecordInstance::from_json(&wider, json!({"x": 1})).unwrap();

        assert_eq!(a.to_json(), other.to_json());
        assert_ne!(a, other);
    }
}
