//! Schema type definitions
//!
//! Supported declared types:
//! - string, int, float, bool: scalars
//! - null: the none-type, useful inside unions
//! - enum: named members normalized to their raw value
//! - optional: admits null, otherwise the inner type
//! - array: homogeneous collection with element type
//! - union: variants tried left to right
//! - record: reference to another registered schema by name

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use super::config::RecordConfig;
use super::errors::{SchemaError, SchemaResult};
use super::registry::SchemaRegistry;
use crate::value::Value;

/// Nested record schemas a schema refers to, resolved at registration.
pub(crate) type Links = HashMap<String, Arc<Schema>>;

/// One member of an enum type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMember {
    /// Member name (accepted as input, normalized away)
    pub name: String,
    /// Raw value kept as the canonical value
    pub value: Value,
}

/// Declared field types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    Float,
    /// Boolean
    Bool,
    /// Only null
    Null,
    /// Enumeration, canonicalized to member raw values
    Enum {
        name: String,
        members: Vec<EnumMember>,
    },
    /// Null or the inner type
    Optional { inner: Box<FieldType> },
    /// Homogeneous array with single element type
    Array { element_type: Box<FieldType> },
    /// First matching variant wins
    Union { variants: Vec<FieldType> },
    /// Nested record of a registered schema
    Record { schema: String },
}

impl FieldType {
    pub fn optional(inner: FieldType) -> Self {
        FieldType::Optional {
            inner: Box::new(inner),
        }
    }

    pub fn array(element_type: FieldType) -> Self {
        FieldType::Array {
            element_type: Box::new(element_type),
        }
    }

    pub fn union(variants: impl IntoIterator<Item = FieldType>) -> Self {
        FieldType::Union {
            variants: variants.into_iter().collect(),
        }
    }

    pub fn record(schema: impl Into<String>) -> Self {
        FieldType::Record {
            schema: schema.into(),
        }
    }

    /// Builds an enum type from `(member name, raw value)` pairs.
    pub fn enumeration<N, V>(name: impl Into<String>, members: impl IntoIterator<Item = (N, V)>) -> Self
    where
        N: Into<String>,
        V: Into<Value>,
    {
        FieldType::Enum {
            name: name.into(),
            members: members
                .into_iter()
                .map(|(name, value)| EnumMember {
                    name: name.into(),
                    value: value.into(),
                })
                .collect(),
        }
    }

    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
            FieldType::Null => "null",
            FieldType::Enum { .. } => "enum",
            FieldType::Optional { .. } => "optional",
            FieldType::Array { .. } => "array",
            FieldType::Union { .. } => "union",
            FieldType::Record { .. } => "record",
        }
    }

    /// Full rendering of the type, e.g. `optional<array<string>>`.
    pub fn describe(&self) -> String {
        match self {
            FieldType::Enum { name, .. } => format!("enum {}", name),
            FieldType::Optional { inner } => format!("optional<{}>", inner.describe()),
            FieldType::Array { element_type } => format!("array<{}>", element_type.describe()),
            FieldType::Union { variants } => {
                let parts: Vec<String> = variants.iter().map(FieldType::describe).collect();
                format!("union<{}>", parts.join(" | "))
            }
            FieldType::Record { schema } => format!("record {}", schema),
            other => other.type_name().to_string(),
        }
    }

    /// Whether null is an accepted value of this type.
    pub fn admits_null(&self) -> bool {
        match self {
            FieldType::Null | FieldType::Optional { .. } => true,
            FieldType::Union { variants } => variants.iter().any(FieldType::admits_null),
            _ => false,
        }
    }

    /// Collects every nested record reference, at any depth.
    pub fn collect_record_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            FieldType::Record { schema } => out.push(schema),
            FieldType::Optional { inner } => inner.collect_record_refs(out),
            FieldType::Array { element_type } => element_type.collect_record_refs(out),
            FieldType::Union { variants } => {
                for variant in variants {
                    variant.collect_record_refs(out);
                }
            }
            _ => {}
        }
    }
}

/// Field definition: declared type plus elision metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field data type
    #[serde(flatten)]
    pub field_type: FieldType,
    /// Drop the field from output when its final value is null
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub elide: bool,
    /// Substituted when the caller omits the field. `Some(Value::Null)` is a
    /// declared null default, distinct from no default.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
}

fn deserialize_present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl FieldDef {
    /// A non-elidable field with no default
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            elide: false,
            default: None,
        }
    }

    /// Marks the field elidable
    pub fn elidable(mut self) -> Self {
        self.elide = true;
        self
    }

    /// Declares a default literal; `Value::Null` declares a null default
    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Create a required string field
    pub fn required_string() -> Self {
        Self::new(FieldType::String)
    }

    /// Create an optional string field
    pub fn optional_string() -> Self {
        Self::new(FieldType::optional(FieldType::String))
    }

    /// Create a required int field
    pub fn required_int() -> Self {
        Self::new(FieldType::Int)
    }

    /// Create an optional int field
    pub fn optional_int() -> Self {
        Self::new(FieldType::optional(FieldType::Int))
    }

    /// Create a required bool field
    pub fn required_bool() -> Self {
        Self::new(FieldType::Bool)
    }

    /// Create a required float field
    pub fn required_float() -> Self {
        Self::new(FieldType::Float)
    }

    /// Create a required array field
    pub fn required_array(element_type: FieldType) -> Self {
        Self::new(FieldType::array(element_type))
    }

    /// Create an optional array field
    pub fn optional_array(element_type: FieldType) -> Self {
        Self::new(FieldType::optional(FieldType::array(element_type)))
    }

    /// Create a required nested record field
    pub fn required_record(schema: impl Into<String>) -> Self {
        Self::new(FieldType::record(schema))
    }

    /// Create an optional nested record field
    pub fn optional_record(schema: impl Into<String>) -> Self {
        Self::new(FieldType::optional(FieldType::record(schema)))
    }

    /// Omitting a required field at construction is an error: its type
    /// does not admit null and it has no default.
    pub fn is_required(&self) -> bool {
        !self.field_type.admits_null() && self.default.is_none()
    }
}

fn default_version() -> String {
    "1".to_string()
}

/// A record type definition, the input to registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Type name, unique within a registry
    pub name: String,
    /// Definition version
    #[serde(default = "default_version")]
    pub version: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Field definitions in declaration order
    pub fields: IndexMap<String, FieldDef>,
    /// Construction behaviour
    #[serde(default)]
    pub config: RecordConfig,
}

impl SchemaDefinition {
    /// Create an empty definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: default_version(),
            description: None,
            fields: IndexMap::new(),
            config: RecordConfig::default(),
        }
    }

    /// Appends a field; redeclaring a name replaces it in place
    pub fn field(mut self, name: impl Into<String>, def: FieldDef) -> Self {
        self.fields.insert(name.into(), def);
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_config(mut self, config: RecordConfig) -> Self {
        self.config = config;
        self
    }

    /// Names of all record types this definition refers to.
    pub fn record_refs(&self) -> Vec<&str> {
        let mut refs = Vec::new();
        for def in self.fields.values() {
            def.field_type.collect_record_refs(&mut refs);
        }
        refs
    }

    /// Equality including field declaration order.
    pub fn same_as(&self, other: &SchemaDefinition) -> bool {
        self == other && self.fields.keys().eq(other.fields.keys())
    }

    /// Validates the definition structure itself (not a record).
    ///
    /// Default coercion and nested references need a registry and are
    /// checked at registration.
    pub fn validate_structure(&self) -> SchemaResult<()> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::invalid_schema(&self.name, "name must not be empty"));
        }

        for (name, def) in &self.fields {
            if name.trim().is_empty() {
                return Err(SchemaError::invalid_schema(&self.name, "field names must not be empty"));
            }
            if def.elide && !def.field_type.admits_null() {
                return Err(SchemaError::elide_non_nullable(
                    &self.name,
                    name,
                    &def.field_type.describe(),
                ));
            }
        }

        Ok(())
    }
}

/// A registered, immutable schema.
///
/// Only the registry builds these; defaults are stored in canonical form and
/// nested record references are resolved.
#[derive(Debug)]
pub struct Schema {
    definition: SchemaDefinition,
    links: Links,
}

impl Schema {
    pub(crate) fn new(definition: SchemaDefinition, links: Links) -> Self {
        Self { definition, links }
    }

    /// Registers a self-contained definition outside any registry.
    ///
    /// Definitions with nested record fields must go through a
    /// `SchemaRegistry` holding the nested schemas.
    pub fn register(definition: SchemaDefinition) -> SchemaResult<Arc<Schema>> {
        SchemaRegistry::new().register(definition)
    }

    /// Type identity
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn version(&self) -> &str {
        &self.definition.version
    }

    pub fn definition(&self) -> &SchemaDefinition {
        &self.definition
    }

    pub fn config(&self) -> &RecordConfig {
        &self.definition.config
    }

    /// Fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldDef)> {
        self.definition.fields.iter().map(|(name, def)| (name.as_str(), def))
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.definition.fields.get(name)
    }

    pub fn field_count(&self) -> usize {
        self.definition.fields.len()
    }

    /// Resolved nested schema for a record reference
    pub fn linked(&self, name: &str) -> Option<&Arc<Schema>> {
        self.links.get(name)
    }

    pub(crate) fn links(&self) -> &Links {
        &self.links
    }

    /// Type identity: the same registered schema, or a structurally
    /// identical one whose nested types are identical too.
    ///
    /// Names alone are not enough; independent registries may bind one
    /// name to different definitions.
    pub fn same_type(&self, other: &Schema) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        self.definition.same_as(&other.definition)
            && self.links.len() == other.links.len()
            && self.links.iter().all(|(name, linked)| {
                other
                    .links
                    .get(name)
                    .is_some_and(|theirs| linked.same_type(theirs))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaErrorCode;

    fn sample_definition() -> SchemaDefinition {
        SchemaDefinition::new("T")
            .field("a", FieldDef::required_string())
            .field("b", FieldDef::optional_string())
            .field("c", FieldDef::optional_string().elidable().with_default("X"))
    }

    #[test]
    fn test_structure_valid() {
        assert!(sample_definition().validate_structure().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = SchemaDefinition::new("  ").validate_structure().unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::InvalidSchema);
    }

    #[test]
    fn test_elidable_required_field_rejected() {
        let def = SchemaDefinition::new("T").field("a", FieldDef::required_string().elidable());
        let err = def.validate_structure().unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::ElideNonNullable);
        assert_eq!(err.field(), Some("a"));
    }

    #[test]
    fn test_required_derivation() {
        assert!(FieldDef::required_string().is_required());
        assert!(!FieldDef::optional_string().is_required());
        assert!(!FieldDef::required_string().with_default("x").is_required());
    }

    #[test]
    fn test_admits_null() {
        assert!(FieldType::Null.admits_null());
        assert!(FieldType::optional(FieldType::Int).admits_null());
        assert!(FieldType::union([FieldType::String, FieldType::Int, FieldType::Null]).admits_null());
        assert!(!FieldType::union([FieldType::String, FieldType::Int]).admits_null());
        assert!(!FieldType::array(FieldType::optional(FieldType::String)).admits_null());
    }

    #[test]
    fn test_describe() {
        let ty = FieldType::optional(FieldType::array(FieldType::optional(FieldType::String)));
        assert_eq!(ty.describe(), "optional<array<optional<string>>>");
        assert_eq!(FieldType::record("Inner").describe(), "record Inner");
        assert_eq!(
            FieldType::union([FieldType::String, FieldType::Null]).describe(),
            "union<string | null>"
        );
    }

    #[test]
    fn test_record_refs_at_any_depth() {
        let def = SchemaDefinition::new("Outer")
            .field("d", FieldDef::required_record("Inner"))
            .field("e", FieldDef::optional_array(FieldType::record("Leaf")));
        assert_eq!(def.record_refs(), vec!["Inner", "Leaf"]);
    }

    #[test]
    fn test_definition_from_json() {
        let def: SchemaDefinition = serde_json::from_str(
            r#"{
                "name": "DefaultModel",
                "fields": {
                    "a": {"type": "optional", "inner": {"type": "string"}, "elide": true},
                    "b": {"type": "optional", "inner": {"type": "string"}, "elide": true, "default": null},
                    "c": {"type": "optional", "inner": {"type": "array", "element_type": {"type": "string"}}, "elide": true, "default": [1, 2, 3]}
                }
            }"#,
        )
        .unwrap();

        assert_eq!(def.version, "1");
        assert_eq!(def.fields["a"].default, None);
        assert_eq!(def.fields["b"].default, Some(Value::Null));
        assert_eq!(def.fields["c"].default, Some(Value::from(vec![1, 2, 3])));
        assert!(def.fields.values().all(|f| f.elide));
    }

    #[test]
    fn test_definition_json_roundtrip_keeps_null_default() {
        let def = SchemaDefinition::new("M").field(
            "b",
            FieldDef::optional_string().elidable().with_default(Value::Null),
        );
        let text = serde_json::to_string(&def).unwrap();
        let back: SchemaDefinition = serde_json::from_str(&text).unwrap();
        assert!(def.same_as(&back));
    }

    #[test]
    fn test_same_as_is_order_sensitive() {
        let a = SchemaDefinition::new("T")
            .field("x", FieldDef::required_int())
            .field("y", FieldDef::required_int());
        let b = SchemaDefinition::new("T")
            .field("y", FieldDef::required_int())
            .field("x", FieldDef::required_int());
        assert!(!a.same_as(&b));
    }

    #[test]
    fn test_same_type_needs_matching_definition() {
        let a = Schema::register(SchemaDefinition::new("A").field("x", FieldDef::optional_int())).unwrap();
        let a2 = Schema::register(SchemaDefinition::new("A").field("x", FieldDef::optional_int())).unwrap();
        let other = Schema::register(
            SchemaDefinition::new("A")
                .field("x", FieldDef::optional_int().elidable())
                .field("y", FieldDef::optional_string()),
        )
        .unwrap();

        assert!(a.same_type(&a));
        assert!(a.same_type(&a2));
        assert!(!a.same_type(&other));
    }

    #[test]
    fn test_same_type_compares_nested_links() {
        let outer = || SchemaDefinition::new("Outer").field("d", FieldDef::optional_record("Inner"));

        let mut first = SchemaRegistry::new();
        first
            .register(SchemaDefinition::new("Inner").field("e", FieldDef::required_int()))
            .unwrap();
        let mut second = SchemaRegistry::new();
        second
            .register(SchemaDefinition::new("Inner").field("zzz", FieldDef::optional_string()))
            .unwrap();

        let first_outer = first.register(outer()).unwrap();
        let second_outer = second.register(outer()).unwrap();
        assert!(!first_outer.same_type(&second_outer));
    }
}
