//! Type validation and coercion of raw values
//!
//! Turns raw input into canonical values or rejects it:
//! - numbers render into strings, numeric strings parse into numbers
//! - enum member names normalize to the member's raw value
//! - arrays are validated element by element; elements are never dropped
//! - unions try their variants left to right
//! - raw maps for record fields are constructed into nested records
//!
//! The validator never decides elision. A null accepted here may still be
//! dropped later by the elision engine.

use super::errors::{ValidationDetails, ValidationError, ValidationResult};
use super::types::{EnumMember, FieldType, Links, Schema};
use crate::record::{ConstructionError, RecordInstance};
use crate::value::Value;

/// Validator bound to one schema's name (for errors) and nested links.
pub struct SchemaValidator<'a> {
    schema: &'a str,
    links: &'a Links,
}

impl<'a> SchemaValidator<'a> {
    /// Creates a validator for a schema that is still being registered.
    pub(crate) fn new(schema: &'a str, links: &'a Links) -> Self {
        Self { schema, links }
    }

    /// Creates a validator for a registered schema.
    pub fn for_schema(schema: &'a Schema) -> Self {
        Self::new(schema.name(), schema.links())
    }

    /// Validates `raw` against `declared`, returning the canonical value.
    ///
    /// `path` names the value in errors (`c`, `c[0]`, `d.e`).
    pub fn validate(&self, declared: &FieldType, raw: Value, path: &str) -> ValidationResult<Value> {
        if raw.is_null() {
            return if declared.admits_null() {
                Ok(Value::Null)
            } else {
                Err(self.fail(ValidationDetails::null_value(path)))
            };
        }

        match declared {
            FieldType::Optional { inner } => self.validate(inner, raw, path),
            FieldType::Null => Err(self.mismatch(path, declared, &raw)),
            FieldType::String => coerce_string(raw).map_err(|raw| self.mismatch(path, declared, &raw)),
            FieldType::Int => coerce_int(raw).map_err(|raw| self.mismatch(path, declared, &raw)),
            FieldType::Float => coerce_float(raw).map_err(|raw| self.mismatch(path, declared, &raw)),
            FieldType::Bool => coerce_bool(raw).map_err(|raw| self.mismatch(path, declared, &raw)),
            FieldType::Enum { members, .. } => {
                normalize_enum(members, &raw).ok_or_else(|| self.mismatch(path, declared, &raw))
            }
            FieldType::Array { element_type } => match raw {
                Value::Array(items) => items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| self.validate(element_type, item, &format!("{}[{}]", path, i)))
                    .collect::<ValidationResult<Vec<_>>>()
                    .map(Value::Array),
                other => Err(self.mismatch(path, declared, &other)),
            },
            FieldType::Union { variants } => {
                for variant in variants {
                    if let Ok(value) = self.validate(variant, raw.clone(), path) {
                        return Ok(value);
                    }
                }
                Err(self.mismatch(path, declared, &raw))
            }
            FieldType::Record { schema } => self.validate_record(schema, raw, path),
        }
    }

    /// Accepts an already constructed record of the right type as an opaque
    /// value, or constructs one from raw arguments.
    fn validate_record(&self, target: &str, raw: Value, path: &str) -> ValidationResult<Value> {
        let nested = self.links.get(target).ok_or_else(|| {
            self.fail(ValidationDetails::new(
                path,
                format!("record {}", target),
                "unregistered record type",
            ))
        })?;

        match raw {
            Value::Record(record) if record.schema().same_type(nested) => Ok(Value::Record(record)),
            Value::Record(record) => {
                let actual = if record.type_name() == target {
                    format!("record {} of another definition", target)
                } else {
                    format!("record {}", record.type_name())
                };
                Err(self.fail(ValidationDetails::type_mismatch(
                    path,
                    format!("record {}", target),
                    actual,
                )))
            }
            Value::Map(args) => RecordInstance::construct(nested, args)
                .map(Value::from)
                .map_err(|err| self.nested_failure(target, path, err)),
            other => Err(self.fail(ValidationDetails::type_mismatch(
                path,
                format!("record {}", target),
                other.type_name(),
            ))),
        }
    }

    fn nested_failure(&self, target: &str, path: &str, err: ConstructionError) -> ValidationError {
        let details = match err {
            ConstructionError::Validation(inner) => inner.into_details().nested_under(path),
            ConstructionError::MissingField(missing) => {
                ValidationDetails::missing_field(missing.field).nested_under(path)
            }
            other => ValidationDetails::new(path, format!("record {}", target), other.to_string()),
        };
        self.fail(details)
    }

    fn fail(&self, details: ValidationDetails) -> ValidationError {
        ValidationError::new(self.schema, details)
    }

    fn mismatch(&self, path: &str, declared: &FieldType, actual: &Value) -> ValidationError {
        self.fail(ValidationDetails::type_mismatch(
            path,
            declared.describe(),
            actual.type_name(),
        ))
    }
}

fn coerce_string(raw: Value) -> Result<Value, Value> {
    match raw {
        Value::String(_) => Ok(raw),
        Value::Int(i) => Ok(Value::String(i.to_string())),
        Value::Float(f) if f.is_finite() => Ok(Value::String(render_float(f))),
        Value::Bool(b) => Ok(Value::String(if b { "True" } else { "False" }.to_string())),
        other => Err(other),
    }
}

/// Shortest round-trip text, always with a decimal point or exponent:
/// `3.0`, `2.5`, `1e+20`, `1e-7`.
fn render_float(f: f64) -> String {
    let text = format!("{:?}", f);
    match text.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => text,
    }
}

fn coerce_int(raw: Value) -> Result<Value, Value> {
    match raw {
        Value::Int(_) => Ok(raw),
        Value::Float(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => {
            Ok(Value::Int(f as i64))
        }
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(i) => Ok(Value::Int(i)),
            Err(_) => Err(Value::String(s)),
        },
        other => Err(other),
    }
}

fn coerce_float(raw: Value) -> Result<Value, Value> {
    match raw {
        Value::Float(_) => Ok(raw),
        Value::Int(i) => Ok(Value::Float(i as f64)),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(f) => Ok(Value::Float(f)),
            Err(_) => Err(Value::String(s)),
        },
        other => Err(other),
    }
}

fn coerce_bool(raw: Value) -> Result<Value, Value> {
    match raw {
        Value::Bool(_) => Ok(raw),
        Value::Int(0) => Ok(Value::Bool(false)),
        Value::Int(1) => Ok(Value::Bool(true)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Ok(Value::Bool(true)),
            "false" | "f" | "no" | "n" | "off" | "0" => Ok(Value::Bool(false)),
            _ => Err(Value::String(s)),
        },
        other => Err(other),
    }
}

/// Raw values match first, then member names.
fn normalize_enum(members: &[EnumMember], raw: &Value) -> Option<Value> {
    if let Some(member) = members.iter().find(|m| &m.value == raw) {
        return Some(member.value.clone());
    }
    let name = raw.as_str()?;
    members
        .iter()
        .find(|m| m.name == name)
        .map(|m| m.value.clone())
}
