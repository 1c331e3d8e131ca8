//! Schema and validation error types
//!
//! Error codes:
//! - ELIDE_SCHEMA_INVALID (REJECT)
//! - ELIDE_SCHEMA_ELIDE_NON_NULLABLE (REJECT)
//! - ELIDE_SCHEMA_INVALID_DEFAULT (REJECT)
//! - ELIDE_SCHEMA_UNKNOWN_RECORD_TYPE (REJECT)
//! - ELIDE_SCHEMA_IMMUTABLE (REJECT)
//! - ELIDE_UNKNOWN_SCHEMA (REJECT)
//! - ELIDE_SCHEMA_MALFORMED (FATAL)
//! - ELIDE_VALIDATION_FAILED (REJECT)

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The offending definition or input is rejected
    Reject,
    /// Schema set cannot be loaded; the caller must not continue
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Structurally invalid definition (empty names)
    InvalidSchema,
    /// Field marked elidable but its type does not admit null
    ElideNonNullable,
    /// Default literal cannot be coerced to the declared type
    InvalidDefault,
    /// Nested record reference to a schema that is not registered
    UnknownRecordType,
    /// A different definition is already registered under this name
    SchemaImmutable,
    /// Lookup of a schema name that is not registered
    UnknownSchema,
    /// Definition file unreadable or not valid JSON
    MalformedDefinition,
    /// Raw input rejected by the validator
    ValidationFailed,
}

impl SchemaErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::InvalidSchema => "ELIDE_SCHEMA_INVALID",
            SchemaErrorCode::ElideNonNullable => "ELIDE_SCHEMA_ELIDE_NON_NULLABLE",
            SchemaErrorCode::InvalidDefault => "ELIDE_SCHEMA_INVALID_DEFAULT",
            SchemaErrorCode::UnknownRecordType => "ELIDE_SCHEMA_UNKNOWN_RECORD_TYPE",
            SchemaErrorCode::SchemaImmutable => "ELIDE_SCHEMA_IMMUTABLE",
            SchemaErrorCode::UnknownSchema => "ELIDE_UNKNOWN_SCHEMA",
            SchemaErrorCode::MalformedDefinition => "ELIDE_SCHEMA_MALFORMED",
            SchemaErrorCode::ValidationFailed => "ELIDE_VALIDATION_FAILED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::MalformedDefinition => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Validation failure details
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetails {
    /// Field path (e.g., "d.g", "c[0]")
    pub field: String,
    /// Expected type or condition
    pub expected: String,
    /// Actual value or type found
    pub actual: String,
}

impl ValidationDetails {
    pub fn new(field: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::new(field, "field to be present", "missing")
    }

    pub fn extra_field(field: impl Into<String>) -> Self {
        Self::new(field, "no undeclared fields", "extra field present")
    }

    pub fn type_mismatch(field: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::new(field, expected, actual)
    }

    pub fn null_value(field: impl Into<String>) -> Self {
        Self::new(field, "non-null value", "null")
    }

    /// Re-roots the path under a parent field.
    pub fn nested_under(mut self, parent: &str) -> Self {
        self.field = make_path(parent, &self.field);
        self
    }
}

impl fmt::Display for ValidationDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}': expected {}, got {}", self.field, self.expected, self.actual)
    }
}

/// Joins a parent path and a field name.
pub(crate) fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else if field.starts_with('[') {
        format!("{}{}", prefix, field)
    } else {
        format!("{}.{}", prefix, field)
    }
}

/// Schema error type with full context
#[derive(Debug, Clone)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    schema: Option<String>,
    field: Option<String>,
    details: Option<ValidationDetails>,
}

impl SchemaError {
    fn new(code: SchemaErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            schema: None,
            field: None,
            details: None,
        }
    }

    fn at(mut self, schema: impl Into<String>, field: Option<String>) -> Self {
        self.schema = Some(schema.into());
        self.field = field;
        self
    }

    /// Create an invalid schema error
    pub fn invalid_schema(schema: impl Into<String>, reason: impl Into<String>) -> Self {
        let schema = schema.into();
        Self::new(
            SchemaErrorCode::InvalidSchema,
            format!("Schema '{}' is invalid: {}", schema, reason.into()),
        )
        .at(schema, None)
    }

    /// Create an error for an elidable field whose type cannot be null
    pub fn elide_non_nullable(schema: impl Into<String>, field: impl Into<String>, declared: &str) -> Self {
        let schema = schema.into();
        let field = field.into();
        Self::new(
            SchemaErrorCode::ElideNonNullable,
            format!(
                "Field '{}' of '{}' is elidable but its type {} does not admit null",
                field, schema, declared
            ),
        )
        .at(schema, Some(field))
    }

    /// Create an error for a default the validator rejects
    pub fn invalid_default(schema: impl Into<String>, field: impl Into<String>, details: ValidationDetails) -> Self {
        let schema = schema.into();
        let field = field.into();
        let mut err = Self::new(
            SchemaErrorCode::InvalidDefault,
            format!("Default for field '{}' of '{}' is invalid: {}", field, schema, details),
        )
        .at(schema, Some(field));
        err.details = Some(details);
        err
    }

    /// Create an error for a nested reference to an unregistered schema
    pub fn unknown_record_type(schema: impl Into<String>, field: impl Into<String>, target: &str) -> Self {
        let schema = schema.into();
        let field = field.into();
        Self::new(
            SchemaErrorCode::UnknownRecordType,
            format!(
                "Field '{}' of '{}' references unregistered record type '{}'",
                field, schema, target
            ),
        )
        .at(schema, Some(field))
    }

    /// Create a schema immutable error
    pub fn schema_immutable(schema: impl Into<String>) -> Self {
        let schema = schema.into();
        Self::new(
            SchemaErrorCode::SchemaImmutable,
            format!("Schema '{}' is already registered with a different definition", schema),
        )
        .at(schema, None)
    }

    /// Create an unknown schema error
    pub fn unknown_schema(schema: impl Into<String>) -> Self {
        let schema = schema.into();
        Self::new(SchemaErrorCode::UnknownSchema, format!("Schema '{}' not found", schema)).at(schema, None)
    }

    /// Create an error for a malformed definition file
    pub fn malformed_definition(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            SchemaErrorCode::MalformedDefinition,
            format!("Malformed schema definition '{}': {}", path.into(), reason.into()),
        )
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the schema name if applicable
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Returns the offending field if applicable
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns validation details if applicable
    pub fn details(&self) -> Option<&ValidationDetails> {
        self.details.as_ref()
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Raw input rejected by the validator.
///
/// Never partially applied: a construction that hits one of these produces
/// no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    schema: String,
    details: ValidationDetails,
}

impl ValidationError {
    pub fn new(schema: impl Into<String>, details: ValidationDetails) -> Self {
        Self {
            schema: schema.into(),
            details,
        }
    }

    /// Always `ValidationFailed`
    pub fn code(&self) -> SchemaErrorCode {
        SchemaErrorCode::ValidationFailed
    }

    /// Schema whose input was rejected
    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn details(&self) -> &ValidationDetails {
        &self.details
    }

    /// Path of the rejected field
    pub fn field(&self) -> &str {
        &self.details.field
    }

    pub fn into_details(self) -> ValidationDetails {
        self.details
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: '{}' validation failed: {}",
            self.code().severity(),
            self.code().code(),
            self.schema,
            self.details
        )
    }
}

impl std::error::Error for ValidationError {}

/// Result type for validator operations
pub type ValidationResult<T> = Result<T, ValidationError>;
