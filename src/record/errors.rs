//! # Record Errors
//!
//! Failures surfaced by construction, access and assignment.

use thiserror::Error;

use crate::schema::ValidationError;

/// Result type for record operations
pub type RecordResult<T> = Result<T, ConstructionError>;

/// A required field was absent from the construction arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{schema}': required field '{field}' was not provided")]
pub struct MissingFieldError {
    pub schema: String,
    pub field: String,
}

impl MissingFieldError {
    pub fn new(schema: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            field: field.into(),
        }
    }
}

/// Access to a field the record does not hold (elided or undeclared).
///
/// Recoverable: check `RecordInstance::contains` first.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{schema}': field '{field}' is not present")]
pub struct AttributeNotPresentError {
    pub schema: String,
    pub field: String,
}

impl AttributeNotPresentError {
    pub fn new(schema: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            field: field.into(),
        }
    }
}

/// Record construction and assignment errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    MissingField(#[from] MissingFieldError),

    #[error(transparent)]
    AttributeNotPresent(#[from] AttributeNotPresentError),

    #[error("'{schema}': assignment to '{field}' is disabled")]
    AssignmentDisabled { schema: String, field: String },
}

impl ConstructionError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            ConstructionError::Validation(err) => err.code().code(),
            ConstructionError::MissingField(_) => "ELIDE_MISSING_FIELD",
            ConstructionError::AttributeNotPresent(_) => "ELIDE_ATTRIBUTE_NOT_PRESENT",
            ConstructionError::AssignmentDisabled { .. } => "ELIDE_ASSIGNMENT_DISABLED",
        }
    }
}
