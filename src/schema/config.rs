//! Per-schema record configuration
//!
//! Every field has a default, so definitions may omit `config` entirely.

use serde::{Deserialize, Serialize};

/// Handling of argument names a schema does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraFields {
    /// Drop undeclared names silently
    #[default]
    Ignore,
    /// Reject construction on any undeclared name
    Forbid,
}

/// Construction and assignment behaviour of one record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordConfig {
    /// Undeclared argument policy.
    pub extra: ExtraFields,
    /// Whether `RecordInstance::set` is allowed (re-validating the value).
    pub validate_assignment: bool,
}

impl Default for RecordConfig {
    fn default() -> Self {
        Self {
            extra: ExtraFields::Ignore,
            validate_assignment: true,
        }
    }
}

impl RecordConfig {
    /// Config that rejects undeclared argument names.
    pub fn forbid_extra() -> Self {
        Self {
            extra: ExtraFields::Forbid,
            ..Self::default()
        }
    }

    /// Config that freezes instances after construction.
    pub fn frozen() -> Self {
        Self {
            validate_assignment: false,
            ..Self::default()
        }
    }
}
