//! Everything a fill pass can fail with.
use std::fmt;
use thiserror::Error;

/// Which side of a `min`/`max` rule was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Min,
    Max,
}

impl fmt::Display for Bound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bound::Min => f.write_str("less than min"),
            Bound::Max => f.write_str("greater than max"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FillError {
    /// The target handed to [`crate::fill_slot`] is not a structure.
    #[error("provided type must be a pointer to a struct, got {found}")]
    NotAPointerToStruct { found: &'static str },

    /// A nested structure, sequence or mapping received the wrong kind of JSON value.
    #[error("invalid type for field {field}, expected {expected}, found {found}")]
    InvalidNestedInput {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field {field}: cannot convert {value} to {kind}: {reason}")]
    Conversion {
        field: String,
        value: String,
        kind: &'static str,
        reason: String,
    },

    #[error("field {field}: value {value} is {rule} {bound}")]
    ValidationBound {
        field: String,
        value: i64,
        rule: Bound,
        bound: i64,
    },

    #[error("field {field}: unsupported validation rule: {rule}")]
    UnsupportedRule { field: String, rule: String },

    #[error("field {field}: invalid validate tag entry {entry:?}: {reason}")]
    MalformedRule {
        field: String,
        entry: String,
        reason: String,
    },

    #[error("unsupported type for field {field}: {kind}")]
    UnsupportedFieldKind { field: String, kind: &'static str },

    #[error("field {field}: type identifier {identifier} not found in type registry {known:?}")]
    UnknownTypeIdentifier {
        field: String,
        identifier: String,
        known: Vec<String>,
    },
}

pub type Result<T, E = FillError> = std::result::Result<T, E>;
