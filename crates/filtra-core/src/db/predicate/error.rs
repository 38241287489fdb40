use std::fmt;
use thiserror::Error as ThisError;

/// Compile-time failures of filters, orderings, cursors and projections.
///
/// Every variant names the offending field or operator so the caller can
/// fix the input; nothing is partially applied.
#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ValidateError {
    #[error("unknown entity '{entity}'")]
    UnknownEntity { entity: String },

    #[error("unknown field '{entity}.{field}'")]
    UnknownField { entity: String, field: String },

    #[error("unknown relation '{entity}.{relation}'")]
    UnknownRelation { entity: String, relation: String },

    #[error("unknown operator '{op}' on '{field}'")]
    UnknownOperator { field: String, op: String },

    #[error("operator {op} is not valid for field '{field}' of type {kind}")]
    InvalidOperator {
        field: String,
        op: String,
        kind: String,
    },

    #[error("operator {op} is not valid for {cardinality} relation '{relation}'")]
    InvalidRelationOperator {
        relation: String,
        op: String,
        cardinality: &'static str,
    },

    #[error("invalid literal for field '{field}': {message}")]
    InvalidLiteral { field: String, message: String },

    #[error("field '{field}' is not nullable")]
    NotNullable { field: String },

    #[error("invalid text mode {mode} on field '{field}'; expected \"default\" or \"insensitive\"")]
    InvalidMode { field: String, mode: String },

    #[error("filter nesting depth {depth} exceeds the limit of {max}")]
    DepthExceeded { depth: usize, max: usize },

    #[error("list literal for field '{field}' has {len} items; the limit is {max}")]
    ListLiteralTooLong { field: String, len: usize, max: usize },

    #[error("field '{field}' cannot be used for ordering")]
    NotOrderable { field: String },

    #[error("field '{field}' is not a unique field of '{entity}'")]
    NotUnique { entity: String, field: String },

    #[error("cursor must name at least one unique field")]
    EmptyCursor,

    #[error("take {take} exceeds the limit of {max}")]
    TakeTooLarge { take: i64, max: u64 },

    #[error("invalid projection on '{entity}': {message}")]
    InvalidProjection { entity: String, message: String },

    #[error("malformed input: {message}")]
    Malformed { message: String },
}

impl ValidateError {
    pub(crate) fn unknown_field(entity: &str, field: &str) -> Self {
        Self::UnknownField {
            entity: entity.to_string(),
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid_operator(field: &str, op: &str, kind: impl fmt::Display) -> Self {
        Self::InvalidOperator {
            field: field.to_string(),
            op: op.to_string(),
            kind: kind.to_string(),
        }
    }

    pub(crate) fn invalid_literal(field: &str, msg: &str) -> Self {
        Self::InvalidLiteral {
            field: field.to_string(),
            message: msg.to_string(),
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}
