use crate::value::{Value, ValueFamily};
use std::fmt;

///
/// FieldModel
/// Runtime field metadata used by validation and ordering.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldModel {
    /// Field name as used in filters, ordering and projections.
    pub name: &'static str,
    /// Declared type.
    pub kind: FieldKind,
    /// Optional field: may hold `null` or be unset.
    pub nullable: bool,
    /// Values are unique across the entity (usable as a cursor key).
    pub unique: bool,
}

impl FieldModel {
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            nullable: false,
            unique: false,
        }
    }

    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

///
/// FieldKind
///
/// Declared scalar type of a field, or a list of one scalar type.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldKind {
    Bool,
    Int,
    Float,
    Text,
    Date,
    Timestamp,
    Id,
    Enum(&'static [&'static str]),
    List(&'static Self),
}

impl FieldKind {
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }

    /// Lists have no natural order; every scalar kind does.
    #[must_use]
    pub const fn is_orderable(&self) -> bool {
        !self.is_list()
    }

    /// Element kind of a list field.
    #[must_use]
    pub const fn element(&self) -> Option<&'static Self> {
        match *self {
            Self::List(inner) => Some(inner),
            _ => None,
        }
    }

    /// Whether an already-lowered scalar literal inhabits this kind.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Bool, Value::Bool(_))
            | (Self::Int, Value::Int(_))
            | (Self::Float, Value::Float(_))
            | (Self::Text, Value::Text(_))
            | (Self::Date, Value::Date(_))
            | (Self::Timestamp, Value::Timestamp(_))
            | (Self::Id, Value::Id(_)) => true,
            (Self::Enum(variants), Value::Enum(v)) => variants.contains(&v.as_str()),
            (Self::List(inner), Value::List(items)) => items.iter().all(|item| inner.accepts(item)),
            _ => false,
        }
    }

    #[must_use]
    pub const fn family(&self) -> ValueFamily {
        match self {
            Self::Bool => ValueFamily::Bool,
            Self::Int | Self::Float => ValueFamily::Numeric,
            Self::Text => ValueFamily::Textual,
            Self::Date | Self::Timestamp => ValueFamily::Temporal,
            Self::Id => ValueFamily::Identifier,
            Self::Enum(_) => ValueFamily::Enum,
            Self::List(_) => ValueFamily::Collection,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("Bool"),
            Self::Int => f.write_str("Int"),
            Self::Float => f.write_str("Float"),
            Self::Text => f.write_str("Text"),
            Self::Date => f.write_str("Date"),
            Self::Timestamp => f.write_str("Timestamp"),
            Self::Id => f.write_str("Id"),
            Self::Enum(_) => f.write_str("Enum"),
            Self::List(inner) => write!(f, "List<{inner}>"),
        }
    }
}
