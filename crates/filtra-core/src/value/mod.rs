mod compare;
mod family;
mod text;

#[cfg(test)]
mod tests;

use crate::types::{Date, Float64, Timestamp, Ulid};
use serde::{Serialize, Serializer, ser::SerializeSeq};
use std::cmp::Ordering;

// re-exports
pub use compare::{canonical_cmp, numeric_cmp, strict_order_cmp};
pub use family::ValueFamily;
pub use text::{TextMode, TextOp, fold_text, text_matches};

///
/// Value
/// field values as read from records, and literals inside filters
///
/// Null        → the field exists but holds no value.
/// List        → ordered scalar list (list fields and `in` literals).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(Float64),
    Text(String),
    Date(Date),
    Timestamp(Timestamp),
    Id(Ulid),
    Enum(String),
    List(Vec<Self>),
}

impl Value {
    /// Build a float value, rejecting NaN and infinities.
    #[must_use]
    pub fn float(v: f64) -> Option<Self> {
        Float64::try_new(v).map(Self::Float)
    }

    /// Build a list value from anything convertible into values.
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Numeric view used by aggregates.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(v.get()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn family(&self) -> ValueFamily {
        match self {
            Self::Null => ValueFamily::Null,
            Self::Bool(_) => ValueFamily::Bool,
            Self::Int(_) | Self::Float(_) => ValueFamily::Numeric,
            Self::Text(_) => ValueFamily::Textual,
            Self::Date(_) | Self::Timestamp(_) => ValueFamily::Temporal,
            Self::Id(_) => ValueFamily::Identifier,
            Self::Enum(_) => ValueFamily::Enum,
            Self::List(_) => ValueFamily::Collection,
        }
    }

    /// Stable rank used as the first key of the canonical order.
    #[must_use]
    pub(crate) const fn canonical_rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::Float(_) => 2,
            Self::Text(_) => 3,
            Self::Date(_) => 4,
            Self::Timestamp(_) => 5,
            Self::Id(_) => 6,
            Self::Enum(_) => 7,
            Self::List(_) => 8,
        }
    }

    /// Whether a list value contains an element equal to `needle`.
    #[must_use]
    pub fn list_contains(&self, needle: &Self) -> bool {
        self.as_list()
            .is_some_and(|items| items.iter().any(|item| item == needle))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        canonical_cmp(self, other)
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_none(),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Float(v) => v.serialize(serializer),
            Self::Text(v) | Self::Enum(v) => serializer.serialize_str(v),
            Self::Date(v) => v.serialize(serializer),
            Self::Timestamp(v) => v.serialize(serializer),
            Self::Id(v) => serializer.collect_str(v),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

// conversions

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<Float64> for Value {
    fn from(v: Float64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Date> for Value {
    fn from(v: Date) -> Self {
        Self::Date(v)
    }
}

impl From<Timestamp> for Value {
    fn from(v: Timestamp) -> Self {
        Self::Timestamp(v)
    }
}

impl From<Ulid> for Value {
    fn from(v: Ulid) -> Self {
        Self::Id(v)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::list(v)
    }
}
