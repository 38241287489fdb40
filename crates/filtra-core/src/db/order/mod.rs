//! Record ordering: order specs, the compiled comparator and `orderBy`
//! documents.

mod comparator;
mod document;

#[cfg(test)]
mod tests;

// re-exports
pub use comparator::{Comparator, Ranked};
pub use document::parse_order_by;

use serde::{Deserialize, Serialize};

///
/// OrderDirection
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    #[must_use]
    pub const fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

///
/// NullsOrder
/// Placement of null and unset values relative to present values.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NullsOrder {
    #[default]
    First,
    Last,
}

impl NullsOrder {
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::First => Self::Last,
            Self::Last => Self::First,
        }
    }
}

///
/// OrderField
///
/// One `(field, direction)` pair. An explicit `nulls` is absolute; without
/// it the configured placement applies to ascending order and is mirrored
/// for descending order.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderField {
    pub field: String,
    pub direction: OrderDirection,
    pub nulls: Option<NullsOrder>,
}

impl OrderField {
    #[must_use]
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: OrderDirection::Asc,
            nulls: None,
        }
    }

    #[must_use]
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: OrderDirection::Desc,
            nulls: None,
        }
    }

    #[must_use]
    pub const fn nulls(mut self, nulls: NullsOrder) -> Self {
        self.nulls = Some(nulls);
        self
    }
}

///
/// OrderSpec
/// Ordered sort keys; ties fall through to later keys, then to position.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OrderSpec {
    pub fields: Vec<OrderField>,
}

impl OrderSpec {
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    #[must_use]
    pub fn then(mut self, field: OrderField) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn asc(self, field: impl Into<String>) -> Self {
        self.then(OrderField::asc(field))
    }

    #[must_use]
    pub fn desc(self, field: impl Into<String>) -> Self {
        self.then(OrderField::desc(field))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<OrderField> for OrderSpec {
    fn from_iter<I: IntoIterator<Item = OrderField>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
