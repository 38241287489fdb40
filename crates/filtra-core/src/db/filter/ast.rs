use crate::value::{TextMode, Value};
use std::ops::{BitAnd, BitOr, Not};

///
/// Filter AST
///
/// Pure, schema-agnostic representation of a filter expression.
/// This layer contains no type validation; all interpretation happens when
/// the filter is compiled against an entity model.
///

///
/// Filter
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Filter {
    /// Every child holds; empty is true.
    And(Vec<Self>),
    /// At least one child holds; empty is false.
    Or(Vec<Self>),
    /// No child holds.
    Not(Vec<Self>),
    Field(FieldFilter),
    Relation(RelationFilter),
}

impl Filter {
    #[must_use]
    pub const fn and(filters: Vec<Self>) -> Self {
        Self::And(filters)
    }

    #[must_use]
    pub const fn or(filters: Vec<Self>) -> Self {
        Self::Or(filters)
    }

    #[must_use]
    pub const fn none_of(filters: Vec<Self>) -> Self {
        Self::Not(filters)
    }

    /// Start a field filter; chain operators on the returned value.
    #[must_use]
    pub fn field(name: impl Into<String>) -> FieldFilter {
        FieldFilter::new(name)
    }

    /// To-many: at least one related record matches.
    #[must_use]
    pub fn some(relation: impl Into<String>, filter: Self) -> Self {
        Self::relation(relation, RelationOp::Some(Box::new(filter)))
    }

    /// To-many: every related record matches (true when there are none).
    #[must_use]
    pub fn every(relation: impl Into<String>, filter: Self) -> Self {
        Self::relation(relation, RelationOp::Every(Box::new(filter)))
    }

    /// To-many: no related record matches.
    #[must_use]
    pub fn none(relation: impl Into<String>, filter: Self) -> Self {
        Self::relation(relation, RelationOp::None(Box::new(filter)))
    }

    /// To-one: the related record exists and matches; `None` tests for absence.
    #[must_use]
    pub fn is(relation: impl Into<String>, filter: Option<Self>) -> Self {
        Self::relation(relation, RelationOp::Is(filter.map(Box::new)))
    }

    /// To-one: the related record is absent or does not match; `None` tests for presence.
    #[must_use]
    pub fn is_not(relation: impl Into<String>, filter: Option<Self>) -> Self {
        Self::relation(relation, RelationOp::IsNot(filter.map(Box::new)))
    }

    fn relation(relation: impl Into<String>, op: RelationOp) -> Self {
        Self::Relation(RelationFilter {
            relation: relation.into(),
            op,
        })
    }

    /// Nesting depth; a leaf is depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::And(children) | Self::Or(children) | Self::Not(children) => {
                1 + children.iter().map(Self::depth).max().unwrap_or(0)
            }
            Self::Field(filter) => filter.depth(),
            Self::Relation(rel) => 1 + rel.op.filter().map_or(0, Self::depth),
        }
    }
}

impl Default for Filter {
    /// Matches every record.
    fn default() -> Self {
        Self::And(Vec::new())
    }
}

impl From<FieldFilter> for Filter {
    fn from(filter: FieldFilter) -> Self {
        Self::Field(filter)
    }
}

impl From<RelationFilter> for Filter {
    fn from(filter: RelationFilter) -> Self {
        Self::Relation(filter)
    }
}

impl BitAnd for Filter {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::And(vec![self, rhs])
    }
}

impl BitOr for Filter {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Or(vec![self, rhs])
    }
}

impl Not for Filter {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::Not(vec![self])
    }
}

///
/// FieldFilter
///
/// One field plus the conditions that must all hold on it. `mode` is the
/// case rule for every text comparison in `conditions`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub mode: TextMode,
    pub conditions: Vec<Condition>,
}

impl FieldFilter {
    #[must_use]
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            mode: TextMode::Cs,
            conditions: Vec::new(),
        }
    }

    /// One plus the deepest `not` nesting among the conditions.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + self.conditions.iter().map(Condition::depth).max().unwrap_or(0)
    }
}

///
/// Condition
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Condition {
    /// Exact match; `Value::Null` tests for null (or unset).
    Equals(Value),
    /// Negated nested conditions; `not: v` is `Not([Equals(v)])`.
    Not(Vec<Self>),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    Lt(Value),
    Lte(Value),
    Gt(Value),
    Gte(Value),
    Contains(String),
    StartsWith(String),
    EndsWith(String),
    /// Field is present (`true`) or unset (`false`); optional fields only.
    IsSet(bool),

    // scalar-list operators
    Has(Value),
    HasEvery(Vec<Value>),
    HasSome(Vec<Value>),
    IsEmpty(bool),
}

impl Condition {
    /// Operator name as spelled in filter documents.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Equals(_) => "equals",
            Self::Not(_) => "not",
            Self::In(_) => "in",
            Self::NotIn(_) => "notIn",
            Self::Lt(_) => "lt",
            Self::Lte(_) => "lte",
            Self::Gt(_) => "gt",
            Self::Gte(_) => "gte",
            Self::Contains(_) => "contains",
            Self::StartsWith(_) => "startsWith",
            Self::EndsWith(_) => "endsWith",
            Self::IsSet(_) => "isSet",
            Self::Has(_) => "has",
            Self::HasEvery(_) => "hasEvery",
            Self::HasSome(_) => "hasSome",
            Self::IsEmpty(_) => "isEmpty",
        }
    }

    /// Nested `not` levels; a plain operator is depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Not(inner) => 1 + inner.iter().map(Self::depth).max().unwrap_or(0),
            _ => 0,
        }
    }
}

///
/// RelationFilter
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RelationFilter {
    pub relation: String,
    pub op: RelationOp,
}

///
/// RelationOp
///
/// `Some`/`Every`/`None` apply to to-many relations, `Is`/`IsNot` to
/// to-one relations. A `None` payload on `Is`/`IsNot` is the literal `null`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RelationOp {
    Some(Box<Filter>),
    Every(Box<Filter>),
    None(Box<Filter>),
    Is(Option<Box<Filter>>),
    IsNot(Option<Box<Filter>>),
}

impl RelationOp {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Some(_) => "some",
            Self::Every(_) => "every",
            Self::None(_) => "none",
            Self::Is(_) => "is",
            Self::IsNot(_) => "isNot",
        }
    }

    #[must_use]
    pub const fn is_to_many(&self) -> bool {
        matches!(self, Self::Some(_) | Self::Every(_) | Self::None(_))
    }

    /// Nested filter, if any.
    #[must_use]
    pub fn filter(&self) -> Option<&Filter> {
        match self {
            Self::Some(f) | Self::Every(f) | Self::None(f) => Some(&**f),
            Self::Is(f) | Self::IsNot(f) => f.as_deref(),
        }
    }
}
