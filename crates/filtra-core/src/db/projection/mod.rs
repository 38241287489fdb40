//! Partial selection of result records: `select`, `include` and `omit`.
//!
//! A `Projection` names which scalar fields to keep and which relations to
//! materialize, each with its own nested projection. It is compiled once
//! and then applied to every result record.

mod compiled;
mod document;

#[cfg(test)]
mod tests;

// re-exports
pub use compiled::{CompiledProjection, ProjectedRecord, ProjectedRelation};
pub use document::parse_projection;

use std::collections::BTreeMap;

///
/// Selection
/// Which scalar fields of one entity are kept.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Selection {
    #[default]
    All,
    Only(Vec<String>),
    AllExcept(Vec<String>),
}

///
/// Projection
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Projection {
    pub scalars: Selection,
    pub relations: BTreeMap<String, Self>,
}

impl Projection {
    /// Every scalar field and no relations.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Only the named scalar fields.
    #[must_use]
    pub fn select<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scalars: Selection::Only(fields.into_iter().map(Into::into).collect()),
            relations: BTreeMap::new(),
        }
    }

    /// Every scalar field except the named ones.
    #[must_use]
    pub fn omit<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scalars: Selection::AllExcept(fields.into_iter().map(Into::into).collect()),
            relations: BTreeMap::new(),
        }
    }

    /// Also materialize `relation`, projected by `nested`.
    #[must_use]
    pub fn include(mut self, relation: impl Into<String>, nested: Self) -> Self {
        self.relations.insert(relation.into(), nested);
        self
    }

    #[must_use]
    pub fn is_all(&self) -> bool {
        self.scalars == Selection::All && self.relations.is_empty()
    }
}
