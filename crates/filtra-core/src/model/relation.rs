///
/// Cardinality
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cardinality {
    /// Optional single related record.
    One,
    /// Collection of related records.
    Many,
}

///
/// RelationModel
///
/// Reference from one entity to another, resolved on demand.
/// Related records are the target records whose `foreign_field` equals the
/// source's `local_field`; a list-valued `local_field` matches any element.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RelationModel {
    pub name: &'static str,
    /// Target entity name (resolved through the registry).
    pub target: &'static str,
    pub cardinality: Cardinality,
    pub local_field: &'static str,
    pub foreign_field: &'static str,
}

impl RelationModel {
    #[must_use]
    pub const fn one(
        name: &'static str,
        target: &'static str,
        local_field: &'static str,
        foreign_field: &'static str,
    ) -> Self {
        Self {
            name,
            target,
            cardinality: Cardinality::One,
            local_field,
            foreign_field,
        }
    }

    #[must_use]
    pub const fn many(
        name: &'static str,
        target: &'static str,
        local_field: &'static str,
        foreign_field: &'static str,
    ) -> Self {
        Self {
            name,
            target,
            cardinality: Cardinality::Many,
            local_field,
            foreign_field,
        }
    }

    #[must_use]
    pub const fn is_many(&self) -> bool {
        matches!(self.cardinality, Cardinality::Many)
    }
}
