//! Capabilities the compiler consumes from its collaborators: typed entity
//! kinds, record field access, relation resolution and storage scans.

use crate::{
    db::source::{RelationError, SourceError},
    model::{EntityModel, RelationModel},
    value::Value,
};
use std::borrow::Cow;

///
/// EntityKind
///
/// Statically typed entity kind; generated code implements this once per
/// model so repositories can be requested by type instead of by name.
///

pub trait EntityKind {
    const MODEL: &'static EntityModel;
}

///
/// FieldPresence
///
/// Result of reading a field from a record. Distinguishes an unset field
/// from a present field whose value may be `Value::Null`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldPresence<'a> {
    /// Field exists and has a value (including `Value::Null`).
    Present(Cow<'a, Value>),

    /// Field is not set on the record.
    Missing,
}

impl FieldPresence<'_> {
    /// The present value, treating `Null` and unset fields alike.
    #[must_use]
    pub fn non_null(&self) -> Option<&Value> {
        match self {
            Self::Present(value) if !value.is_null() => Some(&**value),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Self::Present(value) => value.into_owned(),
            Self::Missing => Value::Null,
        }
    }
}

///
/// Record
///
/// Row-like value that exposes fields by name.
/// This decouples predicate evaluation from concrete entity types.
///

pub trait Record {
    fn field(&self, name: &str) -> FieldPresence<'_>;
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> FieldPresence<'_> {
        (**self).field(name)
    }
}

///
/// RelationResolver
///
/// Supplies related records on demand. Errors are soft: evaluation treats
/// an unresolvable relation as empty.
///

pub trait RelationResolver<R> {
    fn resolve(
        &self,
        entity: &EntityModel,
        record: &R,
        relation: &RelationModel,
    ) -> Result<Vec<R>, RelationError>;
}

///
/// NoRelations
///
/// Resolver for callers that never traverse relations; every relation
/// resolves as unavailable and is therefore treated as empty.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoRelations;

impl<R> RelationResolver<R> for NoRelations {
    fn resolve(
        &self,
        entity: &EntityModel,
        _: &R,
        relation: &RelationModel,
    ) -> Result<Vec<R>, RelationError> {
        Err(RelationError::Unavailable {
            entity: entity.name.to_string(),
            relation: relation.name.to_string(),
        })
    }
}

///
/// RecordSource
///
/// Storage collaborator: yields every stored record of one entity.
///

pub trait RecordSource {
    type Record: Record + Clone;

    fn scan(&self, entity: &EntityModel) -> Result<Vec<Self::Record>, SourceError>;
}
