use crate::{
    db::source::{Document, RelationError, SourceError},
    model::{Cardinality, EntityModel, RelationModel},
    traits::{Record, RecordSource, RelationResolver},
    value::Value,
};
use std::collections::BTreeMap;

///
/// MemorySource
///
/// In-process collections keyed by entity name. Scanning a collection that
/// was never created yields no records; resolving a relation into one is a
/// soft `RelationError`.
///

#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    collections: BTreeMap<String, Vec<Document>>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection so relations into it resolve.
    #[must_use]
    pub fn with_collection(mut self, entity: &str) -> Self {
        self.collections.entry(entity.to_string()).or_default();
        self
    }

    pub fn insert(&mut self, entity: &str, doc: Document) {
        self.collections.entry(entity.to_string()).or_default().push(doc);
    }

    pub fn extend(&mut self, entity: &str, docs: impl IntoIterator<Item = Document>) {
        self.collections
            .entry(entity.to_string())
            .or_default()
            .extend(docs);
    }

    #[must_use]
    pub fn collection(&self, entity: &str) -> Option<&[Document]> {
        self.collections.get(entity).map(Vec::as_slice)
    }
}

impl RecordSource for MemorySource {
    type Record = Document;

    fn scan(&self, entity: &EntityModel) -> Result<Vec<Document>, SourceError> {
        Ok(self.collection(entity.name).map(<[_]>::to_vec).unwrap_or_default())
    }
}

impl RelationResolver<Document> for MemorySource {
    fn resolve(
        &self,
        _: &EntityModel,
        record: &Document,
        relation: &RelationModel,
    ) -> Result<Vec<Document>, RelationError> {
        let target = self
            .collection(relation.target)
            .ok_or_else(|| RelationError::UnknownCollection {
                relation: relation.name.to_string(),
                target: relation.target.to_string(),
            })?;

        let presence = record.field(relation.local_field);
        let Some(local) = presence.non_null() else {
            return Ok(Vec::new());
        };
        let keys = relation_keys(relation, local)?;

        let mut related: Vec<Document> = target
            .iter()
            .filter(|doc| foreign_matches(doc, relation.foreign_field, &keys))
            .cloned()
            .collect();

        if matches!(relation.cardinality, Cardinality::One) {
            related.truncate(1);
        }

        Ok(related)
    }
}

// Local key(s) of one relation; a list field contributes each element.
fn relation_keys<'a>(
    relation: &RelationModel,
    local: &'a Value,
) -> Result<Vec<&'a Value>, RelationError> {
    match local {
        Value::List(items) => Ok(items.iter().filter(|item| !item.is_null()).collect()),
        Value::Bool(_) => Err(RelationError::InvalidKey {
            relation: relation.name.to_string(),
            message: "boolean values cannot reference records".to_string(),
        }),
        other => Ok(vec![other]),
    }
}

fn foreign_matches(doc: &Document, foreign_field: &str, keys: &[&Value]) -> bool {
    match doc.get(foreign_field) {
        Some(Value::List(items)) => items.iter().any(|item| keys.contains(&item)),
        Some(value) if !value.is_null() => keys.contains(&value),
        _ => false,
    }
}

///
/// TESTS
///
