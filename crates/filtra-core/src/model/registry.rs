use crate::{model::entity::EntityModel, traits::EntityKind};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error as ThisError;

///
/// SchemaRegistry
///
/// Closed set of entity models keyed by entity name.
/// This is the only schema surface the filter compiler depends on.
///

#[derive(Clone, Debug, Default)]
pub struct SchemaRegistry {
    entities: BTreeMap<&'static str, &'static EntityModel>,
}

impl SchemaRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from models and check that every relation target exists.
    pub fn from_models(
        models: impl IntoIterator<Item = &'static EntityModel>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for model in models {
            registry.register(model)?;
        }
        registry.validate_relations()?;

        Ok(registry)
    }

    /// Register one model after checking its internal consistency.
    pub fn register(&mut self, model: &'static EntityModel) -> Result<(), RegistryError> {
        if self.entities.contains_key(model.name) {
            return Err(RegistryError::DuplicateEntity {
                entity: model.name.to_string(),
            });
        }
        validate_model(model)?;

        self.entities.insert(model.name, model);

        Ok(())
    }

    /// Register a statically typed entity.
    pub fn register_kind<E: EntityKind>(&mut self) -> Result<(), RegistryError> {
        self.register(E::MODEL)
    }

    /// Check every relation points at a registered entity and a real field there.
    pub fn validate_relations(&self) -> Result<(), RegistryError> {
        for model in self.entities.values() {
            for relation in model.relations {
                let target = self.get(relation.target).ok_or_else(|| {
                    RegistryError::UnknownRelationTarget {
                        entity: model.name.to_string(),
                        relation: relation.name.to_string(),
                        target: relation.target.to_string(),
                    }
                })?;

                if target.field(relation.foreign_field).is_none() {
                    return Err(RegistryError::UnknownRelationField {
                        entity: target.name.to_string(),
                        relation: relation.name.to_string(),
                        field: relation.foreign_field.to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'static EntityModel> {
        self.entities.get(name).copied()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    pub fn models(&self) -> impl Iterator<Item = &'static EntityModel> + '_ {
        self.entities.values().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

// Check field names, primary key and relation-local fields of one model.
fn validate_model(model: &EntityModel) -> Result<(), RegistryError> {
    let mut seen = BTreeSet::new();
    for field in model.fields {
        if !seen.insert(field.name) {
            return Err(RegistryError::DuplicateField {
                entity: model.name.to_string(),
                field: field.name.to_string(),
            });
        }
    }

    let pk = model
        .field(model.primary_key)
        .ok_or_else(|| RegistryError::InvalidPrimaryKey {
            entity: model.name.to_string(),
            field: model.primary_key.to_string(),
        })?;
    if pk.nullable || pk.kind.is_list() {
        return Err(RegistryError::InvalidPrimaryKey {
            entity: model.name.to_string(),
            field: model.primary_key.to_string(),
        });
    }

    for relation in model.relations {
        if !seen.insert(relation.name) {
            return Err(RegistryError::DuplicateField {
                entity: model.name.to_string(),
                field: relation.name.to_string(),
            });
        }
        if model.field(relation.local_field).is_none() {
            return Err(RegistryError::UnknownRelationField {
                entity: model.name.to_string(),
                relation: relation.name.to_string(),
                field: relation.local_field.to_string(),
            });
        }
    }

    Ok(())
}

///
/// RegistryError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RegistryError {
    #[error("entity '{entity}' is registered twice")]
    DuplicateEntity { entity: String },

    #[error("entity '{entity}' declares '{field}' more than once")]
    DuplicateField { entity: String, field: String },

    #[error("entity '{entity}' primary key '{field}' must be a required scalar field")]
    InvalidPrimaryKey { entity: String, field: String },

    #[error("relation '{entity}.{relation}' targets unknown entity '{target}'")]
    UnknownRelationTarget {
        entity: String,
        relation: String,
        target: String,
    },

    #[error("relation '{relation}' references unknown field '{entity}.{field}'")]
    UnknownRelationField {
        entity: String,
        relation: String,
        field: String,
    },
}

///
/// TESTS
///
