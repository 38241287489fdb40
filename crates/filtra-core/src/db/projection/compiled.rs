use crate::{
    db::{
        predicate::ValidateError,
        projection::{Projection, Selection},
    },
    model::{EntityModel, FieldModel, RelationModel, SchemaRegistry},
    obs::sink::{self, MetricsEvent},
    traits::{FieldPresence, Record, RelationResolver},
    value::Value,
};
use serde::{Serialize, Serializer, ser::SerializeMap};
use std::collections::BTreeMap;

///
/// CompiledProjection
///

#[derive(Clone, Debug)]
pub struct CompiledProjection {
    entity: &'static EntityModel,
    fields: Vec<&'static FieldModel>,
    relations: Vec<(&'static RelationModel, Self)>,
}

impl CompiledProjection {
    pub fn compile(
        registry: &SchemaRegistry,
        entity: &'static EntityModel,
        projection: &Projection,
    ) -> Result<Self, ValidateError> {
        let fields = match &projection.scalars {
            Selection::All => entity.fields.iter().collect(),
            Selection::Only(names) => {
                check_scalars(entity, names)?;
                if names.is_empty() && projection.relations.is_empty() {
                    return Err(ValidateError::InvalidProjection {
                        entity: entity.name.to_string(),
                        message: "select must keep at least one field".to_string(),
                    });
                }
                entity
                    .fields
                    .iter()
                    .filter(|field| names.iter().any(|name| name == field.name))
                    .collect()
            }
            Selection::AllExcept(names) => {
                check_scalars(entity, names)?;
                entity
                    .fields
                    .iter()
                    .filter(|field| !names.iter().any(|name| name == field.name))
                    .collect()
            }
        };

        let relations = projection
            .relations
            .iter()
            .map(|(name, nested)| {
                let relation =
                    entity
                        .relation(name)
                        .ok_or_else(|| ValidateError::UnknownRelation {
                            entity: entity.name.to_string(),
                            relation: name.clone(),
                        })?;
                let target =
                    registry
                        .get(relation.target)
                        .ok_or_else(|| ValidateError::UnknownEntity {
                            entity: relation.target.to_string(),
                        })?;

                Ok((relation, Self::compile(registry, target, nested)?))
            })
            .collect::<Result<Vec<_>, ValidateError>>()?;

        Ok(Self {
            entity,
            fields,
            relations,
        })
    }

    #[must_use]
    pub const fn entity(&self) -> &'static EntityModel {
        self.entity
    }

    /// Kept scalar field names, in model order.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|field| field.name).collect()
    }

    /// Materialize one record. Unset fields project as `null`; relations the
    /// resolver cannot supply project as empty.
    pub fn project<R, Res>(&self, record: &R, resolver: &Res) -> ProjectedRecord
    where
        R: Record,
        Res: RelationResolver<R> + ?Sized,
    {
        let fields = self
            .fields
            .iter()
            .map(|field| {
                let value = match record.field(field.name) {
                    FieldPresence::Present(value) => value.into_owned(),
                    FieldPresence::Missing => Value::Null,
                };

                (field.name.to_string(), value)
            })
            .collect();

        let relations = self
            .relations
            .iter()
            .map(|(relation, nested)| {
                let related = self.resolve(record, resolver, relation);
                let projected = if relation.is_many() {
                    ProjectedRelation::Many(
                        related
                            .iter()
                            .map(|r| nested.project(r, resolver))
                            .collect(),
                    )
                } else {
                    ProjectedRelation::One(
                        related
                            .first()
                            .map(|r| Box::new(nested.project(r, resolver))),
                    )
                };

                (relation.name.to_string(), projected)
            })
            .collect();

        ProjectedRecord { fields, relations }
    }

    fn resolve<R, Res>(&self, record: &R, resolver: &Res, relation: &'static RelationModel) -> Vec<R>
    where
        R: Record,
        Res: RelationResolver<R> + ?Sized,
    {
        resolver
            .resolve(self.entity, record, relation)
            .unwrap_or_else(|err| {
                tracing::warn!(
                    entity = self.entity.name,
                    relation = relation.name,
                    error = %err,
                    "relation unresolved; projecting as empty"
                );
                sink::record(MetricsEvent::RelationUnresolved {
                    entity: self.entity.name,
                    relation: relation.name,
                });

                Vec::new()
            })
    }
}

fn check_scalars(entity: &EntityModel, names: &[String]) -> Result<(), ValidateError> {
    match names.iter().find(|name| entity.field(name).is_none()) {
        Some(name) => Err(ValidateError::unknown_field(entity.name, name)),
        None => Ok(()),
    }
}

///
/// ProjectedRecord
///
/// One materialized result record. Serializes as a single map with scalar
/// fields and relations side by side.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProjectedRecord {
    pub fields: BTreeMap<String, Value>,
    pub relations: BTreeMap<String, ProjectedRelation>,
}

impl ProjectedRecord {
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&ProjectedRelation> {
        self.relations.get(name)
    }
}

impl Serialize for ProjectedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + self.relations.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        for (name, relation) in &self.relations {
            map.serialize_entry(name, relation)?;
        }

        map.end()
    }
}

///
/// ProjectedRelation
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProjectedRelation {
    One(Option<Box<ProjectedRecord>>),
    Many(Vec<ProjectedRecord>),
}

impl ProjectedRelation {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::One(record) => usize::from(record.is_some()),
            Self::Many(records) => records.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
