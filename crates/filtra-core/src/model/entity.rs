use crate::model::{field::FieldModel, relation::RelationModel};

///
/// EntityModel
/// Minimal, generator-produced runtime model for one entity.
///

#[derive(Debug)]
pub struct EntityModel {
    /// Stable external name used for registry lookup and diagnostics.
    pub name: &'static str,
    /// Primary key field name (must be an entry in `fields`).
    pub primary_key: &'static str,
    /// Ordered field list.
    pub fields: &'static [FieldModel],
    /// Relations to other entities.
    pub relations: &'static [RelationModel],
}

impl EntityModel {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldModel> {
        self.fields.iter().find(|field| field.name == name)
    }

    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&'static RelationModel> {
        self.relations.iter().find(|relation| relation.name == name)
    }

    /// Primary key or explicitly unique field.
    #[must_use]
    pub fn is_unique_field(&self, name: &str) -> bool {
        name == self.primary_key || self.field(name).is_some_and(|field| field.unique)
    }
}
