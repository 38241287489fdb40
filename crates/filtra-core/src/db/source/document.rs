use crate::{
    db::predicate::literal::{json_to_value, lower_literal},
    db::predicate::ValidateError,
    model::EntityModel,
    traits::{FieldPresence, Record},
    value::Value,
};
use derive_more::{Deref, From, IntoIterator};
use serde::Serialize;
use std::{borrow::Cow, collections::BTreeMap};

///
/// Document
///
/// Schemaless record: field name to value. Absent keys are unset fields.
///

#[derive(Clone, Debug, Default, Deref, Eq, From, IntoIterator, PartialEq, Serialize)]
#[into_iterator(owned, ref)]
pub struct Document(BTreeMap<String, Value>);

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Build a typed document from a JSON object using the entity's declared
    /// field kinds. Unknown keys are rejected.
    pub fn from_json(model: &EntityModel, json: &serde_json::Value) -> Result<Self, ValidateError> {
        let serde_json::Value::Object(map) = json else {
            return Err(ValidateError::malformed(format!(
                "{} document must be a JSON object",
                model.name
            )));
        };

        let mut doc = Self::new();
        for (key, raw) in map {
            let field = model
                .field(key)
                .ok_or_else(|| ValidateError::unknown_field(model.name, key))?;
            let value = json_to_value(field.name, raw)?;
            let value = if value.is_null() {
                if !field.nullable {
                    return Err(ValidateError::NotNullable {
                        field: field.name.to_string(),
                    });
                }
                value
            } else {
                lower_literal(field.name, &field.kind, value)?
            };
            doc.insert(key.clone(), value);
        }

        Ok(doc)
    }
}

impl Record for Document {
    fn field(&self, name: &str) -> FieldPresence<'_> {
        match self.0.get(name) {
            Some(value) => FieldPresence::Present(Cow::Borrowed(value)),
            None => FieldPresence::Missing,
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

///
/// TESTS
///
