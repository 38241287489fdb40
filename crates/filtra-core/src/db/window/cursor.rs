use crate::{
    db::predicate::{
        ValidateError,
        literal::{json_to_value, lower_literal},
    },
    model::{EntityModel, FieldModel},
    traits::Record,
    value::{Value, strict_order_cmp},
};
use serde_json::Value as Json;
use std::{cmp::Ordering, collections::BTreeMap};

///
/// Cursor
///
/// Pagination anchor: values of one or more unique fields identifying a
/// single record, e.g. `{ "id": "..." }`.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Cursor {
    pub fields: BTreeMap<String, Value>,
}

impl Cursor {
    #[must_use]
    pub fn by(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::default().and(field, value)
    }

    #[must_use]
    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Shape-only parse of a cursor document; values are typed on compile.
    pub fn from_json(json: &Json) -> Result<Self, ValidateError> {
        let Json::Object(map) = json else {
            return Err(ValidateError::malformed("cursor must be an object"));
        };

        let fields = map
            .iter()
            .map(|(field, raw)| Ok((field.clone(), json_to_value(field, raw)?)))
            .collect::<Result<BTreeMap<_, _>, ValidateError>>()?;

        Ok(Self { fields })
    }

    pub(crate) fn compile(
        &self,
        entity: &'static EntityModel,
    ) -> Result<CompiledCursor, ValidateError> {
        if self.fields.is_empty() {
            return Err(ValidateError::EmptyCursor);
        }

        let keys = self
            .fields
            .iter()
            .map(|(name, value)| {
                let field = entity
                    .field(name)
                    .ok_or_else(|| ValidateError::unknown_field(entity.name, name))?;
                if !entity.is_unique_field(name) {
                    return Err(ValidateError::NotUnique {
                        entity: entity.name.to_string(),
                        field: name.clone(),
                    });
                }
                if value.is_null() {
                    return Err(ValidateError::NotNullable {
                        field: name.clone(),
                    });
                }

                Ok((field, lower_literal(field.name, &field.kind, value.clone())?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompiledCursor { keys })
    }
}

///
/// CompiledCursor
///

#[derive(Clone, Debug)]
pub struct CompiledCursor {
    keys: Vec<(&'static FieldModel, Value)>,
}

impl CompiledCursor {
    /// Whether `record` holds every cursor value.
    pub fn matches<R: Record>(&self, record: &R) -> bool {
        self.keys.iter().all(|(field, expected)| {
            record.field(field.name).non_null().is_some_and(|actual| {
                actual == expected || strict_order_cmp(actual, expected) == Some(Ordering::Equal)
            })
        })
    }
}
