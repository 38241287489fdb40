//! Lowering of JSON `WhereInput` documents into the filter AST.
//!
//! Object keys are implicitly AND-ed. `AND`/`NOT` accept an object or an
//! array, `OR` requires an array. A bare value on a field is shorthand for
//! `equals`. Only shapes are checked here; types are checked at compile time.

use crate::{
    db::{
        filter::{Condition, FieldFilter, Filter, RelationFilter, RelationOp},
        predicate::{ValidateError, literal::json_to_value},
    },
    model::{EntityModel, FieldModel, RelationModel, SchemaRegistry},
    value::TextMode,
};
use serde_json::{Map, Value as Json};

/// Parse one `WhereInput` document for `model`.
pub fn parse_where(
    registry: &SchemaRegistry,
    model: &'static EntityModel,
    json: &Json,
) -> Result<Filter, ValidateError> {
    let Json::Object(map) = json else {
        return Err(ValidateError::malformed(format!(
            "where input for '{}' must be an object",
            model.name
        )));
    };

    parse_object(registry, model, map)
}

fn parse_object(
    registry: &SchemaRegistry,
    model: &'static EntityModel,
    map: &Map<String, Json>,
) -> Result<Filter, ValidateError> {
    let mut children = Vec::with_capacity(map.len());

    for (key, value) in map {
        let child = match key.as_str() {
            "AND" => Filter::And(parse_group(registry, model, key, value, true)?),
            "OR" => Filter::Or(parse_group(registry, model, key, value, false)?),
            "NOT" => Filter::Not(parse_group(registry, model, key, value, true)?),
            _ => {
                if let Some(relation) = model.relation(key) {
                    parse_relation(registry, relation, value)?
                } else if let Some(field) = model.field(key) {
                    Filter::Field(parse_field(field, value)?)
                } else {
                    return Err(ValidateError::unknown_field(model.name, key));
                }
            }
        };
        children.push(child);
    }

    if children.len() == 1 {
        Ok(children.remove(0))
    } else {
        Ok(Filter::And(children))
    }
}

// Children of a boolean combinator; `allow_object` accepts the single-object form.
fn parse_group(
    registry: &SchemaRegistry,
    model: &'static EntityModel,
    key: &str,
    value: &Json,
    allow_object: bool,
) -> Result<Vec<Filter>, ValidateError> {
    match value {
        Json::Array(items) => items
            .iter()
            .map(|item| match item {
                Json::Object(map) => parse_object(registry, model, map),
                _ => Err(ValidateError::malformed(format!(
                    "{key} entries must be objects"
                ))),
            })
            .collect(),
        Json::Object(map) if allow_object => Ok(vec![parse_object(registry, model, map)?]),
        _ => Err(ValidateError::malformed(if allow_object {
            format!("{key} expects an object or an array of objects")
        } else {
            format!("{key} expects an array of objects")
        })),
    }
}

fn parse_relation(
    registry: &SchemaRegistry,
    relation: &'static RelationModel,
    value: &Json,
) -> Result<Filter, ValidateError> {
    let target = registry
        .get(relation.target)
        .ok_or_else(|| ValidateError::UnknownEntity {
            entity: relation.target.to_string(),
        })?;
    let Json::Object(ops) = value else {
        return Err(ValidateError::malformed(format!(
            "relation '{}' expects an object of relation operators",
            relation.name
        )));
    };

    let nested = |op: &str, value: &Json| -> Result<Box<Filter>, ValidateError> {
        match value {
            Json::Object(map) => Ok(Box::new(parse_object(registry, target, map)?)),
            _ => Err(ValidateError::malformed(format!(
                "'{}.{op}' expects an object",
                relation.name
            ))),
        }
    };
    let optional = |op: &str, value: &Json| -> Result<Option<Box<Filter>>, ValidateError> {
        match value {
            Json::Null => Ok(None),
            other => nested(op, other).map(Some),
        }
    };

    let mut filters = Vec::with_capacity(ops.len());
    for (name, value) in ops {
        let name = name.as_str();
        let op = match name {
            "some" => RelationOp::Some(nested(name, value)?),
            "every" => RelationOp::Every(nested(name, value)?),
            "none" => RelationOp::None(nested(name, value)?),
            "is" => RelationOp::Is(optional(name, value)?),
            "isNot" => RelationOp::IsNot(optional(name, value)?),
            _ => {
                return Err(ValidateError::UnknownOperator {
                    field: relation.name.to_string(),
                    op: name.to_string(),
                });
            }
        };
        filters.push(Filter::Relation(RelationFilter {
            relation: relation.name.to_string(),
            op,
        }));
    }

    if filters.len() == 1 {
        Ok(filters.remove(0))
    } else {
        Ok(Filter::And(filters))
    }
}

fn parse_field(field: &FieldModel, value: &Json) -> Result<FieldFilter, ValidateError> {
    let mut filter = FieldFilter::new(field.name);

    let Json::Object(ops) = value else {
        filter
            .conditions
            .push(Condition::Equals(json_to_value(field.name, value)?));
        return Ok(filter);
    };

    let (conditions, mode) = parse_conditions(field.name, ops, true)?;
    filter.conditions = conditions;
    if let Some(mode) = mode {
        filter.mode = mode;
    }

    Ok(filter)
}

// Operator object of one field. Returns the conditions plus any `mode` key.
// `mode` is only accepted at the top level, where it governs every condition.
fn parse_conditions(
    field: &str,
    ops: &Map<String, Json>,
    allow_mode: bool,
) -> Result<(Vec<Condition>, Option<TextMode>), ValidateError> {
    let mut conditions = Vec::with_capacity(ops.len());
    let mut mode = None;

    for (op, value) in ops {
        let condition = match op.as_str() {
            "mode" if allow_mode => {
                mode = Some(parse_mode(field, value)?);
                continue;
            }
            "mode" => {
                return Err(ValidateError::malformed(format!(
                    "'{field}.not' cannot set mode; set it next to the other operators"
                )));
            }
            "equals" => Condition::Equals(json_to_value(field, value)?),
            "not" => match value {
                Json::Object(nested) => Condition::Not(parse_conditions(field, nested, false)?.0),
                other => Condition::Not(vec![Condition::Equals(json_to_value(field, other)?)]),
            },
            "in" => Condition::In(parse_list(field, value)?),
            "notIn" => Condition::NotIn(parse_list(field, value)?),
            "lt" => Condition::Lt(json_to_value(field, value)?),
            "lte" => Condition::Lte(json_to_value(field, value)?),
            "gt" => Condition::Gt(json_to_value(field, value)?),
            "gte" => Condition::Gte(json_to_value(field, value)?),
            "contains" => Condition::Contains(parse_text(field, op, value)?),
            "startsWith" => Condition::StartsWith(parse_text(field, op, value)?),
            "endsWith" => Condition::EndsWith(parse_text(field, op, value)?),
            "isSet" => Condition::IsSet(parse_bool(field, op, value)?),
            "isEmpty" => Condition::IsEmpty(parse_bool(field, op, value)?),
            "has" => Condition::Has(json_to_value(field, value)?),
            "hasEvery" => Condition::HasEvery(parse_list(field, value)?),
            "hasSome" => Condition::HasSome(parse_list(field, value)?),
            _ => {
                return Err(ValidateError::UnknownOperator {
                    field: field.to_string(),
                    op: op.clone(),
                });
            }
        };
        conditions.push(condition);
    }

    Ok((conditions, mode))
}

fn parse_mode(field: &str, value: &Json) -> Result<TextMode, ValidateError> {
    value
        .as_str()
        .and_then(TextMode::from_document)
        .ok_or_else(|| ValidateError::InvalidMode {
            field: field.to_string(),
            mode: value.to_string(),
        })
}

// A single scalar is accepted where a list is expected.
fn parse_list(field: &str, value: &Json) -> Result<Vec<crate::value::Value>, ValidateError> {
    match value {
        Json::Array(items) => items.iter().map(|item| json_to_value(field, item)).collect(),
        other => Ok(vec![json_to_value(field, other)?]),
    }
}

fn parse_text(field: &str, op: &str, value: &Json) -> Result<String, ValidateError> {
    value.as_str().map(str::to_string).ok_or_else(|| {
        ValidateError::invalid_literal(field, &format!("{op} expects a string"))
    })
}

fn parse_bool(field: &str, op: &str, value: &Json) -> Result<bool, ValidateError> {
    value.as_bool().ok_or_else(|| {
        ValidateError::invalid_literal(field, &format!("{op} expects a boolean"))
    })
}
