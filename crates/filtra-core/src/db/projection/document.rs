//! Lowering of JSON `select` / `include` / `omit` arguments.
//!
//! `select` maps fields and relations to `true` (or a nested argument
//! object for relations). `include` maps relations only. `omit` maps
//! scalar fields to `true`. `select` cannot be combined with either.

use crate::{
    db::{
        predicate::ValidateError,
        projection::{Projection, Selection},
    },
    model::{EntityModel, SchemaRegistry},
};
use serde_json::{Map, Value as Json};

/// Build a projection from the optional `select`, `include` and `omit`
/// arguments of one query.
pub fn parse_projection(
    registry: &SchemaRegistry,
    model: &'static EntityModel,
    select: Option<&Json>,
    include: Option<&Json>,
    omit: Option<&Json>,
) -> Result<Projection, ValidateError> {
    let invalid = |message: &str| ValidateError::InvalidProjection {
        entity: model.name.to_string(),
        message: message.to_string(),
    };

    match (select, include, omit) {
        (Some(_), _, Some(_)) => Err(invalid("select cannot be combined with omit")),
        (Some(_), Some(_), _) => Err(invalid("select cannot be combined with include")),
        (Some(select), None, None) => parse_select(registry, model, select),
        (None, include, omit) => {
            let mut projection = match omit {
                Some(omit) => Projection {
                    scalars: Selection::AllExcept(parse_omit(model, omit)?),
                    ..Projection::default()
                },
                None => Projection::all(),
            };
            if let Some(include) = include {
                let map = expect_object(model, "include", include)?;
                for (name, value) in map {
                    if model.relation(name).is_none() {
                        return Err(ValidateError::UnknownRelation {
                            entity: model.name.to_string(),
                            relation: name.clone(),
                        });
                    }
                    if let Some(nested) = parse_nested(registry, model, name, value)? {
                        projection.relations.insert(name.clone(), nested);
                    }
                }
            }

            Ok(projection)
        }
    }
}

fn parse_select(
    registry: &SchemaRegistry,
    model: &'static EntityModel,
    select: &Json,
) -> Result<Projection, ValidateError> {
    let map = expect_object(model, "select", select)?;
    let mut fields = Vec::new();
    let mut projection = Projection::default();

    for (name, value) in map {
        if model.relation(name).is_some() {
            if let Some(nested) = parse_nested(registry, model, name, value)? {
                projection.relations.insert(name.clone(), nested);
            }
        } else if model.field(name).is_some() {
            if expect_bool(model, name, value)? {
                fields.push(name.clone());
            }
        } else {
            return Err(ValidateError::unknown_field(model.name, name));
        }
    }
    projection.scalars = Selection::Only(fields);

    Ok(projection)
}

fn parse_omit(model: &EntityModel, omit: &Json) -> Result<Vec<String>, ValidateError> {
    let map = expect_object(model, "omit", omit)?;
    let mut omitted = Vec::new();

    for (name, value) in map {
        if model.field(name).is_none() {
            return Err(ValidateError::unknown_field(model.name, name));
        }
        if expect_bool(model, name, value)? {
            omitted.push(name.clone());
        }
    }

    Ok(omitted)
}

// `true`, `false` or a nested `{select|include|omit}` object for one relation.
fn parse_nested(
    registry: &SchemaRegistry,
    model: &EntityModel,
    relation: &str,
    value: &Json,
) -> Result<Option<Projection>, ValidateError> {
    let target = model
        .relation(relation)
        .and_then(|rel| registry.get(rel.target))
        .ok_or_else(|| ValidateError::UnknownRelation {
            entity: model.name.to_string(),
            relation: relation.to_string(),
        })?;

    match value {
        Json::Bool(false) => Ok(None),
        Json::Bool(true) => Ok(Some(Projection::all())),
        Json::Object(args) => {
            if let Some(key) = args
                .keys()
                .find(|key| !matches!(key.as_str(), "select" | "include" | "omit"))
            {
                return Err(ValidateError::malformed(format!(
                    "unsupported argument '{key}' on relation '{relation}'"
                )));
            }

            parse_projection(
                registry,
                target,
                args.get("select"),
                args.get("include"),
                args.get("omit"),
            )
            .map(Some)
        }
        _ => Err(ValidateError::malformed(format!(
            "relation '{relation}' must be true, false or an object"
        ))),
    }
}

fn expect_object<'a>(
    model: &EntityModel,
    arg: &str,
    json: &'a Json,
) -> Result<&'a Map<String, Json>, ValidateError> {
    json.as_object().ok_or_else(|| ValidateError::InvalidProjection {
        entity: model.name.to_string(),
        message: format!("{arg} must be an object"),
    })
}

fn expect_bool(model: &EntityModel, field: &str, json: &Json) -> Result<bool, ValidateError> {
    json.as_bool().ok_or_else(|| ValidateError::InvalidProjection {
        entity: model.name.to_string(),
        message: format!("'{field}' must be true or false"),
    })
}
