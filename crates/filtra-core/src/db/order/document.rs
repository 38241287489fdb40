//! Lowering of JSON `orderBy` documents.
//!
//! Accepts one object or an array of objects. Each object names exactly one
//! field, mapped to `"asc"`, `"desc"` or `{ "sort": .., "nulls": .. }`.
//! Field names are checked when the spec is compiled.

use crate::db::{
    order::{NullsOrder, OrderDirection, OrderField, OrderSpec},
    predicate::ValidateError,
};
use serde_json::{Map, Value as Json};

/// Parse an `orderBy` document into an `OrderSpec`.
pub fn parse_order_by(json: &Json) -> Result<OrderSpec, ValidateError> {
    match json {
        Json::Object(map) => Ok(OrderSpec {
            fields: vec![parse_entry(map)?],
        }),
        Json::Array(items) => items
            .iter()
            .map(|item| match item {
                Json::Object(map) => parse_entry(map),
                _ => Err(ValidateError::malformed("orderBy entries must be objects")),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(|fields| OrderSpec { fields }),
        _ => Err(ValidateError::malformed(
            "orderBy must be an object or an array of objects",
        )),
    }
}

fn parse_entry(map: &Map<String, Json>) -> Result<OrderField, ValidateError> {
    let mut entries = map.iter();
    let (Some((field, value)), None) = (entries.next(), entries.next()) else {
        return Err(ValidateError::malformed(
            "each orderBy object must name exactly one field",
        ));
    };

    match value {
        Json::String(direction) => Ok(OrderField {
            field: field.clone(),
            direction: parse_direction(field, direction)?,
            nulls: None,
        }),
        Json::Object(options) => parse_options(field, options),
        _ => Err(ValidateError::malformed(format!(
            "orderBy value for '{field}' must be \"asc\", \"desc\" or an object"
        ))),
    }
}

fn parse_options(field: &str, options: &Map<String, Json>) -> Result<OrderField, ValidateError> {
    let mut direction = None;
    let mut nulls = None;

    for (key, value) in options {
        let text = value.as_str().ok_or_else(|| {
            ValidateError::malformed(format!("orderBy '{field}.{key}' must be a string"))
        })?;

        match key.as_str() {
            "sort" => direction = Some(parse_direction(field, text)?),
            "nulls" => {
                nulls = Some(match text {
                    "first" => NullsOrder::First,
                    "last" => NullsOrder::Last,
                    _ => {
                        return Err(ValidateError::malformed(format!(
                            "orderBy '{field}.nulls' must be \"first\" or \"last\""
                        )));
                    }
                });
            }
            _ => {
                return Err(ValidateError::UnknownOperator {
                    field: field.to_string(),
                    op: key.clone(),
                });
            }
        }
    }

    let direction = direction.ok_or_else(|| {
        ValidateError::malformed(format!("orderBy '{field}' is missing 'sort'"))
    })?;

    Ok(OrderField {
        field: field.to_string(),
        direction,
        nulls,
    })
}

fn parse_direction(field: &str, text: &str) -> Result<OrderDirection, ValidateError> {
    match text {
        "asc" => Ok(OrderDirection::Asc),
        "desc" => Ok(OrderDirection::Desc),
        _ => Err(ValidateError::malformed(format!(
            "orderBy direction for '{field}' must be \"asc\" or \"desc\""
        ))),
    }
}
