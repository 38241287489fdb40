//! Literal conversion: JSON to `Value`, then schema-directed lowering of a
//! `Value` into the representation a field kind declares.

use crate::{
    db::predicate::ValidateError,
    model::FieldKind,
    types::{Date, Timestamp, Ulid},
    value::Value,
};
use serde_json::Value as Json;

/// Shape-only conversion; strings stay `Text` until lowered.
pub(crate) fn json_to_value(field: &str, json: &Json) -> Result<Value, ValidateError> {
    match json {
        Json::Null => Ok(Value::Null),
        Json::Bool(v) => Ok(Value::Bool(*v)),
        Json::Number(n) => {
            if let Some(v) = n.as_i64() {
                Ok(Value::Int(v))
            } else {
                n.as_f64().and_then(Value::float).ok_or_else(|| {
                    ValidateError::invalid_literal(field, &format!("number {n} is out of range"))
                })
            }
        }
        Json::String(s) => Ok(Value::Text(s.clone())),
        Json::Array(items) => items
            .iter()
            .map(|item| json_to_value(field, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Json::Object(_) => Err(ValidateError::invalid_literal(
            field,
            "objects are not valid literals",
        )),
    }
}

/// Lower a non-null literal into the representation of `kind`.
///
/// Text is parsed into dates, timestamps, ids and enum variants; integers
/// widen to floats. Anything else that does not fit is rejected.
pub(crate) fn lower_literal(
    field: &str,
    kind: &FieldKind,
    value: Value,
) -> Result<Value, ValidateError> {
    let lowered = match (kind, value) {
        (_, Value::Null) => {
            return Err(ValidateError::invalid_literal(
                field,
                "null is only valid with equals, not or isSet",
            ));
        }
        (FieldKind::Float, Value::Int(v)) => {
            #[allow(clippy::cast_precision_loss)]
            let widened = Value::float(v as f64);
            widened.ok_or_else(|| ValidateError::invalid_literal(field, "number out of range"))?
        }
        (FieldKind::Date, Value::Text(s)) => Value::Date(
            Date::parse(&s).map_err(|err| ValidateError::invalid_literal(field, &err.to_string()))?,
        ),
        (FieldKind::Timestamp, Value::Text(s)) => Value::Timestamp(
            Timestamp::parse_rfc3339(&s)
                .map_err(|err| ValidateError::invalid_literal(field, &err.to_string()))?,
        ),
        (FieldKind::Id, Value::Text(s)) => {
            Value::Id(Ulid::from_string(&s).map_err(|err| {
                ValidateError::invalid_literal(field, &format!("invalid id '{s}': {err}"))
            })?)
        }
        (FieldKind::Enum(_), Value::Text(s)) => Value::Enum(s),
        (FieldKind::List(inner), Value::List(items)) => Value::List(
            items
                .into_iter()
                .map(|item| lower_literal(field, inner, item))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        (_, other) => other,
    };

    if kind.accepts(&lowered) {
        Ok(lowered)
    } else {
        Err(ValidateError::invalid_literal(
            field,
            &format!("expected {kind}, found {} literal", lowered.family()),
        ))
    }
}

///
/// TESTS
///
