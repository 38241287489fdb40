use crate::{
    config::FilterConfig,
    db::{
        filter::Filter,
        order::OrderSpec,
        predicate::{Predicate, ValidateError, compile},
        query::{
            QuerySource,
            args::{AggregateArgs, GroupByArgs},
            find::{from_json, parse_filter, parse_order, parse_window},
            select::{Selector, filter_records},
        },
        window::{Window, window_range},
    },
    error::Error,
    model::{EntityModel, FieldModel, SchemaRegistry},
    obs::sink::{self, MetricsEvent, QueryKind},
    traits::Record,
    value::{Value, canonical_cmp},
};
use serde::Serialize;
use serde_json::Value as Json;
use std::collections::BTreeMap;

///
/// AggregateSelection
///
/// Requested aggregates: `_count` (all records and/or non-null values per
/// field), `_min`, `_max`, `_sum` and `_avg` per field.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AggregateSelection {
    pub count_all: bool,
    pub count: Vec<String>,
    pub min: Vec<String>,
    pub max: Vec<String>,
    pub sum: Vec<String>,
    pub avg: Vec<String>,
}

impl AggregateSelection {
    #[must_use]
    pub fn count_all(mut self) -> Self {
        self.count_all = true;
        self
    }

    #[must_use]
    pub fn count(mut self, field: impl Into<String>) -> Self {
        self.count.push(field.into());
        self
    }

    #[must_use]
    pub fn min(mut self, field: impl Into<String>) -> Self {
        self.min.push(field.into());
        self
    }

    #[must_use]
    pub fn max(mut self, field: impl Into<String>) -> Self {
        self.max.push(field.into());
        self
    }

    #[must_use]
    pub fn sum(mut self, field: impl Into<String>) -> Self {
        self.sum.push(field.into());
        self
    }

    #[must_use]
    pub fn avg(mut self, field: impl Into<String>) -> Self {
        self.avg.push(field.into());
        self
    }

    fn from_args(
        count: Option<&Json>,
        min: Option<&Json>,
        max: Option<&Json>,
        sum: Option<&Json>,
        avg: Option<&Json>,
    ) -> Result<Self, ValidateError> {
        let mut selection = Self::default();

        match count {
            None | Some(Json::Bool(false)) => {}
            Some(Json::Bool(true)) => selection.count_all = true,
            Some(json) => {
                for field in field_flags("_count", json)? {
                    if field == "_all" {
                        selection.count_all = true;
                    } else {
                        selection.count.push(field);
                    }
                }
            }
        }
        selection.min = min.map(|j| field_flags("_min", j)).transpose()?.unwrap_or_default();
        selection.max = max.map(|j| field_flags("_max", j)).transpose()?.unwrap_or_default();
        selection.sum = sum.map(|j| field_flags("_sum", j)).transpose()?.unwrap_or_default();
        selection.avg = avg.map(|j| field_flags("_avg", j)).transpose()?.unwrap_or_default();

        Ok(selection)
    }

    fn compile(&self, entity: &'static EntityModel) -> Result<Aggregates, ValidateError> {
        let resolve = |names: &[String], op: &str, check: fn(&FieldModel) -> bool| {
            names
                .iter()
                .map(|name| {
                    let field = entity
                        .field(name)
                        .ok_or_else(|| ValidateError::unknown_field(entity.name, name))?;
                    if check(field) {
                        Ok(field)
                    } else {
                        Err(ValidateError::invalid_operator(field.name, op, field.kind))
                    }
                })
                .collect::<Result<Vec<_>, _>>()
        };

        Ok(Aggregates {
            count_all: self.count_all,
            count: resolve(&self.count, "_count", |_| true)?,
            min: resolve(&self.min, "_min", |f| f.kind.is_orderable())?,
            max: resolve(&self.max, "_max", |f| f.kind.is_orderable())?,
            sum: resolve(&self.sum, "_sum", |f| f.kind.is_numeric())?,
            avg: resolve(&self.avg, "_avg", |f| f.kind.is_numeric())?,
        })
    }
}

// `{ field: true, .. }` to the list of fields flagged true.
fn field_flags(arg: &str, json: &Json) -> Result<Vec<String>, ValidateError> {
    let Json::Object(map) = json else {
        return Err(ValidateError::malformed(format!("{arg} must be an object")));
    };

    let mut fields = Vec::new();
    for (field, flag) in map {
        match flag {
            Json::Bool(true) => fields.push(field.clone()),
            Json::Bool(false) => {}
            _ => {
                return Err(ValidateError::malformed(format!(
                    "{arg}.{field} must be true or false"
                )));
            }
        }
    }

    Ok(fields)
}

///
/// Aggregates
/// Resolved aggregate fields.
///

#[derive(Clone, Debug)]
struct Aggregates {
    count_all: bool,
    count: Vec<&'static FieldModel>,
    min: Vec<&'static FieldModel>,
    max: Vec<&'static FieldModel>,
    sum: Vec<&'static FieldModel>,
    avg: Vec<&'static FieldModel>,
}

impl Aggregates {
    fn compute<R: Record>(&self, records: &[R]) -> AggregateValues {
        let present = |field: &FieldModel| {
            records
                .iter()
                .filter_map(|r| r.field(field.name).non_null().cloned())
                .collect::<Vec<_>>()
        };
        let per_field = |fields: &[&'static FieldModel], f: fn(Vec<Value>) -> Value| {
            (!fields.is_empty()).then(|| {
                fields
                    .iter()
                    .map(|field| (field.name.to_string(), f(present(*field))))
                    .collect::<BTreeMap<_, _>>()
            })
        };

        let count = (self.count_all || !self.count.is_empty()).then(|| CountValues {
            all: self.count_all.then(|| len_u64(records.len())),
            fields: self
                .count
                .iter()
                .map(|field| (field.name.to_string(), len_u64(present(*field).len())))
                .collect(),
        });

        AggregateValues {
            count,
            min: per_field(&self.min, |values| extreme(values, std::cmp::Ordering::Less)),
            max: per_field(&self.max, |values| extreme(values, std::cmp::Ordering::Greater)),
            sum: per_field(&self.sum, sum),
            avg: per_field(&self.avg, avg),
        }
    }
}

fn len_u64(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

// Smallest (`Less`) or largest (`Greater`) value; null when there are none.
fn extreme(values: Vec<Value>, keep: std::cmp::Ordering) -> Value {
    values
        .into_iter()
        .reduce(|best, v| if canonical_cmp(&v, &best) == keep { v } else { best })
        .unwrap_or(Value::Null)
}

// Integer sums stay integers until they overflow.
fn sum(values: Vec<Value>) -> Value {
    if values.is_empty() {
        return Value::Null;
    }

    let ints = values
        .iter()
        .map(|v| match v {
            Value::Int(n) => Some(*n),
            _ => None,
        })
        .try_fold(0_i64, |acc, n| n.and_then(|n| acc.checked_add(n)));

    match ints {
        Some(total) => Value::Int(total),
        None => Value::float(values.iter().filter_map(Value::as_f64).sum()).unwrap_or(Value::Null),
    }
}

#[allow(clippy::cast_precision_loss)]
fn avg(values: Vec<Value>) -> Value {
    if values.is_empty() {
        return Value::Null;
    }

    let total: f64 = values.iter().filter_map(Value::as_f64).sum();

    Value::float(total / values.len() as f64).unwrap_or(Value::Null)
}

///
/// AggregateValues
/// Serializes with the `_count` / `_min` / ... keys of the argument document.
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct AggregateValues {
    #[serde(rename = "_count", skip_serializing_if = "Option::is_none")]
    pub count: Option<CountValues>,
    #[serde(rename = "_min", skip_serializing_if = "Option::is_none")]
    pub min: Option<BTreeMap<String, Value>>,
    #[serde(rename = "_max", skip_serializing_if = "Option::is_none")]
    pub max: Option<BTreeMap<String, Value>>,
    #[serde(rename = "_sum", skip_serializing_if = "Option::is_none")]
    pub sum: Option<BTreeMap<String, Value>>,
    #[serde(rename = "_avg", skip_serializing_if = "Option::is_none")]
    pub avg: Option<BTreeMap<String, Value>>,
}

///
/// CountValues
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct CountValues {
    #[serde(rename = "_all", skip_serializing_if = "Option::is_none")]
    pub all: Option<u64>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, u64>,
}

///
/// Aggregate
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Aggregate {
    pub filter: Filter,
    pub order: OrderSpec,
    pub window: Window,
    pub selection: AggregateSelection,
}

impl Aggregate {
    #[must_use]
    pub fn new(selection: AggregateSelection) -> Self {
        Self {
            selection,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn from_args(
        registry: &SchemaRegistry,
        model: &'static EntityModel,
        args: AggregateArgs,
    ) -> Result<Self, ValidateError> {
        Ok(Self {
            filter: parse_filter(registry, model, args.filter.as_ref())?,
            order: parse_order(args.order_by.as_ref())?,
            window: parse_window(args.cursor.as_ref(), args.skip, args.take)?,
            selection: AggregateSelection::from_args(
                args.count.as_ref(),
                args.min.as_ref(),
                args.max.as_ref(),
                args.sum.as_ref(),
                args.avg.as_ref(),
            )?,
        })
    }

    pub fn from_json(
        registry: &SchemaRegistry,
        model: &'static EntityModel,
        json: &Json,
    ) -> Result<Self, ValidateError> {
        Self::from_args(registry, model, from_json("aggregate", json)?)
    }
}

///
/// AggregateSpec
///

#[derive(Clone, Debug)]
pub struct AggregateSpec {
    selector: Selector,
    aggregates: Aggregates,
}

impl AggregateSpec {
    pub fn compile(
        registry: &SchemaRegistry,
        entity: &'static EntityModel,
        query: &Aggregate,
        config: &FilterConfig,
    ) -> Result<Self, ValidateError> {
        Ok(Self {
            selector: Selector::compile(
                registry,
                entity,
                &query.filter,
                &query.order,
                &[],
                &query.window,
                config,
            )?,
            aggregates: query.selection.compile(entity)?,
        })
    }

    pub fn execute<S: QuerySource>(&self, source: &S) -> Result<AggregateValues, Error> {
        let entity = self.selector.entity().name;
        sink::record(MetricsEvent::QueryExecuted {
            entity,
            kind: QueryKind::Aggregate,
        });
        tracing::debug!(entity, "executing aggregate");

        let records = self.selector.select(source)?;

        Ok(self.aggregates.compute(&records))
    }
}

///
/// GroupBy
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GroupBy {
    pub by: Vec<String>,
    pub filter: Filter,
    pub skip: u64,
    pub take: Option<i64>,
    pub selection: AggregateSelection,
}

impl GroupBy {
    #[must_use]
    pub fn by<I, S>(fields: I, selection: AggregateSelection) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            by: fields.into_iter().map(Into::into).collect(),
            selection,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn from_args(
        registry: &SchemaRegistry,
        model: &'static EntityModel,
        args: GroupByArgs,
    ) -> Result<Self, ValidateError> {
        Ok(Self {
            by: args.by.into_vec(),
            filter: parse_filter(registry, model, args.filter.as_ref())?,
            skip: args.skip.unwrap_or(0),
            take: args.take,
            selection: AggregateSelection::from_args(
                args.count.as_ref(),
                args.min.as_ref(),
                args.max.as_ref(),
                args.sum.as_ref(),
                args.avg.as_ref(),
            )?,
        })
    }

    pub fn from_json(
        registry: &SchemaRegistry,
        model: &'static EntityModel,
        json: &Json,
    ) -> Result<Self, ValidateError> {
        Self::from_args(registry, model, from_json("groupBy", json)?)
    }
}

///
/// GroupBySpec
///
/// Groups come out in the canonical order of their key tuples.
///

#[derive(Clone, Debug)]
pub struct GroupBySpec {
    predicate: Predicate,
    by: Vec<&'static FieldModel>,
    skip: usize,
    take: Option<i64>,
    aggregates: Aggregates,
}

impl GroupBySpec {
    pub fn compile(
        registry: &SchemaRegistry,
        entity: &'static EntityModel,
        query: &GroupBy,
        config: &FilterConfig,
    ) -> Result<Self, ValidateError> {
        if query.by.is_empty() {
            return Err(ValidateError::malformed("groupBy needs at least one field"));
        }
        if let Some(take) = query.take
            && take.unsigned_abs() > config.max_take
        {
            return Err(ValidateError::TakeTooLarge {
                take,
                max: config.max_take,
            });
        }

        let by = query
            .by
            .iter()
            .map(|name| {
                let field = entity
                    .field(name)
                    .ok_or_else(|| ValidateError::unknown_field(entity.name, name))?;
                if field.kind.is_list() {
                    return Err(ValidateError::invalid_operator(field.name, "by", field.kind));
                }

                Ok(field)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            predicate: compile(registry, entity, &query.filter, config)?,
            by,
            skip: usize::try_from(query.skip).unwrap_or(usize::MAX),
            take: query.take,
            aggregates: query.selection.compile(entity)?,
        })
    }

    pub fn execute<S: QuerySource>(&self, source: &S) -> Result<Vec<GroupRow>, Error> {
        let entity = self.predicate.entity().name;
        sink::record(MetricsEvent::QueryExecuted {
            entity,
            kind: QueryKind::GroupBy,
        });
        tracing::debug!(entity, "executing groupBy");

        let mut groups: BTreeMap<Vec<Value>, Vec<S::Record>> = BTreeMap::new();
        for record in filter_records(&self.predicate, source)? {
            let key = self
                .by
                .iter()
                .map(|field| record.field(field.name).into_value())
                .collect::<Vec<_>>();
            groups.entry(key).or_default().push(record);
        }

        let rows = groups
            .into_iter()
            .map(|(key, records)| GroupRow {
                key: self
                    .by
                    .iter()
                    .map(|field| field.name.to_string())
                    .zip(key)
                    .collect(),
                values: self.aggregates.compute(&records),
            })
            .collect::<Vec<_>>();
        let range = window_range(rows.len(), None, self.skip, self.take);

        Ok(rows[range].to_vec())
    }
}

///
/// GroupRow
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct GroupRow {
    #[serde(flatten)]
    pub key: BTreeMap<String, Value>,
    #[serde(flatten)]
    pub values: AggregateValues,
}
