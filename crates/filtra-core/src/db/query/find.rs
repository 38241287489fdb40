use crate::{
    config::FilterConfig,
    db::{
        filter::{Filter, parse_where},
        order::{Comparator, OrderSpec, parse_order_by},
        predicate::{Predicate, ValidateError, literal::json_to_value},
        projection::{CompiledProjection, ProjectedRecord, Projection, parse_projection},
        query::{
            QuerySource,
            args::{CountArgs, FindManyArgs, FindUniqueArgs},
            select::Selector,
        },
        window::{CompiledCursor, Cursor, Window},
    },
    error::Error,
    model::{EntityModel, SchemaRegistry},
    obs::sink::{self, MetricsEvent, QueryKind},
    value::Value,
};
use serde_json::Value as Json;

// Deserialize a raw argument document into its serde shape.
pub(super) fn from_json<T: serde::de::DeserializeOwned>(
    kind: &str,
    json: &Json,
) -> Result<T, ValidateError> {
    serde_json::from_value(json.clone())
        .map_err(|err| ValidateError::malformed(format!("invalid {kind} arguments: {err}")))
}

pub(super) fn parse_filter(
    registry: &SchemaRegistry,
    model: &'static EntityModel,
    json: Option<&Json>,
) -> Result<Filter, ValidateError> {
    json.map_or_else(
        || Ok(Filter::default()),
        |json| parse_where(registry, model, json),
    )
}

pub(super) fn parse_order(json: Option<&Json>) -> Result<OrderSpec, ValidateError> {
    Ok(json.map(parse_order_by).transpose()?.unwrap_or_default())
}

pub(super) fn parse_window(
    cursor: Option<&Json>,
    skip: Option<u64>,
    take: Option<i64>,
) -> Result<Window, ValidateError> {
    Ok(Window {
        cursor: cursor.map(Cursor::from_json).transpose()?,
        skip: skip.unwrap_or(0),
        take,
    })
}

///
/// FindMany
/// Typed `findMany` / `findFirst` arguments.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FindMany {
    pub filter: Filter,
    pub order: OrderSpec,
    pub window: Window,
    pub distinct: Vec<String>,
    pub projection: Projection,
}

impl FindMany {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = filter.into();
        self
    }

    #[must_use]
    pub fn order(mut self, order: OrderSpec) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn window(mut self, window: Window) -> Self {
        self.window = window;
        self
    }

    #[must_use]
    pub fn distinct<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.distinct = fields.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn from_args(
        registry: &SchemaRegistry,
        model: &'static EntityModel,
        args: FindManyArgs,
    ) -> Result<Self, ValidateError> {
        Ok(Self {
            filter: parse_filter(registry, model, args.filter.as_ref())?,
            order: parse_order(args.order_by.as_ref())?,
            window: parse_window(args.cursor.as_ref(), args.skip, args.take)?,
            distinct: args
                .distinct
                .map(super::args::OneOrMany::into_vec)
                .unwrap_or_default(),
            projection: parse_projection(
                registry,
                model,
                args.select.as_ref(),
                args.include.as_ref(),
                args.omit.as_ref(),
            )?,
        })
    }

    pub fn from_json(
        registry: &SchemaRegistry,
        model: &'static EntityModel,
        json: &Json,
    ) -> Result<Self, ValidateError> {
        Self::from_args(registry, model, from_json("findMany", json)?)
    }
}

///
/// FindManySpec
///
/// Compiled `findMany` (or `findFirst`). Inspectable without a source;
/// nothing runs until `fetch` or `execute`.
///

#[derive(Clone, Debug)]
pub struct FindManySpec {
    selector: Selector,
    projection: CompiledProjection,
    kind: QueryKind,
}

impl FindManySpec {
    pub fn compile(
        registry: &SchemaRegistry,
        entity: &'static EntityModel,
        query: &FindMany,
        config: &FilterConfig,
    ) -> Result<Self, ValidateError> {
        Ok(Self {
            selector: Selector::compile(
                registry,
                entity,
                &query.filter,
                &query.order,
                &query.distinct,
                &query.window,
                config,
            )?,
            projection: CompiledProjection::compile(registry, entity, &query.projection)?,
            kind: QueryKind::FindMany,
        })
    }

    /// `findFirst` form: `take` is forced to one record, keeping the sign
    /// of a negative `take`.
    pub fn compile_first(
        registry: &SchemaRegistry,
        entity: &'static EntityModel,
        query: &FindMany,
        config: &FilterConfig,
    ) -> Result<Self, ValidateError> {
        let mut query = query.clone();
        let backwards = query.window.take.is_some_and(|take| take < 0);
        query.window.take = Some(if backwards { -1 } else { 1 });

        let mut spec = Self::compile(registry, entity, &query, config)?;
        spec.kind = QueryKind::FindFirst;

        Ok(spec)
    }

    #[must_use]
    pub const fn entity(&self) -> &'static EntityModel {
        self.selector.entity()
    }

    #[must_use]
    pub const fn predicate(&self) -> &Predicate {
        &self.selector.predicate
    }

    #[must_use]
    pub const fn comparator(&self) -> &Comparator {
        &self.selector.comparator
    }

    #[must_use]
    pub const fn projection(&self) -> &CompiledProjection {
        &self.projection
    }

    #[must_use]
    pub fn distinct_fields(&self) -> Vec<&'static str> {
        self.selector
            .distinct
            .iter()
            .map(|field| field.name)
            .collect()
    }

    #[must_use]
    pub const fn take(&self) -> Option<i64> {
        self.selector.window.take()
    }

    /// Selected records, unprojected.
    pub fn fetch<S: QuerySource>(&self, source: &S) -> Result<Vec<S::Record>, Error> {
        let entity = self.entity().name;
        sink::record(MetricsEvent::QueryExecuted {
            entity,
            kind: self.kind,
        });
        tracing::debug!(entity, kind = ?self.kind, "executing query");

        self.selector.select(source)
    }

    pub fn execute<S: QuerySource>(&self, source: &S) -> Result<Vec<ProjectedRecord>, Error> {
        let records = self.fetch(source)?;

        Ok(records
            .iter()
            .map(|record| self.projection.project(record, source))
            .collect())
    }

    /// First selected record, if any.
    pub fn execute_first<S: QuerySource>(
        &self,
        source: &S,
    ) -> Result<Option<ProjectedRecord>, Error> {
        let records = self.fetch(source)?;

        Ok(records
            .first()
            .map(|record| self.projection.project(record, source)))
    }
}

///
/// FindUnique
/// Typed `findUnique` arguments: equality on unique fields only.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FindUnique {
    pub key: Cursor,
    pub projection: Projection,
}

impl FindUnique {
    #[must_use]
    pub fn by(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: Cursor::by(field, value),
            projection: Projection::all(),
        }
    }

    #[must_use]
    pub fn projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn from_args(
        registry: &SchemaRegistry,
        model: &'static EntityModel,
        args: FindUniqueArgs,
    ) -> Result<Self, ValidateError> {
        let Json::Object(map) = &args.filter else {
            return Err(ValidateError::malformed(
                "findUnique where must be an object",
            ));
        };

        let mut key = Cursor::default();
        for (field, raw) in map {
            let raw = match raw {
                Json::Object(ops) => match (ops.get("equals"), ops.len()) {
                    (Some(value), 1) => value,
                    _ => {
                        return Err(ValidateError::malformed(format!(
                            "findUnique where on '{field}' must be a value or {{ equals }}"
                        )));
                    }
                },
                other => other,
            };
            key.fields.insert(field.clone(), json_to_value(field, raw)?);
        }

        Ok(Self {
            key,
            projection: parse_projection(
                registry,
                model,
                args.select.as_ref(),
                args.include.as_ref(),
                args.omit.as_ref(),
            )?,
        })
    }

    pub fn from_json(
        registry: &SchemaRegistry,
        model: &'static EntityModel,
        json: &Json,
    ) -> Result<Self, ValidateError> {
        Self::from_args(registry, model, from_json("findUnique", json)?)
    }
}

///
/// FindUniqueSpec
///

#[derive(Clone, Debug)]
pub struct FindUniqueSpec {
    entity: &'static EntityModel,
    key: CompiledCursor,
    projection: CompiledProjection,
}

impl FindUniqueSpec {
    pub fn compile(
        registry: &SchemaRegistry,
        entity: &'static EntityModel,
        query: &FindUnique,
    ) -> Result<Self, ValidateError> {
        Ok(Self {
            entity,
            key: query.key.compile(entity)?,
            projection: CompiledProjection::compile(registry, entity, &query.projection)?,
        })
    }

    #[must_use]
    pub const fn entity(&self) -> &'static EntityModel {
        self.entity
    }

    pub fn execute<S: QuerySource>(&self, source: &S) -> Result<Option<ProjectedRecord>, Error> {
        sink::record(MetricsEvent::QueryExecuted {
            entity: self.entity.name,
            kind: QueryKind::FindUnique,
        });
        tracing::debug!(entity = self.entity.name, "executing findUnique");

        let records = source.scan(self.entity)?;

        Ok(records
            .iter()
            .find(|record| self.key.matches(*record))
            .map(|record| self.projection.project(record, source)))
    }
}

///
/// Count
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Count {
    pub filter: Filter,
    pub order: OrderSpec,
    pub window: Window,
}

impl Count {
    #[must_use]
    pub fn filter(filter: impl Into<Filter>) -> Self {
        Self {
            filter: filter.into(),
            ..Self::default()
        }
    }

    pub fn from_args(
        registry: &SchemaRegistry,
        model: &'static EntityModel,
        args: CountArgs,
    ) -> Result<Self, ValidateError> {
        Ok(Self {
            filter: parse_filter(registry, model, args.filter.as_ref())?,
            order: parse_order(args.order_by.as_ref())?,
            window: parse_window(args.cursor.as_ref(), args.skip, args.take)?,
        })
    }

    pub fn from_json(
        registry: &SchemaRegistry,
        model: &'static EntityModel,
        json: &Json,
    ) -> Result<Self, ValidateError> {
        Self::from_args(registry, model, from_json("count", json)?)
    }
}

///
/// CountSpec
///

#[derive(Clone, Debug)]
pub struct CountSpec {
    selector: Selector,
}

impl CountSpec {
    pub fn compile(
        registry: &SchemaRegistry,
        entity: &'static EntityModel,
        query: &Count,
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
        })
    }

    #[must_use]
    pub const fn predicate(&self) -> &Predicate {
        &self.selector.predicate
    }

    pub fn execute<S: QuerySource>(&self, source: &S) -> Result<usize, Error> {
        let entity = self.selector.entity().name;
        sink::record(MetricsEvent::QueryExecuted {
            entity,
            kind: QueryKind::Count,
        });
        tracing::debug!(entity, "executing count");

        Ok(self.selector.select(source)?.len())
    }
}
