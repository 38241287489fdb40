use crate::{
    config::FilterConfig,
    db::{
        filter::Filter,
        order::{Comparator, OrderSpec},
        predicate::{Predicate, ValidateError, compile},
        query::QuerySource,
        window::{PageWindow, Window},
    },
    error::Error,
    model::{EntityModel, FieldModel, SchemaRegistry},
    obs::sink::{self, MetricsEvent},
    traits::Record,
    value::Value,
};
use std::collections::BTreeSet;

///
/// Selector
///
/// Shared record pipeline of every query kind:
/// scan → filter → order → distinct → window.
///

#[derive(Clone, Debug)]
pub(crate) struct Selector {
    pub(crate) predicate: Predicate,
    pub(crate) comparator: Comparator,
    pub(crate) distinct: Vec<&'static FieldModel>,
    pub(crate) window: PageWindow,
}

impl Selector {
    pub(crate) fn compile(
        registry: &SchemaRegistry,
        entity: &'static EntityModel,
        filter: &Filter,
        order: &OrderSpec,
        distinct: &[String],
        window: &Window,
        config: &FilterConfig,
    ) -> Result<Self, ValidateError> {
        let predicate = compile(registry, entity, filter, config)?;
        let comparator = Comparator::compile(entity, order, config)?;
        let distinct = distinct
            .iter()
            .map(|name| {
                entity
                    .field(name)
                    .ok_or_else(|| ValidateError::unknown_field(entity.name, name))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let window = PageWindow::compile(entity, window, config)?;

        Ok(Self {
            predicate,
            comparator,
            distinct,
            window,
        })
    }

    pub(crate) const fn entity(&self) -> &'static EntityModel {
        self.predicate.entity()
    }

    /// Run the pipeline and return the selected records in order.
    pub(crate) fn select<S: QuerySource>(&self, source: &S) -> Result<Vec<S::Record>, Error> {
        let records = filter_records(&self.predicate, source)?;
        let mut ordered = self.comparator.sort(records);
        if !self.distinct.is_empty() {
            ordered = distinct_by(ordered, &self.distinct);
        }

        Ok(self.window.apply(&ordered)?.to_vec())
    }
}

/// Scan `source` and keep the records `predicate` accepts.
pub(crate) fn filter_records<S: QuerySource>(
    predicate: &Predicate,
    source: &S,
) -> Result<Vec<S::Record>, Error> {
    let entity = predicate.entity();
    let scanned = source.scan(entity)?;
    let evaluated = scanned.len();

    let matched = if predicate.is_always_true() {
        scanned
    } else {
        scanned
            .into_iter()
            .filter(|record| predicate.evaluate(record, source))
            .collect::<Vec<_>>()
    };

    sink::record(MetricsEvent::RecordsEvaluated {
        entity: entity.name,
        evaluated: u64::try_from(evaluated).unwrap_or(u64::MAX),
        matched: u64::try_from(matched.len()).unwrap_or(u64::MAX),
    });
    tracing::debug!(
        entity = entity.name,
        evaluated,
        matched = matched.len(),
        "filtered records"
    );

    Ok(matched)
}

// Keep the first record of each distinct field tuple.
fn distinct_by<R: Record>(records: Vec<R>, fields: &[&'static FieldModel]) -> Vec<R> {
    let mut seen = BTreeSet::new();

    records
        .into_iter()
        .filter(|record| {
            let key = fields
                .iter()
                .map(|field| record.field(field.name).into_value())
                .collect::<Vec<Value>>();

            seen.insert(key)
        })
        .collect()
}
