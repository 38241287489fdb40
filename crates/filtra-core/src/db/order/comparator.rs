use crate::{
    config::FilterConfig,
    db::{
        order::{NullsOrder, OrderDirection, OrderSpec},
        predicate::ValidateError,
    },
    model::{EntityModel, FieldModel},
    traits::Record,
    value::canonical_cmp,
};
use std::cmp::Ordering;

///
/// Ranked
/// A record paired with its position in the input sequence.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ranked<R> {
    pub position: usize,
    pub record: R,
}

///
/// Comparator
///
/// Compiled order spec. The first non-equal key decides; records equal on
/// every key keep their input order, so the order is total and sorting is
/// deterministic.
///

#[derive(Clone, Debug)]
pub struct Comparator {
    entity: &'static EntityModel,
    keys: Vec<SortKey>,
}

#[derive(Clone, Copy, Debug)]
struct SortKey {
    field: &'static FieldModel,
    direction: OrderDirection,
    nulls: NullsOrder,
}

impl Comparator {
    /// Validate `spec` against `entity` and resolve null placement.
    pub fn compile(
        entity: &'static EntityModel,
        spec: &OrderSpec,
        config: &FilterConfig,
    ) -> Result<Self, ValidateError> {
        let keys = spec
            .fields
            .iter()
            .map(|order| {
                let field = entity
                    .field(&order.field)
                    .ok_or_else(|| ValidateError::unknown_field(entity.name, &order.field))?;
                if !field.kind.is_orderable() {
                    return Err(ValidateError::NotOrderable {
                        field: field.name.to_string(),
                    });
                }

                let nulls = order.nulls.unwrap_or(match order.direction {
                    OrderDirection::Asc => config.nulls,
                    OrderDirection::Desc => config.nulls.reversed(),
                });

                Ok(SortKey {
                    field,
                    direction: order.direction,
                    nulls,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(entity = entity.name, keys = keys.len(), "compiled comparator");

        Ok(Self { entity, keys })
    }

    #[must_use]
    pub const fn entity(&self) -> &'static EntityModel {
        self.entity
    }

    /// Field names in key order.
    #[must_use]
    pub fn fields(&self) -> Vec<&'static str> {
        self.keys.iter().map(|key| key.field.name).collect()
    }

    /// Compare on the sort keys only.
    pub fn compare_records<R: Record>(&self, left: &R, right: &R) -> Ordering {
        for key in &self.keys {
            let ordering = key.compare(left, right);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }

        Ordering::Equal
    }

    /// Compare on the sort keys, then on input position.
    pub fn compare<R: Record>(&self, left: &Ranked<R>, right: &Ranked<R>) -> Ordering {
        self.compare_records(&left.record, &right.record)
            .then(left.position.cmp(&right.position))
    }

    /// Sort records; equal records keep their input order.
    #[must_use]
    pub fn sort<R: Record>(&self, records: Vec<R>) -> Vec<R> {
        if self.keys.is_empty() {
            return records;
        }

        let mut ranked = records
            .into_iter()
            .enumerate()
            .map(|(position, record)| Ranked { position, record })
            .collect::<Vec<_>>();
        ranked.sort_by(|left, right| self.compare(left, right));

        ranked.into_iter().map(|ranked| ranked.record).collect()
    }
}

impl SortKey {
    fn compare<R: Record>(&self, left: &R, right: &R) -> Ordering {
        let left = left.field(self.field.name);
        let right = right.field(self.field.name);

        match (left.non_null(), right.non_null()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => self.null_side(),
            (Some(_), None) => self.null_side().reverse(),
            (Some(l), Some(r)) => self.direction.apply(canonical_cmp(l, r)),
        }
    }

    // Where a null lands relative to a present value.
    const fn null_side(&self) -> Ordering {
        match self.nulls {
            NullsOrder::First => Ordering::Less,
            NullsOrder::Last => Ordering::Greater,
        }
    }
}
