//! Core runtime for Filtra: values, schema models, the filter predicate
//! compiler and the query specs a generated client delegates to.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod obs;
pub mod traits;
pub mod types;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Domain vocabulary for building and running queries.
/// Errors, sources and compiled internals stay in their modules.
///

pub mod prelude {
    pub use crate::{
        config::FilterConfig,
        db::{
            Client, Repository,
            filter::{Condition, Filter},
            order::{NullsOrder, OrderDirection, OrderField, OrderSpec},
            projection::Projection,
            query::{Aggregate, AggregateSelection, Count, FindMany, FindUnique, GroupBy},
            window::{Cursor, Window},
        },
        model::{EntityModel, FieldKind, FieldModel, RelationModel, SchemaRegistry},
        traits::{EntityKind, Record, RecordSource, RelationResolver},
        value::{TextMode, Value},
    };
}
