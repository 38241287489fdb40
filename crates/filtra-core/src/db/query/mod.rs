//! Query specifications and their execution.
//!
//! A query is built in three steps: typed arguments (`FindMany`, `Count`,
//! ...) built in Rust or parsed from JSON, a compiled immutable spec that
//! can be inspected without running, and an explicit `execute` against a
//! record source.

mod aggregate;
mod args;
mod find;
mod select;


// re-exports
pub use aggregate::{
    Aggregate, AggregateSelection, AggregateSpec, AggregateValues, CountValues, GroupBy,
    GroupBySpec, GroupRow,
};
pub use args::{AggregateArgs, CountArgs, FindManyArgs, FindUniqueArgs, GroupByArgs};
pub use find::{Count, CountSpec, FindMany, FindManySpec, FindUnique, FindUniqueSpec};

use crate::traits::{RecordSource, RelationResolver};

///
/// QuerySource
/// Storage a query executes against: scans plus relation resolution.
///

pub trait QuerySource: RecordSource + RelationResolver<<Self as RecordSource>::Record> {}

impl<S> QuerySource for S where S: RecordSource + RelationResolver<<S as RecordSource>::Record> {}
