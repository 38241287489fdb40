//! ## Crate layout
//! - `core`: runtime values, schema models, the filter compiler, ordering,
//!   windows, projection, query specs and observability.
//!
//! The `prelude` module carries the vocabulary a generated client needs to
//! build and run queries.

pub use filtra_core as core;

/// re-exports
///
/// generated clients can use these without naming the dependencies in
/// their own Cargo.toml
pub mod __reexports {
    pub use serde;
    pub use serde_json;
}

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use crate::core::{
    db::{Client, Repository},
    error::{Error, ErrorClass, ErrorOrigin},
};

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::core::{
        config::FilterConfig,
        db::{
            Client, Repository,
            filter::{Filter, parse_where},
            order::{NullsOrder, OrderField, OrderSpec},
            projection::{ProjectedRecord, ProjectedRelation, Projection},
            query::{
                Aggregate, AggregateSelection, Count, FindMany, FindUnique, GroupBy, QuerySource,
            },
            source::{Document, MemorySource},
            window::{Cursor, Window},
        },
        model::{Cardinality, EntityModel, FieldKind, FieldModel, RelationModel, SchemaRegistry},
        traits::{EntityKind, Record as _, RecordSource as _, RelationResolver as _},
        types::{Date, Timestamp, Ulid},
        value::{TextMode, Value},
    };
    pub use serde::Serialize;
}
