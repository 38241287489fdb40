//! Record containers and the in-memory source used by tests and embedders
//! that already hold their records in process.

mod document;
mod memory;

pub use document::Document;
pub use memory::MemorySource;

use thiserror::Error as ThisError;

///
/// RelationError
///
/// Soft failure while traversing a relation. Never surfaced from predicate
/// evaluation; the relation is treated as empty instead.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RelationError {
    #[error("relation '{entity}.{relation}' cannot be resolved by this source")]
    Unavailable { entity: String, relation: String },

    #[error("relation '{relation}' targets missing collection '{target}'")]
    UnknownCollection { relation: String, target: String },

    #[error("relation '{relation}' has an unusable key: {message}")]
    InvalidKey { relation: String, message: String },
}

///
/// SourceError
///
/// Failure reported by the storage collaborator while scanning records.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SourceError {
    #[error("entity '{entity}' is not available in this source")]
    UnknownEntity { entity: String },

    #[error("source failure for '{entity}': {message}")]
    Backend { entity: String, message: String },
}
