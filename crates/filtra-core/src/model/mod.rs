//! Runtime data model definitions.
//!
//! Types in `model` are the runtime representations of a schema: the field
//! set, declared kinds and relations of each entity. They are usually
//! produced by a code generator as `static` items and are consumed by the
//! filter compiler for validation and by the evaluator for relation
//! traversal.
//!
//! In general:
//! - generated code defines *what exists*
//! - `model` defines *what the compiler checks against*
pub mod entity;
pub mod field;
pub mod registry;
pub mod relation;

// re-exports
pub use entity::EntityModel;
pub use field::{FieldKind, FieldModel};
pub use registry::{RegistryError, SchemaRegistry};
pub use relation::{Cardinality, RelationModel};
