//! Filter expressions: the `WhereInput` tree callers hand to the compiler.

mod ast;
mod builder;
mod document;


pub use ast::{Condition, FieldFilter, Filter, RelationFilter, RelationOp};
pub use document::parse_where;
