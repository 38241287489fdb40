//! Filter predicate compiler.
//!
//! `compile` validates a filter against the schema and lowers it into an
//! immutable `Predicate`; `Predicate::evaluate` is the total, side-effect
//! free test of one record.

mod compile;
mod error;
mod eval;
pub(crate) mod literal;

#[cfg(test)]
mod tests;

pub use compile::{Predicate, compile};
pub use error::ValidateError;
