//! Filter compilation and the query pipeline built on top of it.
//!
//! `filter` and `order` describe what to select, `predicate` compiles and
//! evaluates filters, `window` and `projection` shape the result, `query`
//! ties them into immutable specs and `session` is the client surface.

pub mod filter;
pub mod order;
pub mod predicate;
pub mod projection;
pub mod query;
pub mod session;
pub mod source;
pub mod window;

// re-exports
pub use session::{Client, Repository};
