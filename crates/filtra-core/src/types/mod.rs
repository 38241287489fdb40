//! Scalar newtypes carried inside `Value`.
//!
//! Each type has a total order and a canonical text form so filter literals
//! can be parsed from documents and compared without surprises.

mod date;
mod float;
mod timestamp;

pub use date::{Date, DateParseError};
pub use float::Float64;
pub use timestamp::{Timestamp, TimestampParseError};
pub use ulid::Ulid;
