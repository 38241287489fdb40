//! Coarse value classification used in validation messages and literal checks.

use std::fmt;

///
/// ValueFamily
///
/// Routing category only; field kinds decide what a literal may be.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueFamily {
    Null,
    Bool,
    Numeric,    // Int, Float
    Textual,    // Text
    Temporal,   // Date, Timestamp
    Identifier, // Id
    Enum,
    Collection, // List
}

impl fmt::Display for ValueFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Numeric => "number",
            Self::Textual => "text",
            Self::Temporal => "temporal",
            Self::Identifier => "id",
            Self::Enum => "enum",
            Self::Collection => "list",
        };

        f.write_str(label)
    }
}
