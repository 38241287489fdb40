//! Serde shapes of JSON query arguments.
//!
//! Nested documents (`where`, `orderBy`, `cursor`, `select`, ...) are kept
//! as raw JSON here and lowered against the entity model afterwards.

use serde::Deserialize;
use serde_json::Value as Json;

///
/// OneOrMany
///

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub(crate) fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(field) => vec![field],
            Self::Many(fields) => fields,
        }
    }
}

///
/// FindManyArgs
/// Also used by `findFirst`.
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct FindManyArgs {
    #[serde(rename = "where")]
    pub filter: Option<Json>,
    pub order_by: Option<Json>,
    pub cursor: Option<Json>,
    pub skip: Option<u64>,
    pub take: Option<i64>,
    pub(crate) distinct: Option<OneOrMany>,
    pub select: Option<Json>,
    pub include: Option<Json>,
    pub omit: Option<Json>,
}

///
/// FindUniqueArgs
///

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FindUniqueArgs {
    #[serde(rename = "where")]
    pub filter: Json,
    #[serde(default)]
    pub select: Option<Json>,
    #[serde(default)]
    pub include: Option<Json>,
    #[serde(default)]
    pub omit: Option<Json>,
}

///
/// CountArgs
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct CountArgs {
    #[serde(rename = "where")]
    pub filter: Option<Json>,
    pub order_by: Option<Json>,
    pub cursor: Option<Json>,
    pub skip: Option<u64>,
    pub take: Option<i64>,
}

///
/// AggregateArgs
///

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct AggregateArgs {
    #[serde(rename = "where")]
    pub filter: Option<Json>,
    pub order_by: Option<Json>,
    pub cursor: Option<Json>,
    pub skip: Option<u64>,
    pub take: Option<i64>,
    #[serde(rename = "_count")]
    pub count: Option<Json>,
    #[serde(rename = "_min")]
    pub min: Option<Json>,
    #[serde(rename = "_max")]
    pub max: Option<Json>,
    #[serde(rename = "_sum")]
    pub sum: Option<Json>,
    #[serde(rename = "_avg")]
    pub avg: Option<Json>,
}

///
/// GroupByArgs
///

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupByArgs {
    pub(crate) by: OneOrMany,
    #[serde(default, rename = "where")]
    pub filter: Option<Json>,
    #[serde(default)]
    pub skip: Option<u64>,
    #[serde(default)]
    pub take: Option<i64>,
    #[serde(default, rename = "_count")]
    pub count: Option<Json>,
    #[serde(default, rename = "_min")]
    pub min: Option<Json>,
    #[serde(default, rename = "_max")]
    pub max: Option<Json>,
    #[serde(default, rename = "_sum")]
    pub sum: Option<Json>,
    #[serde(default, rename = "_avg")]
    pub avg: Option<Json>,
}
