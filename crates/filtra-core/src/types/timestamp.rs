use serde::{Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

///
/// Timestamp
/// (in milliseconds since the Unix epoch, UTC)
///

#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const EPOCH: Self = Self(0);

    #[must_use]
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    #[must_use]
    pub const fn from_seconds(secs: i64) -> Self {
        Self(secs.saturating_mul(1_000))
    }

    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Parse an RFC 3339 timestamp; sub-millisecond precision is floored.
    pub fn parse_rfc3339(s: &str) -> Result<Self, TimestampParseError> {
        let dt = OffsetDateTime::parse(s, &Rfc3339).map_err(|err| TimestampParseError {
            input: s.to_string(),
            message: err.to_string(),
        })?;
        let millis = dt.unix_timestamp_nanos().div_euclid(1_000_000);

        i64::try_from(millis)
            .map(Self)
            .map_err(|_| TimestampParseError {
                input: s.to_string(),
                message: "timestamp out of range".to_string(),
            })
    }

    fn to_datetime(self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(self.0) * 1_000_000).ok()
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime().and_then(|dt| dt.format(&Rfc3339).ok()) {
            Some(text) => f.write_str(&text),
            None => write!(f, "{}ms", self.0),
        }
    }
}

impl FromStr for Timestamp {
    type Err = TimestampParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_rfc3339(s)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

///
/// TimestampParseError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("invalid timestamp '{input}': {message}")]
pub struct TimestampParseError {
    pub input: String,
    pub message: String,
}

///
/// TESTS
///
