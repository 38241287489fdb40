use serde::{Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error as ThisError;
use time::{format_description::BorrowedFormatItem, macros::format_description};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

///
/// Date
///
/// Calendar date without a time zone, written `YYYY-MM-DD`.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(transparent)]
pub struct Date(time::Date);

impl Date {
    /// Build a date from calendar parts, returning `None` for impossible dates.
    #[must_use]
    pub fn new_checked(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = time::Month::try_from(month).ok()?;

        time::Date::from_calendar_date(year, month, day)
            .ok()
            .map(Self)
    }

    pub fn parse(s: &str) -> Result<Self, DateParseError> {
        time::Date::parse(s, DATE_FORMAT)
            .map(Self)
            .map_err(|err| DateParseError {
                input: s.to_string(),
                message: err.to_string(),
            })
    }

    #[must_use]
    pub const fn get(self) -> time::Date {
        self.0
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.0;
        write!(f, "{:04}-{:02}-{:02}", d.year(), u8::from(d.month()), d.day())
    }
}

impl FromStr for Date {
    type Err = DateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<time::Date> for Date {
    fn from(d: time::Date) -> Self {
        Self(d)
    }
}

impl Serialize for Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

///
/// DateParseError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("invalid date '{input}': {message}")]
pub struct DateParseError {
    pub input: String,
    pub message: String,
}

///
/// TESTS
///
