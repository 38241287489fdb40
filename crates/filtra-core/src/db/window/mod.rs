//! Cursor pagination over an already ordered sequence.
//!
//! A window is `(cursor, skip, take)`. A positive `take` yields records
//! starting `skip` after the anchor; a negative `take` yields `|take|`
//! records ending `skip` before it (the anchor itself included when
//! `skip` is zero).

mod cursor;


// re-exports
pub use cursor::{CompiledCursor, Cursor};

use crate::{
    config::FilterConfig,
    db::predicate::ValidateError,
    model::EntityModel,
    obs::sink::{self, MetricsEvent},
    traits::Record,
};
use std::ops::Range;
use thiserror::Error as ThisError;

///
/// WindowError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum WindowError {
    #[error("cursor does not match any '{entity}' record")]
    CursorNotFound { entity: String },
}

///
/// Window
/// Uncompiled pagination arguments.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Window {
    pub cursor: Option<Cursor>,
    pub skip: u64,
    pub take: Option<i64>,
}

impl Window {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cursor: None,
            skip: 0,
            take: None,
        }
    }

    #[must_use]
    pub fn cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }

    #[must_use]
    pub const fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    #[must_use]
    pub const fn take(mut self, take: i64) -> Self {
        self.take = Some(take);
        self
    }

    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.cursor.is_none() && self.skip == 0 && self.take.is_none()
    }
}

///
/// PageWindow
///
/// Validated window: cursor keys resolved to unique fields and `take`
/// within the configured bound.
///

#[derive(Clone, Debug)]
pub struct PageWindow {
    entity: &'static EntityModel,
    cursor: Option<CompiledCursor>,
    skip: usize,
    take: Option<i64>,
}

impl PageWindow {
    pub fn compile(
        entity: &'static EntityModel,
        window: &Window,
        config: &FilterConfig,
    ) -> Result<Self, ValidateError> {
        if let Some(take) = window.take
            && take.unsigned_abs() > config.max_take
        {
            return Err(ValidateError::TakeTooLarge {
                take,
                max: config.max_take,
            });
        }

        let cursor = window
            .cursor
            .as_ref()
            .map(|cursor| cursor.compile(entity))
            .transpose()?;

        Ok(Self {
            entity,
            cursor,
            skip: usize::try_from(window.skip).unwrap_or(usize::MAX),
            take: window.take,
        })
    }

    /// Window with no cursor, skip or take.
    #[must_use]
    pub const fn unbounded(entity: &'static EntityModel) -> Self {
        Self {
            entity,
            cursor: None,
            skip: 0,
            take: None,
        }
    }

    #[must_use]
    pub const fn take(&self) -> Option<i64> {
        self.take
    }

    /// Sub-slice of `ordered` selected by this window.
    pub fn apply<'a, R: Record>(&self, ordered: &'a [R]) -> Result<&'a [R], WindowError> {
        let anchor = match &self.cursor {
            Some(cursor) => Some(self.locate(cursor, ordered)?),
            None => None,
        };

        let range = window_range(ordered.len(), anchor, self.skip, self.take);
        sink::record(MetricsEvent::WindowApplied {
            entity: self.entity.name,
            rows: u64::try_from(range.len()).unwrap_or(u64::MAX),
        });

        Ok(&ordered[range])
    }

    fn locate<R: Record>(&self, cursor: &CompiledCursor, ordered: &[R]) -> Result<usize, WindowError> {
        if let Some(index) = ordered.iter().position(|record| cursor.matches(record)) {
            return Ok(index);
        }

        tracing::debug!(entity = self.entity.name, "cursor not found");
        sink::record(MetricsEvent::CursorMiss {
            entity: self.entity.name,
        });

        Err(WindowError::CursorNotFound {
            entity: self.entity.name.to_string(),
        })
    }
}

/// Index range of a window over `len` ordered records.
///
/// `anchor` is the cursor position, if any. Both bounds are clamped to
/// `len`, so the range is always valid for slicing.
#[must_use]
pub fn window_range(len: usize, anchor: Option<usize>, skip: usize, take: Option<i64>) -> Range<usize> {
    match take {
        Some(take) if take < 0 => {
            let count = usize::try_from(take.unsigned_abs()).unwrap_or(usize::MAX);
            let end = anchor
                .map_or(len, |index| index.saturating_add(1))
                .min(len)
                .saturating_sub(skip);

            end.saturating_sub(count)..end
        }
        _ => {
            let start = anchor.unwrap_or(0).saturating_add(skip).min(len);
            let end = take.map_or(len, |take| {
                start
                    .saturating_add(usize::try_from(take).unwrap_or(usize::MAX))
                    .min(len)
            });

            start..end
        }
    }
}
