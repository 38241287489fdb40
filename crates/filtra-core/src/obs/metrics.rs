use serde::Serialize;
use std::{cell::RefCell, collections::BTreeMap};

///
/// EventState
/// Ephemeral, in-memory counters for compilation and query execution.
///

#[derive(Clone, Debug, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub entities: BTreeMap<String, EntityCounters>,
    pub since_ms: u64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            entities: BTreeMap::new(),
            since_ms: now_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EventOps {
    // Compilation
    pub filters_compiled: u64,
    pub filters_rejected: u64,

    // Evaluation
    pub records_evaluated: u64,
    pub records_matched: u64,
    pub relations_unresolved: u64,

    // Windows
    pub windows_applied: u64,
    pub rows_windowed: u64,
    pub cursor_misses: u64,

    // Query entrypoints
    pub find_many_calls: u64,
    pub find_first_calls: u64,
    pub find_unique_calls: u64,
    pub count_calls: u64,
    pub aggregate_calls: u64,
    pub group_by_calls: u64,
}

///
/// EntityCounters
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EntityCounters {
    pub filters_compiled: u64,
    pub filters_rejected: u64,
    pub records_evaluated: u64,
    pub records_matched: u64,
    pub relations_unresolved: u64,
    pub cursor_misses: u64,
    pub queries: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters and restart the window.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

/// Increment one per-entity counter.
pub(crate) fn entity_mut<R>(
    m: &mut EventState,
    entity: &str,
    f: impl FnOnce(&mut EntityCounters) -> R,
) -> R {
    f(m.entities.entry(entity.to_string()).or_default())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn now_millis() -> u64 {
    let nanos = time::OffsetDateTime::now_utc().unix_timestamp_nanos();

    (nanos / 1_000_000).max(0) as u64
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EventReport {
    /// Ephemeral runtime counters since `since_ms`.
    pub counters: Option<EventState>,
    /// Per-entity counters with match ratios, busiest first.
    pub entity_counters: Vec<EntitySummary>,
}

///
/// EntitySummary
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EntitySummary {
    pub entity: String,
    pub filters_compiled: u64,
    pub filters_rejected: u64,
    pub records_evaluated: u64,
    pub records_matched: u64,
    pub match_ratio: f64,
    pub relations_unresolved: u64,
    pub cursor_misses: u64,
    pub queries: u64,
}

/// Build a report, or an empty one when the current window started before
/// `window_start_ms`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn report_window_start(window_start_ms: Option<u64>) -> EventReport {
    let snap = with_state(Clone::clone);
    if window_start_ms.is_some_and(|start| start > snap.since_ms) {
        return EventReport::default();
    }

    let mut entity_counters = snap
        .entities
        .iter()
        .map(|(entity, c)| EntitySummary {
            entity: entity.clone(),
            filters_compiled: c.filters_compiled,
            filters_rejected: c.filters_rejected,
            records_evaluated: c.records_evaluated,
            records_matched: c.records_matched,
            match_ratio: if c.records_evaluated > 0 {
                c.records_matched as f64 / c.records_evaluated as f64
            } else {
                0.0
            },
            relations_unresolved: c.relations_unresolved,
            cursor_misses: c.cursor_misses,
            queries: c.queries,
        })
        .collect::<Vec<_>>();

    entity_counters.sort_by(|a, b| {
        b.records_evaluated
            .cmp(&a.records_evaluated)
            .then_with(|| a.entity.cmp(&b.entity))
    });

    EventReport {
        counters: Some(snap),
        entity_counters,
    }
}

///
/// TESTS
///
