//! Metrics sink boundary.
//!
//! Compilation and execution code never touches `obs::metrics` directly.
//! All instrumentation flows through `MetricsEvent` and `MetricsSink`.
use crate::obs::metrics::{self, EventReport};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// QueryKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QueryKind {
    FindMany,
    FindFirst,
    FindUnique,
    Count,
    Aggregate,
    GroupBy,
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    FilterCompiled {
        entity: &'static str,
    },
    FilterRejected {
        entity: &'static str,
    },
    RecordsEvaluated {
        entity: &'static str,
        evaluated: u64,
        matched: u64,
    },
    RelationUnresolved {
        entity: &'static str,
        relation: &'static str,
    },
    WindowApplied {
        entity: &'static str,
        rows: u64,
    },
    CursorMiss {
        entity: &'static str,
    },
    QueryExecuted {
        entity: &'static str,
        kind: QueryKind,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink that writes into the thread-local metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::FilterCompiled { entity } => metrics::with_state_mut(|m| {
                m.ops.filters_compiled = m.ops.filters_compiled.saturating_add(1);
                metrics::entity_mut(m, entity, |e| {
                    e.filters_compiled = e.filters_compiled.saturating_add(1);
                });
            }),

            MetricsEvent::FilterRejected { entity } => metrics::with_state_mut(|m| {
                m.ops.filters_rejected = m.ops.filters_rejected.saturating_add(1);
                metrics::entity_mut(m, entity, |e| {
                    e.filters_rejected = e.filters_rejected.saturating_add(1);
                });
            }),

            MetricsEvent::RecordsEvaluated {
                entity,
                evaluated,
                matched,
            } => metrics::with_state_mut(|m| {
                m.ops.records_evaluated = m.ops.records_evaluated.saturating_add(evaluated);
                m.ops.records_matched = m.ops.records_matched.saturating_add(matched);
                metrics::entity_mut(m, entity, |e| {
                    e.records_evaluated = e.records_evaluated.saturating_add(evaluated);
                    e.records_matched = e.records_matched.saturating_add(matched);
                });
            }),

            MetricsEvent::RelationUnresolved { entity, .. } => metrics::with_state_mut(|m| {
                m.ops.relations_unresolved = m.ops.relations_unresolved.saturating_add(1);
                metrics::entity_mut(m, entity, |e| {
                    e.relations_unresolved = e.relations_unresolved.saturating_add(1);
                });
            }),

            MetricsEvent::WindowApplied { rows, .. } => metrics::with_state_mut(|m| {
                m.ops.windows_applied = m.ops.windows_applied.saturating_add(1);
                m.ops.rows_windowed = m.ops.rows_windowed.saturating_add(rows);
            }),

            MetricsEvent::CursorMiss { entity } => metrics::with_state_mut(|m| {
                m.ops.cursor_misses = m.ops.cursor_misses.saturating_add(1);
                metrics::entity_mut(m, entity, |e| {
                    e.cursor_misses = e.cursor_misses.saturating_add(1);
                });
            }),

            MetricsEvent::QueryExecuted { entity, kind } => metrics::with_state_mut(|m| {
                let ops = &mut m.ops;
                let counter = match kind {
                    QueryKind::FindMany => &mut ops.find_many_calls,
                    QueryKind::FindFirst => &mut ops.find_first_calls,
                    QueryKind::FindUnique => &mut ops.find_unique_calls,
                    QueryKind::Count => &mut ops.count_calls,
                    QueryKind::Aggregate => &mut ops.aggregate_calls,
                    QueryKind::GroupBy => &mut ops.group_by_calls,
                };
                *counter = counter.saturating_add(1);
                metrics::entity_mut(m, entity, |e| e.queries = e.queries.saturating_add(1));
            }),
        }
    }
}

pub(crate) fn record(event: MetricsEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());

    match sink {
        Some(sink) => sink.record(event),
        None => GlobalMetricsSink.record(event),
    }
}

/// Snapshot the current metrics state.
///
/// `window_start_ms` filters by window start (`EventState::since_ms`),
/// not by per-event timestamps.
#[must_use]
pub fn metrics_report(window_start_ms: Option<u64>) -> EventReport {
    metrics::report_window_start(window_start_ms)
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override on this thread.
/// The previous sink is restored on return and on unwind.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let prev = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = prev;
            });
        }
    }

    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///
