//! Observability: process-local counters and the sink boundary that
//! compilation, evaluation and query execution report through.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EntityCounters, EntitySummary, EventOps, EventReport, EventState};
pub use sink::{MetricsEvent, MetricsSink, QueryKind, metrics_report, metrics_reset_all, with_metrics_sink};
