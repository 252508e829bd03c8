//! Observability: ephemeral in-memory counters behind a sink boundary.
//!
//! Engine logic MUST NOT touch counter state directly; all instrumentation
//! flows through `MetricsEvent` and `record`.

pub(crate) mod metrics;
pub(crate) mod sink;

pub use metrics::EventOps;
pub use sink::{MetricsEvent, record, report, reset};
