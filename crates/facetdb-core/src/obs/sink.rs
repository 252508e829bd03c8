//! Metrics sink boundary.
//!
//! Events accumulate into thread-local `EventOps` state, matching the
//! engine's single-threaded execution model.

use crate::obs::metrics::EventOps;
use std::cell::RefCell;

thread_local! {
    static STATE: RefCell<EventOps> = RefCell::new(EventOps::default());
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug)]
pub enum MetricsEvent {
    ResolveStart,
    StaticQuery,
    DynamicTableQuery,
    CatalogLoad,
    RouterProbe,
    CacheHit,
    CacheMiss,
    OptionsCreated { count: u64 },
    DuplicateOptionSkipped,
    CoercionFallback,
}

/// Record one event into the thread-local counter state.
pub fn record(event: MetricsEvent) {
    STATE.with_borrow_mut(|ops| match event {
        MetricsEvent::ResolveStart => ops.resolve_calls += 1,
        MetricsEvent::StaticQuery => ops.static_queries += 1,
        MetricsEvent::DynamicTableQuery => ops.dynamic_table_queries += 1,
        MetricsEvent::CatalogLoad => ops.catalog_loads += 1,
        MetricsEvent::RouterProbe => ops.router_probes += 1,
        MetricsEvent::CacheHit => ops.cache_hits += 1,
        MetricsEvent::CacheMiss => ops.cache_misses += 1,
        MetricsEvent::OptionsCreated { count } => ops.options_created += count,
        MetricsEvent::DuplicateOptionSkipped => ops.duplicate_options_skipped += 1,
        MetricsEvent::CoercionFallback => ops.coercion_fallbacks += 1,
    });
}

/// Snapshot of the counters since the last reset.
#[must_use]
pub fn report() -> EventOps {
    STATE.with_borrow(Clone::clone)
}

/// Zero every counter.
pub fn reset() {
    STATE.with_borrow_mut(|ops| *ops = EventOps::default());
}
