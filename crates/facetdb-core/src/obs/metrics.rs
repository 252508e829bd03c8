use serde::{Deserialize, Serialize};

///
/// EventOps
/// Ephemeral, in-memory counters for engine operations since last reset.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EventOps {
    // resolution entrypoints
    pub resolve_calls: u64,

    // queries issued, by side
    pub static_queries: u64,
    pub dynamic_table_queries: u64,

    // schema caches
    pub catalog_loads: u64,
    pub router_probes: u64,

    // keyed lookup caches
    pub cache_hits: u64,
    pub cache_misses: u64,

    // option dictionary
    pub options_created: u64,
    pub duplicate_options_skipped: u64,

    // type coercion
    pub coercion_fallbacks: u64,
}
