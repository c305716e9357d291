use lazy_static::lazy_static;
use prometheus::{
    Counter, Gauge, Histogram, register_counter, register_gauge, register_histogram,
};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("prodraft_requests_total", "Total number of generate requests").unwrap();
    pub static ref THROTTLED_TOTAL: Counter = register_counter!(
        "prodraft_throttled_total",
        "Requests rejected by the rate limiter"
    )
    .unwrap();
    pub static ref UPSTREAM_ERRORS: Counter = register_counter!(
        "prodraft_upstream_errors_total",
        "Failed calls to the generation provider"
    )
    .unwrap();
    pub static ref DEGRADED_TOTAL: Counter = register_counter!(
        "prodraft_degraded_total",
        "Provider answers that were not valid JSON"
    )
    .unwrap();
    pub static ref CACHE_HITS: Counter =
        register_counter!("prodraft_cache_hits_total", "Total cache hits").unwrap();
    pub static ref CACHE_MISSES: Counter =
        register_counter!("prodraft_cache_misses_total", "Total cache misses").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "prodraft_upstream_latency_seconds",
        "Provider call latency in seconds"
    )
    .unwrap();
    pub static ref RATE_LIMIT_ENTRIES: Gauge = register_gauge!(
        "prodraft_rate_limit_entries",
        "Client ids tracked by the rate limiter"
    )
    .unwrap();
    pub static ref CACHE_SIZE: Gauge =
        register_gauge!("prodraft_cache_size", "Current number of items in cache").unwrap();
}
