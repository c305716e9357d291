use std::sync::Arc;
use std::time::Instant;
use tokio::time::{Duration, interval};
use tracing::{debug, info};

use crate::metrics::RATE_LIMIT_ENTRIES;
use crate::state::AppState;

// One pass over the rate limiter and the cache
pub fn sweep_once(state: &AppState) -> (usize, usize) {
    let limits = state.rate_limiter.sweep_expired(Instant::now());
    let cached = state.cache.sweep_expired();
    RATE_LIMIT_ENTRIES.set(state.rate_limiter.len() as f64);
    (limits, cached)
}

// Sweeper loop - drops expired rate limit windows and cache entries
pub async fn sweeper(state: Arc<AppState>, every: Duration) {
    let mut interval = interval(every);

    info!(interval = ?every, "sweeper started");

    loop {
        interval.tick().await;

        let (limits, cached) = sweep_once(&state);
        if limits > 0 || cached > 0 {
            debug!(limits, cached, "swept expired entries");
        }
    }
}
