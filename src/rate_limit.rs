use dashmap::DashMap;
use std::time::{Duration, Instant};

use crate::client_id::ClientId;

// Longest window accepted; keeps `now + window` clear of Instant overflow
pub const MAX_WINDOW: Duration = Duration::from_secs(365 * 24 * 60 * 60);

// Rate limit entry - tracks requests per client id
#[derive(Debug, Clone, Copy)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_time: Instant, // window start + window
}

impl RateLimitEntry {
    fn fresh(now: Instant, window: Duration) -> Self {
        Self {
            count: 0,
            reset_time: now + window,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now >= self.reset_time
    }
}

// Outcome of a single admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub admitted: bool,
    pub remaining: u32,
    pub reset_in: u64, // seconds until the window resets
}

/// Fixed window limiter keyed by client id.
///
/// One instance is built at startup and shared through `AppState`. Entries are
/// replaced lazily when a request arrives after their window ended; nothing
/// else removes them unless [`RateLimiter::sweep_expired`] is called.
pub struct RateLimiter {
    entries: DashMap<ClientId, RateLimitEntry>,
    limit: u32,       // max requests allowed per window
    window: Duration, // duration of one window
}

impl RateLimiter {
    // `window` is capped at MAX_WINDOW
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            limit,
            window: window.min(MAX_WINDOW),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn check(&self, id: &ClientId) -> Decision {
        self.check_at(id, Instant::now())
    }

    /// Admit or reject one request for `id` at time `now`.
    ///
    /// The entry's shard lock is held from lookup to increment, so two
    /// concurrent callers can't both take the last slot.
    pub fn check_at(&self, id: &ClientId, now: Instant) -> Decision {
        let mut entry = self
            .entries
            .entry(id.clone())
            .or_insert_with(|| RateLimitEntry::fresh(now, self.window));

        // window expired..? start a new one
        if entry.is_expired(now) {
            *entry = RateLimitEntry::fresh(now, self.window);
        }

        let remaining = self.limit.saturating_sub(entry.count);
        let reset_in = ceil_secs(entry.reset_time.saturating_duration_since(now));

        // over limit, leave the entry alone
        if entry.count >= self.limit {
            return Decision {
                admitted: false,
                remaining: 0,
                reset_in,
            };
        }

        entry.count += 1;
        Decision {
            admitted: true,
            remaining: remaining - 1,
            reset_in,
        }
    }

    // Current stored count, None when the id has no entry
    pub fn count(&self, id: &ClientId) -> Option<u32> {
        self.entries.get(id).map(|e| e.count)
    }

    /// Drop every entry whose window has ended. Returns how many were removed.
    pub fn sweep_expired(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }
}

fn ceil_secs(d: Duration) -> u64 {
    let millis = d.as_millis();
    millis.div_ceil(1000) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn id(s: &str) -> ClientId {
        ClientId::new(s)
    }

    #[test]
    fn nth_admitted_and_next_rejected() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        let now = Instant::now();
        for _ in 0..5 {
            assert!(limiter.check_at(&id("a"), now).admitted);
        }
        let d = limiter.check_at(&id("a"), now);
        assert!(!d.admitted);
        assert_eq!(d.remaining, 0);
    }

    #[test]
    fn twenty_per_minute_scenario() {
        let limiter = RateLimiter::new(20, Duration::from_secs(60));
        let client = id("1.2.3.4");
        let start = Instant::now();

        let mut seen = Vec::new();
        for i in 0..20u64 {
            let d = limiter.check_at(&client, start + Duration::from_millis(i * 50));
            assert!(d.admitted);
            seen.push(d.remaining);
        }
        assert_eq!(seen, (0..20).rev().collect::<Vec<u32>>());

        let d = limiter.check_at(&client, start + Duration::from_secs(1));
        assert_eq!(
            d,
            Decision {
                admitted: false,
                remaining: 0,
                reset_in: 59
            }
        );
    }

    #[test]
    fn rejection_does_not_touch_count() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let now = Instant::now();
        limiter.check_at(&id("a"), now);
        limiter.check_at(&id("a"), now);
        for _ in 0..10 {
            assert!(!limiter.check_at(&id("a"), now).admitted);
        }
        assert_eq!(limiter.count(&id("a")), Some(2));
    }

    #[test]
    fn window_rollover_starts_fresh() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        let start = Instant::now();
        for _ in 0..4 {
            limiter.check_at(&id("a"), start);
        }

        // exactly at reset_time counts as expired
        let d = limiter.check_at(&id("a"), start + Duration::from_secs(60));
        assert!(d.admitted);
        assert_eq!(d.remaining, 2);
        assert_eq!(d.reset_in, 60);
        assert_eq!(limiter.count(&id("a")), Some(1));
    }

    #[test]
    fn remaining_never_increases_within_window() {
        let limiter = RateLimiter::new(4, Duration::from_secs(10));
        let start = Instant::now();
        let mut last = u32::MAX;
        for i in 0..8u64 {
            let d = limiter.check_at(&id("a"), start + Duration::from_secs(i));
            assert!(d.remaining <= last);
            last = d.remaining;
        }
    }

    #[test]
    fn reset_in_rounds_up() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let start = Instant::now();
        limiter.check_at(&id("a"), start);
        let d = limiter.check_at(&id("a"), start + Duration::from_millis(500));
        assert_eq!(d.reset_in, 60);
        let d = limiter.check_at(&id("a"), start + Duration::from_millis(59_999));
        assert_eq!(d.reset_in, 1);
    }

    #[test]
    fn identifiers_are_isolated() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        let now = Instant::now();
        assert!(limiter.check_at(&id("a"), now).admitted);
        assert!(!limiter.check_at(&id("a"), now).admitted);
        assert!(limiter.check_at(&id("b"), now).admitted);
        assert_eq!(limiter.len(), 2);
    }

    #[test]
    fn oversized_window_is_capped() {
        let limiter = RateLimiter::new(3, Duration::MAX);
        assert_eq!(limiter.limit(), 3);
        assert_eq!(limiter.window(), MAX_WINDOW);

        let d = limiter.check(&id("a"));
        assert!(d.admitted);
        assert_eq!(d.reset_in, MAX_WINDOW.as_secs());
    }

    #[test]
    fn zero_limit_rejects_everything() {
        let limiter = RateLimiter::new(0, Duration::from_secs(60));
        let d = limiter.check(&id("a"));
        assert!(!d.admitted);
        assert_eq!(limiter.count(&id("a")), Some(0));
    }

    #[test]
    fn stale_entries_persist_until_swept() {
        let limiter = RateLimiter::new(5, Duration::from_secs(1));
        let start = Instant::now();
        limiter.check_at(&id("a"), start);
        limiter.check_at(&id("b"), start + Duration::from_millis(900));
        assert_eq!(limiter.len(), 2);

        let removed = limiter.sweep_expired(start + Duration::from_secs(1));
        assert_eq!(removed, 1);
        assert_eq!(limiter.count(&id("a")), None);
        assert_eq!(limiter.count(&id("b")), Some(1));
    }

    #[test]
    fn concurrent_checks_never_overadmit() {
        let limiter = Arc::new(RateLimiter::new(50, Duration::from_secs(60)));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = Arc::clone(&limiter);
                std::thread::spawn(move || {
                    (0..25)
                        .filter(|_| limiter.check(&ClientId::new("shared")).admitted)
                        .count()
                })
            })
            .collect();

        let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(admitted, 50);
        assert_eq!(limiter.count(&ClientId::new("shared")), Some(50));
    }
}
