use dashmap::DashMap;
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};

use crate::metrics::CACHE_SIZE;

// Cache entry with timestamp
#[derive(Clone)]
pub struct CacheEntry {
    pub variations: Vec<String>,
    pub created_at: Instant,
}

// Everything that changes what the model is asked
pub struct CacheKeyParts<'a> {
    pub provider: &'a str,
    pub model: &'a str,
    pub format: &'a str,
    pub variations: u32,
    pub text: &'a str,
}

// Create a cache key (hash of provider + model + format + count + text)
pub fn make_cache_key(parts: &CacheKeyParts<'_>) -> String {
    let mut hasher = Sha256::new();
    for field in [parts.provider, parts.model, parts.format] {
        hasher.update(field.as_bytes());
        hasher.update([0u8]); // separator so "ab"+"c" != "a"+"bc"
    }
    hasher.update(parts.variations.to_le_bytes());
    hasher.update(parts.text.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Generated variations kept for `ttl`. A zero ttl turns the cache off.
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<Vec<String>> {
        if !self.enabled() {
            return None;
        }
        let entry = self.entries.get(key)?;
        (entry.created_at.elapsed() < self.ttl).then(|| entry.variations.clone())
    }

    pub fn insert(&self, key: String, variations: Vec<String>) {
        if !self.enabled() {
            return;
        }
        self.entries.insert(
            key,
            CacheEntry {
                variations,
                created_at: Instant::now(),
            },
        );
        CACHE_SIZE.set(self.entries.len() as f64);
    }

    pub fn sweep_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.created_at.elapsed() < self.ttl);
        CACHE_SIZE.set(self.entries.len() as f64);
        before.saturating_sub(self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(text: &str, format: &str) -> String {
        make_cache_key(&CacheKeyParts {
            provider: "Groq",
            model: "m",
            format,
            variations: 6,
            text,
        })
    }

    #[test]
    fn key_depends_on_every_part() {
        assert_eq!(key("hi", "email"), key("hi", "email"));
        assert_ne!(key("hi", "email"), key("hi", "social"));
        assert_ne!(key("hi", "email"), key("ho", "email"));
        assert_eq!(key("hi", "email").len(), 64);
    }

    #[test]
    fn disabled_cache_stores_nothing() {
        let cache = ResponseCache::new(Duration::ZERO);
        cache.insert("k".into(), vec!["v".into()]);
        assert!(cache.is_empty());
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn returns_fresh_entries() {
        let cache = ResponseCache::new(Duration::from_secs(30));
        cache.insert("k".into(), vec!["a".into(), "b".into()]);
        assert_eq!(cache.get("k"), Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn expired_entries_are_ignored_and_swept() {
        let cache = ResponseCache::new(Duration::from_millis(20));
        cache.insert("k".into(), vec!["a".into()]);
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.sweep_expired(), 1);
        assert!(cache.is_empty());
    }
}
