//! Probe cache: URL → existence boolean (or error marker), capped by entry
//! count rather than bytes.

use chrono::{DateTime, Utc};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::Duration;

/// One entry in the probe cache.
#[derive(Debug, Clone)]
pub struct ProbeCacheEntry {
    /// `Ok(true)`/`Ok(false)` for a successful existence check; `Err` for a
    /// cached failure (network error), which uses the shorter error ttl.
    pub outcome: Result<bool, String>,
    /// When this entry was inserted.
    pub inserted_at: DateTime<Utc>,
    /// How long this entry stays fresh after `inserted_at`.
    pub ttl: Duration,
}

/// Count-capped LRU cache of probe results.
pub struct ProbeCache {
    inner: LruCache<String, ProbeCacheEntry>,
}

impl ProbeCache {
    /// Create a cache capped at `count_cap` entries (default 1000).
    #[must_use]
    pub fn new(count_cap: usize) -> Self {
        Self {
            inner: LruCache::new(NonZeroUsize::new(count_cap.max(1)).expect("nonzero")),
        }
    }

    /// Look up a fresh entry, promoting it in recency order.
    pub fn get(&mut self, url: &str, now: DateTime<Utc>) -> Option<&ProbeCacheEntry> {
        let expired = self
            .inner
            .peek(url)
            .is_some_and(|e| super::is_expired(e.inserted_at, e.ttl, now));
        if expired {
            self.inner.pop(url);
            return None;
        }
        self.inner.get(url)
    }

    /// Insert or replace an entry; `lru::LruCache` evicts LRU automatically
    /// past `count_cap`.
    pub fn put(&mut self, url: String, entry: ProbeCacheEntry) {
        self.inner.put(url, entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_cap_evicts_oldest() {
        let mut cache = ProbeCache::new(2);
        cache.put(
            "a".to_string(),
            ProbeCacheEntry {
                outcome: Ok(true),
                inserted_at: Utc::now(),
                ttl: Duration::from_secs(300),
            },
        );
        cache.put(
            "b".to_string(),
            ProbeCacheEntry {
                outcome: Ok(true),
                inserted_at: Utc::now(),
                ttl: Duration::from_secs(300),
            },
        );
        cache.put(
            "c".to_string(),
            ProbeCacheEntry {
                outcome: Ok(true),
                inserted_at: Utc::now(),
                ttl: Duration::from_secs(300),
            },
        );
        assert!(cache.get("a", Utc::now()).is_none());
        assert!(cache.get("c", Utc::now()).is_some());
    }

    #[test]
    fn probe_without_network_io_for_fresh_entry() {
        let mut cache = ProbeCache::new(10);
        cache.put(
            "https://example.com".to_string(),
            ProbeCacheEntry {
                outcome: Ok(true),
                inserted_at: Utc::now(),
                ttl: Duration::from_secs(300),
            },
        );
        let hit = cache.get("https://example.com", Utc::now());
        assert!(matches!(hit.map(|e| &e.outcome), Some(Ok(true))));
    }
}
