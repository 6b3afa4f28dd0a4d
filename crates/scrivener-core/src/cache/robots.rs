//! Robots cache: host → parsed policy + next-earliest-request timestamp,
//! capped by host count.

use crate::robots::RobotsPolicy;
use chrono::{DateTime, Utc};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::Duration;

/// One entry in the robots cache.
#[derive(Debug, Clone)]
pub struct RobotsCacheEntry {
    /// Parsed policy; `None` when the fetch failed or the file was missing
    /// (treated as default-allow per ).
    pub policy: Option<RobotsPolicy>,
    /// Earliest timestamp at which this host may be contacted again, updated
    /// after each request when a `Crawl-delay` is declared.
    pub next_allowed_at: DateTime<Utc>,
    /// When this entry was inserted.
    pub inserted_at: DateTime<Utc>,
    /// How long this entry stays fresh after `inserted_at`.
    pub ttl: Duration,
}

/// Count-capped LRU cache of per-host robots policies.
pub struct RobotsCache {
    inner: LruCache<String, RobotsCacheEntry>,
}

impl RobotsCache {
    /// Create a cache capped at `host_count_cap` hosts (default 500).
    #[must_use]
    pub fn new(host_count_cap: usize) -> Self {
        Self {
            inner: LruCache::new(NonZeroUsize::new(host_count_cap.max(1)).expect("nonzero")),
        }
    }

    /// Look up a fresh entry for `host`.
    pub fn get(&mut self, host: &str, now: DateTime<Utc>) -> Option<&RobotsCacheEntry> {
        let expired = self
            .inner
            .peek(host)
            .is_some_and(|e| super::is_expired(e.inserted_at, e.ttl, now));
        if expired {
            self.inner.pop(host);
            return None;
        }
        self.inner.get(host)
    }

    /// Insert or replace a host's policy entry.
    pub fn put(&mut self, host: String, entry: RobotsCacheEntry) {
        self.inner.put(host, entry);
    }

    /// Update only `next_allowed_at` for a host already in the cache, used
    /// after `Crawl-delay` scheduling. No-op if the host isn't cached.
    pub fn set_next_allowed_at(&mut self, host: &str, next_allowed_at: DateTime<Utc>) {
        if let Some(entry) = self.inner.get_mut(host) {
            entry.next_allowed_at = next_allowed_at;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_cap_evicts_lru() {
        let mut cache = RobotsCache::new(1);
        cache.put(
            "a.example".to_string(),
            RobotsCacheEntry {
                policy: None,
                next_allowed_at: Utc::now(),
                inserted_at: Utc::now(),
                ttl: Duration::from_secs(3600),
            },
        );
        cache.put(
            "b.example".to_string(),
            RobotsCacheEntry {
                policy: None,
                next_allowed_at: Utc::now(),
                inserted_at: Utc::now(),
                ttl: Duration::from_secs(3600),
            },
        );
        assert!(cache.get("a.example", Utc::now()).is_none());
        assert!(cache.get("b.example", Utc::now()).is_some());
    }

    #[test]
    fn next_allowed_at_updates_in_place() {
        let mut cache = RobotsCache::new(10);
        let now = Utc::now();
        cache.put(
            "a.example".to_string(),
            RobotsCacheEntry {
                policy: None,
                next_allowed_at: now,
                inserted_at: now,
                ttl: Duration::from_secs(3600),
            },
        );
        let later = now + chrono::Duration::seconds(5);
        cache.set_next_allowed_at("a.example", later);
        assert_eq!(cache.get("a.example", now).unwrap().next_allowed_at, later);
    }
}
