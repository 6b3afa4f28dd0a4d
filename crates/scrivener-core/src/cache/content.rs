//! Content cache: URL → response bytes (or a negative marker), capped by
//! total memory bytes rather than entry count.

use chrono::{DateTime, Utc};
use lru::LruCache;
use std::num::NonZeroUsize;

/// One entry in the content cache.
#[derive(Debug, Clone)]
pub struct ContentCacheEntry {
    /// `Ok` holds the response body, content-type, and charset; `Err` holds
    /// the cached failure message (a negative result with the shorter
    /// error-ttl).
    pub outcome: Result<ContentBody, String>,
    /// Bytes charged against the memory cap for this entry (response length
    /// plus a fixed per-entry overhead).
    pub bytes_used: u64,
    /// When this entry was inserted.
    pub inserted_at: DateTime<Utc>,
    /// When this entry was last read; used for LRU ordering.
    pub last_access: DateTime<Utc>,
    /// How long this entry stays fresh after `inserted_at`.
    pub ttl: std::time::Duration,
}

/// A successfully retrieved response body.
#[derive(Debug, Clone)]
pub struct ContentBody {
    /// Raw response bytes.
    pub bytes: Vec<u8>,
    /// Content-Type header value, if present.
    pub content_type: Option<String>,
    /// Charset parsed out of Content-Type, defaulting to `utf-8`.
    pub charset: String,
}

/// Fixed per-entry bookkeeping overhead charged against the memory cap,
/// so a cache of many tiny entries can't evade the byte budget.
const ENTRY_OVERHEAD_BYTES: u64 = 128;

/// An `lru::LruCache` of [`ContentCacheEntry`] wrapped to additionally
/// enforce a total-bytes budget: insertion evicts least-recently-used
/// entries (invariant: insertion exactly at cap does not evict; one byte
/// over does) until the new entry fits, independent of `lru`'s own
/// entry-count capacity (set unbounded here since the byte budget is what
/// actually bounds the cache).
pub struct ContentCache {
    inner: LruCache<String, ContentCacheEntry>,
    memory_cap_bytes: u64,
    bytes_used: u64,
}

impl ContentCache {
    /// Create a cache with the given total memory budget.
    #[must_use]
    pub fn new(memory_cap_bytes: u64) -> Self {
        Self {
            // `lru` requires a nonzero count bound; pick something generous
            // since the byte budget is the real constraint.
            inner: LruCache::new(NonZeroUsize::new(1_000_000).expect("nonzero")),
            memory_cap_bytes,
            bytes_used: 0,
        }
    }

    /// Look up a fresh (non-expired) entry, marking it as just-accessed.
    pub fn get(&mut self, url: &str, now: DateTime<Utc>) -> Option<&ContentCacheEntry> {
        let expired = self
            .inner
            .peek(url)
            .is_some_and(|e| super::is_expired(e.inserted_at, e.ttl, now));
        if expired {
            self.remove(url);
            return None;
        }
        let entry = self.inner.get_mut(url)?;
        entry.last_access = now;
        Some(&*entry)
    }

    /// Insert or replace an entry, evicting least-recently-used entries
    /// until the new total fits the memory cap.
    pub fn put(&mut self, url: String, mut entry: ContentCacheEntry) {
        if let Some(old) = self.inner.peek(&url) {
            self.bytes_used = self.bytes_used.saturating_sub(old.bytes_used);
        }
        entry.bytes_used = entry.bytes_used.max(ENTRY_OVERHEAD_BYTES);
        while self.bytes_used + entry.bytes_used > self.memory_cap_bytes {
            match self.inner.pop_lru() {
                Some((_, evicted)) => {
                    self.bytes_used = self.bytes_used.saturating_sub(evicted.bytes_used);
                },
                None => break,
            }
        }
        self.bytes_used += entry.bytes_used;
        self.inner.put(url, entry);
    }

    /// Remove an entry (used when it is found expired on access).
    pub fn remove(&mut self, url: &str) {
        if let Some(removed) = self.inner.pop(url) {
            self.bytes_used = self.bytes_used.saturating_sub(removed.bytes_used);
        }
    }

    /// Total bytes currently charged against the memory cap.
    #[must_use]
    pub const fn bytes_used(&self) -> u64 {
        self.bytes_used
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;

    fn entry(bytes: u64) -> ContentCacheEntry {
        ContentCacheEntry {
            outcome: Ok(ContentBody {
                bytes: vec![0; bytes as usize],
                content_type: Some("text/plain".to_string()),
                charset: "utf-8".to_string(),
            }),
            bytes_used: bytes,
            inserted_at: Utc::now(),
            last_access: Utc::now(),
            ttl: Duration::from_secs(300),
        }
    }

    #[test]
    fn insertion_exactly_at_cap_does_not_evict() {
        let mut cache = ContentCache::new(200 + ENTRY_OVERHEAD_BYTES);
        cache.put("a".to_string(), entry(200));
        assert!(cache.get("a", Utc::now()).is_some());
    }

    #[test]
    fn one_byte_over_cap_evicts_lru() {
        let mut cache = ContentCache::new(200 + ENTRY_OVERHEAD_BYTES);
        cache.put("a".to_string(), entry(200));
        cache.put("b".to_string(), entry(201));
        assert!(cache.get("a", Utc::now()).is_none());
        assert!(cache.get("b", Utc::now()).is_some());
    }

    #[test]
    fn expired_entry_is_treated_as_absent() {
        let mut cache = ContentCache::new(10_000);
        let mut e = entry(10);
        e.inserted_at = Utc::now() - chrono::Duration::seconds(1000);
        e.ttl = Duration::from_secs(1);
        cache.put("a".to_string(), e);
        assert!(cache.get("a", Utc::now()).is_none());
    }

    #[test]
    fn total_bytes_never_exceeds_cap() {
        let mut cache = ContentCache::new(500);
        for i in 0..20 {
            cache.put(format!("url-{i}"), entry(50));
            assert!(cache.bytes_used() <= 500);
        }
    }
}
