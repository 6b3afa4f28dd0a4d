//! The three structured caches shared across every engine call, plus the
//! redirects/detections caches the orchestrator maintains.
//!
//! Every cache here is built on [`lru::LruCache`] rather than a hand-rolled
//! recency list. The content cache additionally enforces a byte budget on
//! top of `lru`'s entry-count ordering via [`content::ContentCache`].

mod content;
mod detections;
mod probe;
mod robots;

pub use content::{ContentCache, ContentCacheEntry};
pub use detections::DetectionsCache;
pub use probe::{ProbeCache, ProbeCacheEntry};
pub use robots::{RobotsCache, RobotsCacheEntry};

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Whether a cache entry's ttl has elapsed as of `now`.
#[must_use]
pub fn is_expired(inserted_at: DateTime<Utc>, ttl: Duration, now: DateTime<Utc>) -> bool {
    let elapsed = now.signed_duration_since(inserted_at);
    match chrono::Duration::from_std(ttl) {
        Ok(ttl) => elapsed >= ttl,
        Err(_) => false,
    }
}
