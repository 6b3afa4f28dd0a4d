//! Detections cache: normalized location URL → map of `processor_name →
//! Detection`, plus the redirects cache the orchestrator populates after a
//! successful URL-pattern fallback.

use crate::types::Detection;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

struct DetectionsCacheEntry {
    detections: HashMap<String, Detection>,
    inserted_at: DateTime<Utc>,
    ttl: Duration,
}

/// Holds both the detections cache and the redirects cache, since the
/// orchestrator always consults them together: redirects first to
/// rewrite the input location, then detections keyed by the (possibly
/// rewritten) canonical URL.
#[derive(Default)]
pub struct DetectionsCache {
    by_location: HashMap<String, DetectionsCacheEntry>,
    redirects: HashMap<String, String>,
}

impl DetectionsCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `location` through the redirects cache, if a working URL was
    /// previously recorded for it.
    #[must_use]
    pub fn resolve_redirect<'a>(&'a self, location: &'a str) -> &'a str {
        self.redirects
            .get(location)
            .map_or(location, std::string::String::as_str)
    }

    /// Record that `original` resolved to `working` via pattern extension or
    /// HTTP redirect.
    pub fn record_redirect(&mut self, original: String, working: String) {
        self.redirects.insert(original, working);
    }

    /// Look up a fresh set of per-processor detections for `location`.
    #[must_use]
    pub fn get(&self, location: &str, now: DateTime<Utc>) -> Option<&HashMap<String, Detection>> {
        let entry = self.by_location.get(location)?;
        if super::is_expired(entry.inserted_at, entry.ttl, now) {
            return None;
        }
        Some(&entry.detections)
    }

    /// Store the full per-processor detection map for `location`.
    pub fn put(
        &mut self,
        location: String,
        detections: HashMap<String, Detection>,
        inserted_at: DateTime<Utc>,
        ttl: Duration,
    ) {
        self.by_location.insert(
            location,
            DetectionsCacheEntry {
                detections,
                inserted_at,
                ttl,
            },
        );
    }
}
