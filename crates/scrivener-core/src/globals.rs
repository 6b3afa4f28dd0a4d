//! Application-globals context: the single struct threaded through
//! every public engine call, holding both processor registries, the three
//! structured caches, the redirects/detections cache, and the shared
//! `reqwest::Client`.
//!
//! No `static`/`OnceLock` is used for mutable state; a caller constructs one
//! `Globals` (typically one per process) and passes `&Globals` (or
//! `Arc<Globals>`) into every query function.

use crate::cache::{ContentCache, DetectionsCache, ProbeCache, RobotsCache};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::registry::ProcessorRegistry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Everything an engine call needs: configuration, the shared HTTP client,
/// the processor registries, and every cache.
///
/// Caches are wrapped in `std::sync::Mutex` rather than `tokio::sync::Mutex`
/// because critical sections never hold the lock across an `.await` point —
/// lookups and inserts are synchronous; only the surrounding fetch is async.
pub struct Globals {
    /// Cache/robots/detection/fetch tuning.
    pub config: EngineConfig,
    /// Shared HTTP client used by `httpcache` for every outbound request.
    pub client: reqwest::Client,
    /// Registered inventory and structure processors.
    pub registry: ProcessorRegistry,
    /// Response-body cache, keyed by URL.
    pub content_cache: Mutex<ContentCache>,
    /// Existence-check cache, keyed by URL.
    pub probe_cache: Mutex<ProbeCache>,
    /// Per-host robots policy cache.
    pub robots_cache: Mutex<RobotsCache>,
    /// Per-location detection results plus the redirects cache.
    pub detections_cache: Mutex<DetectionsCache>,
    /// Per-URL request coalescing for `retrieve_bytes`/`retrieve_text`: at
    /// most one in-flight GET per URL, others wait on the `Notify`.
    pub(crate) content_inflight: Mutex<HashMap<String, Arc<Notify>>>,
    /// Per-URL request coalescing for `probe`.
    pub(crate) probe_inflight: Mutex<HashMap<String, Arc<Notify>>>,
}

impl Globals {
    /// Build a `Globals` from `config`, constructing the shared HTTP client
    /// and every cache at their configured sizes. Built-in processors are
    /// not registered here; see [`crate::builtin::register_all`].
    ///
    /// # Errors
    ///
    /// Returns an error if the `reqwest::Client` fails to build.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.fetch.user_agent.clone())
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(Error::Network)?;

        Ok(Self {
            content_cache: Mutex::new(ContentCache::new(config.cache.content_memory_cap_bytes)),
            probe_cache: Mutex::new(ProbeCache::new(config.cache.probe_count_cap)),
            robots_cache: Mutex::new(RobotsCache::new(config.robots.host_count_cap)),
            detections_cache: Mutex::new(DetectionsCache::new()),
            content_inflight: Mutex::new(HashMap::new()),
            probe_inflight: Mutex::new(HashMap::new()),
            registry: ProcessorRegistry::new(),
            client,
            config,
        })
    }

    /// Build a `Globals` with [`EngineConfig::default`] and every built-in
    /// processor registered — the entry point most front ends use.
    ///
    /// # Errors
    ///
    /// Returns an error if the `reqwest::Client` fails to build.
    pub fn with_builtins() -> Result<Self> {
        let mut globals = Self::new(EngineConfig::default())?;
        crate::builtin::register_all(&mut globals.registry);
        Ok(globals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_builds_with_default_config() {
        let globals = Globals::new(EngineConfig::default()).unwrap();
        assert_eq!(globals.config.cache.probe_count_cap, 1000);
    }

    #[test]
    fn with_builtins_registers_processors() {
        let globals = Globals::with_builtins().unwrap();
        assert!(globals.registry.inventory_processor_names().len() >= 3);
    }
}
