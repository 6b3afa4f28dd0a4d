//! Detection orchestrator: `determine_processor_optimal` picks the
//! best-qualified processor for a location, falling back to a fixed list of
//! version-path URL patterns when nothing qualifies at the bare location.
//!
//! The same algorithm drives both genera; only which registry (`inventory`
//! vs. `structure`) is consulted differs.

use crate::error::{Error, Result};
use crate::globals::Globals;
use crate::types::{Detection, DetectionInfo};
use chrono::Utc;
use std::collections::HashMap;

/// Which processor registry to consult.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Genus {
    /// Inventory processors (`InventoryProcessor::detect`).
    Inventory,
    /// Structure processors (`StructureProcessor::detect`).
    Structure,
}

impl Genus {
    /// String form used in error messages and `DetectResult`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inventory => "inventory",
            Self::Structure => "structure",
        }
    }
}

/// Select the best-qualified processor for `location` under `genus`,
/// applying the redirects cache, the detections cache, and — if nothing
/// qualifies at the bare location — the URL-pattern fallback list.
///
/// # Errors
///
/// Returns [`Error::ProcessorInavailability`] if every processor of `genus`
/// reports zero or sub-threshold confidence for `location` and every
/// pattern-fallback variant.
#[tracing::instrument(skip_all, fields(location = %location, genus = genus.as_str()))]
pub async fn determine_processor_optimal(globals: &Globals, location: &str, genus: Genus) -> Result<Detection> {
    let canonical = canonicalize(location);
    let working = {
        let cache = globals.detections_cache.lock().unwrap();
        cache.resolve_redirect(&canonical).to_string()
    };

    if let Some(detection) = cached_selection(globals, &working, genus) {
        return Ok(detection);
    }

    if let Some(detection) = detect_and_select(globals, &working, genus).await? {
        return Ok(detection);
    }

    let origin_and_path = working.trim_end_matches('/');
    let mut attempted = Vec::new();
    for suffix in &globals.config.detection.url_pattern_fallbacks.clone() {
        let candidate = canonicalize(&format!("{origin_and_path}{suffix}"));
        attempted.push(candidate.clone());
        if let Some(detection) = detect_and_select(globals, &candidate, genus).await? {
            globals.detections_cache.lock().unwrap().record_redirect(canonical.clone(), candidate);
            return Ok(detection);
        }
    }

    Err(Error::ProcessorInavailability {
        source: canonical,
        genus: genus.as_str().to_string(),
        url_patterns_attempted: attempted,
    })
}

/// Strip a trailing `index.html` and run the result through `url::Url` for
/// scheme/host normalization; falls back to the trimmed string if the
/// location does not parse as an absolute URL (e.g. `file://` paths without
/// a host).
fn canonicalize(location: &str) -> String {
    let trimmed = location.strip_suffix("index.html").unwrap_or(location);
    url::Url::parse(trimmed).map_or_else(|_| trimmed.to_string(), |url| url.to_string())
}

/// Step 3: a fresh detections-cache entry exists — select by max confidence
/// `> 0` (no threshold check) among entries of `genus`, tied-broken by
/// registration order.
fn cached_selection(globals: &Globals, location: &str, genus: Genus) -> Option<Detection> {
    let now = Utc::now();
    let cache = globals.detections_cache.lock().unwrap();
    let detections = cache.get(location, now)?;
    select_max(globals, detections, genus, 0.0)
}

/// Steps 4–5: run every processor of `genus` concurrently, merge the result
/// into the cached map for `location` (keyed by genus-prefixed processor
/// name so inventory and structure entries never collide — both genera
/// share one cache entry per location), then select by max confidence
/// `>= threshold`.
async fn detect_and_select(globals: &Globals, location: &str, genus: Genus) -> Result<Option<Detection>> {
    let fresh = run_all_detects(globals, location, genus).await;
    {
        let mut cache = globals.detections_cache.lock().unwrap();
        let mut merged = cache.get(location, Utc::now()).cloned().unwrap_or_default();
        merged.extend(fresh.clone());
        cache.put(location.to_string(), merged, Utc::now(), globals.config.cache.detections_ttl());
    }
    Ok(select_max(globals, &fresh, genus, globals.config.detection.confidence_threshold))
}

/// Cache keys are namespaced by genus so the same processor name registered
/// under both `InventoryProcessor` and `StructureProcessor` never collides
/// in the shared per-location detections map.
fn cache_key(genus: Genus, name: &str) -> String {
    format!("{}:{name}", genus.as_str())
}

async fn run_all_detects(globals: &Globals, location: &str, genus: Genus) -> HashMap<String, Detection> {
    let mut map = HashMap::new();
    match genus {
        Genus::Inventory => {
            let names: Vec<String> = globals.registry.inventory_processor_names().into_iter().map(str::to_string).collect();
            let futures = names.iter().map(|name| {
                let processor = globals.registry.inventory_get(name).expect("name came from this registry").clone();
                async move { processor.detect(globals, location).await }
            });
            let results = futures::future::join_all(futures).await;
            for (name, result) in names.into_iter().zip(results) {
                match result {
                    Ok(Some(info)) => {
                        map.insert(cache_key(genus, &name), Detection::Inventory(info));
                    },
                    Ok(None) => {},
                    Err(error) => tracing::warn!(processor = %name, %error, "inventory detect failed"),
                }
            }
        },
        Genus::Structure => {
            let names: Vec<String> = globals.registry.structure_processor_names().into_iter().map(str::to_string).collect();
            let futures = names.iter().map(|name| {
                let processor = globals.registry.structure_get(name).expect("name came from this registry").clone();
                async move { processor.detect(globals, location).await }
            });
            let results = futures::future::join_all(futures).await;
            for (name, result) in names.into_iter().zip(results) {
                match result {
                    Ok(Some(info)) => {
                        map.insert(cache_key(genus, &name), Detection::Structure(info));
                    },
                    Ok(None) => {},
                    Err(error) => tracing::warn!(processor = %name, %error, "structure detect failed"),
                }
            }
        },
    }
    map
}

fn select_max(
    globals: &Globals,
    detections: &HashMap<String, Detection>,
    genus: Genus,
    min_confidence: f64,
) -> Option<Detection> {
    let names = match genus {
        Genus::Inventory => globals.registry.inventory_processor_names(),
        Genus::Structure => globals.registry.structure_processor_names(),
    };
    let mut best: Option<&Detection> = None;
    for name in names {
        let Some(detection) = detections.get(&cache_key(genus, name)) else { continue };
        if detection.confidence() <= 0.0 || detection.confidence() < min_confidence {
            continue;
        }
        if best.is_none_or(|b| detection.confidence() > b.confidence()) {
            best = Some(detection);
        }
    }
    best.cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::registry::{InventoryProcessor, StructureProcessor};
    use crate::types::{ContentDocument, InventoryObject, InventoryProcessorCapabilities, StructureProcessorCapabilities};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct FixedConfidence {
        name: &'static str,
        confidence: f64,
    }

    #[async_trait]
    impl InventoryProcessor for FixedConfidence {
        fn name(&self) -> &'static str {
            self.name
        }
        async fn detect(&self, _: &Globals, location: &str) -> Result<Option<DetectionInfo>> {
            if self.confidence <= 0.0 {
                return Ok(None);
            }
            Ok(Some(DetectionInfo {
                processor_name: self.name.to_string(),
                confidence: self.confidence,
                base_url: location.to_string(),
                metadata: serde_json::json!({}),
            }))
        }
        fn capabilities(&self) -> InventoryProcessorCapabilities {
            InventoryProcessorCapabilities {
                supported_inventory_types: vec![],
                supported_filters: vec![],
                recommended_confidence_threshold: 0.5,
            }
        }
        async fn filter_inventory(&self, _: &Globals, _: &DetectionInfo, _: &HashMap<String, String>) -> Result<Vec<crate::types::InventoryObject>> {
            Ok(vec![])
        }
    }

    #[async_trait]
    impl StructureProcessor for FixedConfidence {
        fn name(&self) -> &'static str {
            self.name
        }
        async fn detect(&self, _: &Globals, location: &str) -> Result<Option<DetectionInfo>> {
            if self.confidence <= 0.0 {
                return Ok(None);
            }
            Ok(Some(DetectionInfo {
                processor_name: self.name.to_string(),
                confidence: self.confidence,
                base_url: location.to_string(),
                metadata: serde_json::json!({}),
            }))
        }
        fn capabilities(&self) -> StructureProcessorCapabilities {
            StructureProcessorCapabilities {
                supported_inventory_types: vec![],
                content_extraction_features: vec![],
                confidence_by_inventory_type: vec![],
            }
        }
        async fn extract_contents(&self, _: &Globals, _: &DetectionInfo, objects: &[InventoryObject], _: usize) -> Vec<Option<ContentDocument>> {
            objects.iter().map(|_| None).collect()
        }
    }

    fn globals_with(processors: Vec<(&'static str, f64)>) -> Globals {
        let mut globals = Globals::new(EngineConfig::default()).unwrap();
        for (name, confidence) in processors {
            globals.registry.register_inventory(name, Arc::new(FixedConfidence { name, confidence }));
        }
        globals
    }

    #[tokio::test]
    async fn selects_highest_confidence_above_threshold() {
        let globals = globals_with(vec![("a", 0.4), ("b", 0.9)]);
        let detection = determine_processor_optimal(&globals, "https://example.com/docs", Genus::Inventory)
            .await
            .unwrap();
        assert_eq!(detection.processor_name(), "b");
    }

    #[tokio::test]
    async fn tie_break_prefers_registration_order() {
        let globals = globals_with(vec![("first", 0.8), ("second", 0.8)]);
        let detection = determine_processor_optimal(&globals, "https://example.com/docs", Genus::Inventory)
            .await
            .unwrap();
        assert_eq!(detection.processor_name(), "first");
    }

    #[tokio::test]
    async fn falls_back_to_url_patterns_when_below_threshold() {
        let globals = globals_with(vec![("weak", 0.2)]);
        let result = determine_processor_optimal(&globals, "https://example.com/docs", Genus::Inventory).await;
        assert!(result.is_err());
        if let Err(Error::ProcessorInavailability { url_patterns_attempted, .. }) = result {
            assert_eq!(url_patterns_attempted.len(), globals.config.detection.url_pattern_fallbacks.len());
        } else {
            panic!("expected ProcessorInavailability");
        }
    }

    #[test]
    fn canonicalize_strips_trailing_index_html() {
        assert_eq!(canonicalize("https://example.com/docs/index.html"), "https://example.com/docs/");
    }

    #[tokio::test]
    async fn a_warm_inventory_cache_entry_does_not_leak_into_a_structure_lookup() {
        let mut globals = Globals::new(EngineConfig::default()).unwrap();
        globals.registry.register_inventory("inv-proc", Arc::new(FixedConfidence { name: "inv-proc", confidence: 0.9 }));
        globals.registry.register_structure("struct-proc", Arc::new(FixedConfidence { name: "struct-proc", confidence: 0.9 }));
        let location = "https://example.com/docs";

        let inventory = determine_processor_optimal(&globals, location, Genus::Inventory).await.unwrap();
        assert_eq!(inventory.processor_name(), "inv-proc");

        let structure = determine_processor_optimal(&globals, location, Genus::Structure).await.unwrap();
        assert_eq!(structure.processor_name(), "struct-proc");
        assert!(matches!(structure, Detection::Structure(_)));
    }
}
