//! Query functions: the five operations every front end calls —
//! `query_inventory`, `query_content`, `summarize_inventory`, `detect`, and
//! `survey_processors`. Each wires together the orchestrator, a processor's
//! `filter_inventory`/`extract_contents`, and the search engine.

use crate::error::{Error, Result};
use crate::globals::Globals;
use crate::orchestrator::{self, Genus};
use crate::result::{
    ContentQueryResult, DetectResult, GroupSummary, InventoryQueryResult, ProcessorSurvey,
    SearchMetadata, SummarizeInventoryResult, SurveyProcessorsResult,
};
use crate::search::{self, SearchMode, SearchOptions};
use crate::types::{ContentDocument, Detection, InventoryObject, SearchResult, Specifics};
use std::collections::HashMap;

/// Controls how much implementation detail a rendered result reveals;
/// plumbed through to [`crate::result::Renderable::render_as_markdown`]'s
/// `reveal_internals` flag. CLI surfaces this as `--details documentation|full`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailLevel {
    /// Hide processor/cache internals (the default view).
    Documentation,
    /// Reveal processor names, raw metadata, and search diagnostics.
    Full,
}

impl DetailLevel {
    /// Maps onto [`crate::result::Renderable::render_as_markdown`]'s
    /// `reveal_internals` flag.
    #[must_use]
    pub const fn reveal_internals(self) -> bool {
        matches!(self, Self::Full)
    }
}

/// Detect the inventory processor for `location`, filter its objects, and
/// rank them against `term`.
///
/// # Errors
///
/// Returns [`Error::ProcessorInavailability`] if no inventory processor
/// qualifies, or [`Error::InventoryInaccessibility`]/[`Error::InventoryInvalidity`]
/// if the qualified processor's fetch or parse fails.
#[tracing::instrument(skip_all, fields(location = %location, term = %term, results_max))]
pub async fn query_inventory(
    globals: &Globals,
    location: &str,
    term: &str,
    filters: &HashMap<String, String>,
    mode: SearchMode,
    results_max: usize,
) -> Result<InventoryQueryResult> {
    let detection = orchestrator::determine_processor_optimal(globals, location, Genus::Inventory).await?;
    let objects = filter_inventory(globals, &detection, filters).await?;

    let options = SearchOptions {
        mode,
        results_max,
        ..SearchOptions::default()
    };
    let candidates_considered = objects.len();
    let results = search::search(&objects, term, &options);

    Ok(InventoryQueryResult {
        location: detection.base_url().to_string(),
        term: term.to_string(),
        objects: results,
        search_metadata: SearchMetadata {
            mode: mode_label(&options.mode),
            threshold: match options.mode {
                SearchMode::Similar { threshold } => threshold,
                _ => 100.0,
            },
            candidates_considered,
        },
    })
}

/// Run inventory detection + search, then extract content for either the
/// single object named by `content_id` or the top `results_max * 3`
/// candidates, bounded to `results_max` successful extractions.
///
/// # Errors
///
/// Returns [`Error::ProcessorInavailability`] if no inventory or structure
/// processor qualifies for `location`, or [`Error::Other`] if `content_id` is
/// supplied but does not decode, or decodes to a location that does not
/// match the detected inventory's working URL.
#[allow(clippy::too_many_arguments)]
#[tracing::instrument(skip_all, fields(location = %location, term = %term, content_id = ?content_id))]
pub async fn query_content(
    globals: &Globals,
    location: &str,
    term: &str,
    filters: &HashMap<String, String>,
    results_max: usize,
    lines_max: usize,
    content_id: Option<&str>,
) -> Result<ContentQueryResult> {
    let inventory = if content_id.is_some() {
        // A content_id names one exact object; search the full unranked
        // inventory rather than the term-ranked top-N so it's never missed.
        query_inventory(globals, location, "", filters, SearchMode::Similar { threshold: 0.0 }, usize::MAX).await?
    } else {
        query_inventory(
            globals,
            location,
            term,
            filters,
            SearchMode::Similar { threshold: 50.0 },
            results_max.saturating_mul(3).max(1),
        )
        .await?
    };

    let candidates: Vec<InventoryObject> = if let Some(content_id) = content_id {
        let (decoded_location, decoded_name) = crate::content_id::decode(content_id)?;
        let object = inventory
            .objects
            .iter()
            .map(|r| &r.object)
            .find(|o| o.name == decoded_name && o.location_url == decoded_location)
            .ok_or_else(|| Error::Other(format!("content_id does not match any object at {location}")))?
            .clone();
        vec![object]
    } else {
        inventory
            .objects
            .iter()
            .take(results_max.saturating_mul(3).max(1))
            .map(|r| r.object.clone())
            .collect()
    };

    let structure_detection = orchestrator::determine_processor_optimal(globals, &inventory.location, Genus::Structure).await?;
    let processor = globals
        .registry
        .structure_get(structure_detection.processor_name())
        .ok_or_else(|| Error::Other(format!("structure processor {} not registered", structure_detection.processor_name())))?;

    let extracted = processor
        .extract_contents(globals, structure_detection.info(), &candidates, globals.config.fetch.max_concurrent_extractions)
        .await;

    let mut documents: Vec<ContentDocument> = Vec::new();
    let mut omitted = 0usize;
    for document in extracted.into_iter().flatten() {
        if documents.len() >= results_max {
            break;
        }
        documents.push(truncate_description(document, lines_max));
    }
    omitted += candidates.len().saturating_sub(documents.len());

    Ok(ContentQueryResult {
        location: inventory.location,
        term: content_id.map_or_else(|| term.to_string(), |_| String::new()),
        documents,
        omitted,
    })
}

fn truncate_description(mut document: ContentDocument, lines_max: usize) -> ContentDocument {
    if lines_max > 0 {
        let truncated: Vec<&str> = document.description.lines().take(lines_max).collect();
        document.description = truncated.join("\n");
    }
    document
}

/// Run an inventory query and, if `group_by` names a specifics field,
/// produce per-group counts; otherwise a single total.
///
/// # Errors
///
/// Same as [`query_inventory`].
#[tracing::instrument(skip_all, fields(location = %location, term = ?term, group_by = ?group_by))]
pub async fn summarize_inventory(
    globals: &Globals,
    location: &str,
    term: Option<&str>,
    filters: &HashMap<String, String>,
    group_by: Option<&str>,
) -> Result<SummarizeInventoryResult> {
    let inventory = query_inventory(globals, location, term.unwrap_or(""), filters, SearchMode::Similar { threshold: 0.0 }, usize::MAX).await?;

    let total = inventory.objects.len();
    let groups = group_by.map_or_else(Vec::new, |field| {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        for result in &inventory.objects {
            let Some(key) = specifics_field(&result.object.specifics, field) else { continue };
            if !counts.contains_key(&key) {
                order.push(key.clone());
            }
            *counts.entry(key).or_insert(0) += 1;
        }
        order.into_iter().map(|group| GroupSummary { count: counts[&group], group }).collect()
    });

    Ok(SummarizeInventoryResult { location: inventory.location, total, groups })
}

/// Look up the named specifics field for grouping. Returns `None` for a
/// field name the object's variant doesn't carry.
fn specifics_field(specifics: &Specifics, field: &str) -> Option<String> {
    match specifics {
        Specifics::Sphinx { domain, role, priority, dispname, project, version } => match field {
            "domain" => Some(domain.clone()),
            "role" => Some(role.clone()),
            "priority" => Some(priority.to_string()),
            "dispname" => Some(dispname.clone()),
            "project" => Some(project.clone()),
            "version" => Some(version.clone()),
            _ => None,
        },
        Specifics::MkDocs { title, page_location, content_preview } => match field {
            "title" => Some(title.clone()),
            "page_location" => Some(page_location.clone()),
            "content_preview" => Some(content_preview.clone()),
            _ => None,
        },
        Specifics::Pydoctor { qname, kind } => match field {
            "qname" => Some(qname.clone()),
            "kind" | "type" => Some(kind.clone()),
            _ => None,
        },
    }
}

/// Expose both genera's current best detection for `location`, `None` where
/// no processor qualified (not an error — this is a diagnostic surface).
#[tracing::instrument(skip_all, fields(location = %location))]
pub async fn detect(globals: &Globals, location: &str) -> DetectResult {
    let inventory = orchestrator::determine_processor_optimal(globals, location, Genus::Inventory).await.ok();
    let structure = orchestrator::determine_processor_optimal(globals, location, Genus::Structure).await.ok();
    DetectResult { inventory, structure }
}

/// Report capabilities for every registered processor, or just `processor_name`
/// if given (present in either or both registries).
#[must_use]
pub fn survey_processors(globals: &Globals, processor_name: Option<&str>) -> SurveyProcessorsResult {
    let mut processors = Vec::new();

    for name in globals.registry.inventory_processor_names() {
        if processor_name.is_some_and(|filter| filter != name) {
            continue;
        }
        if let Some(processor) = globals.registry.inventory_get(name) {
            processors.push(ProcessorSurvey {
                name: name.to_string(),
                genus: Genus::Inventory.as_str().to_string(),
                inventory_capabilities: Some(processor.capabilities()),
                structure_capabilities: None,
            });
        }
    }

    for name in globals.registry.structure_processor_names() {
        if processor_name.is_some_and(|filter| filter != name) {
            continue;
        }
        if let Some(processor) = globals.registry.structure_get(name) {
            processors.push(ProcessorSurvey {
                name: name.to_string(),
                genus: Genus::Structure.as_str().to_string(),
                inventory_capabilities: None,
                structure_capabilities: Some(processor.capabilities()),
            });
        }
    }

    SurveyProcessorsResult { processors }
}

async fn filter_inventory(globals: &Globals, detection: &Detection, filters: &HashMap<String, String>) -> Result<Vec<InventoryObject>> {
    let processor = globals
        .registry
        .inventory_get(detection.processor_name())
        .ok_or_else(|| Error::Other(format!("inventory processor {} not registered", detection.processor_name())))?;
    processor.filter_inventory(globals, detection.info(), filters).await
}

fn mode_label(mode: &SearchMode) -> String {
    match mode {
        SearchMode::Exact => "exact".to_string(),
        SearchMode::Pattern(_) => "pattern".to_string(),
        SearchMode::Similar { .. } => "similar".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::globals::Globals;
    use crate::types::{DetectionInfo, InventoryProcessorCapabilities, InventoryType};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct FixedInventory;

    #[async_trait]
    impl crate::registry::InventoryProcessor for FixedInventory {
        fn name(&self) -> &'static str {
            "fixed"
        }
        async fn detect(&self, _: &Globals, location: &str) -> Result<Option<DetectionInfo>> {
            Ok(Some(DetectionInfo {
                processor_name: "fixed".to_string(),
                confidence: 1.0,
                base_url: location.to_string(),
                metadata: serde_json::json!({}),
            }))
        }
        fn capabilities(&self) -> InventoryProcessorCapabilities {
            InventoryProcessorCapabilities {
                supported_inventory_types: vec![InventoryType::SphinxObjectsInv],
                supported_filters: vec![],
                recommended_confidence_threshold: 0.5,
            }
        }
        async fn filter_inventory(&self, _: &Globals, detection: &DetectionInfo, _: &HashMap<String, String>) -> Result<Vec<InventoryObject>> {
            Ok(vec![InventoryObject {
                name: "dulwich.repo.Repo".to_string(),
                uri: "repo.html".to_string(),
                inventory_type: InventoryType::SphinxObjectsInv,
                location_url: detection.base_url.clone(),
                specifics: Specifics::Sphinx {
                    domain: "py".to_string(),
                    role: "class".to_string(),
                    priority: 1,
                    dispname: "dulwich.repo.Repo".to_string(),
                    project: "dulwich".to_string(),
                    version: "1.0".to_string(),
                },
            }])
        }
    }

    fn globals_with_fixed_inventory() -> Globals {
        let mut globals = Globals::new(EngineConfig::default()).unwrap();
        globals.registry.register_inventory("fixed", Arc::new(FixedInventory));
        globals
    }

    #[tokio::test]
    async fn query_inventory_returns_matching_object() {
        let globals = globals_with_fixed_inventory();
        let result = query_inventory(
            &globals,
            "https://example.com/",
            "repo",
            &HashMap::new(),
            SearchMode::Similar { threshold: 50.0 },
            10,
        )
        .await
        .unwrap();
        assert_eq!(result.objects.len(), 1);
        assert_eq!(result.objects[0].object.name, "dulwich.repo.Repo");
    }

    #[tokio::test]
    async fn summarize_inventory_groups_by_domain() {
        let globals = globals_with_fixed_inventory();
        let result = summarize_inventory(&globals, "https://example.com/", None, &HashMap::new(), Some("domain"))
            .await
            .unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].group, "py");
        assert_eq!(result.groups[0].count, 1);
    }

    #[tokio::test]
    async fn detect_returns_none_when_nothing_qualifies() {
        let globals = Globals::new(EngineConfig::default()).unwrap();
        let result = detect(&globals, "https://example.com/").await;
        assert!(result.inventory.is_none());
        assert!(result.structure.is_none());
    }

    #[test]
    fn survey_processors_filters_by_name() {
        let globals = globals_with_fixed_inventory();
        let result = survey_processors(&globals, Some("fixed"));
        assert_eq!(result.processors.len(), 1);
        assert_eq!(result.processors[0].name, "fixed");
        let result = survey_processors(&globals, Some("missing"));
        assert!(result.processors.is_empty());
    }

    #[test]
    fn specifics_field_returns_none_for_unknown_field() {
        let specifics = Specifics::Sphinx {
            domain: "py".to_string(),
            role: "class".to_string(),
            priority: 1,
            dispname: "x".to_string(),
            project: "p".to_string(),
            version: "1".to_string(),
        };
        assert_eq!(specifics_field(&specifics, "domain"), Some("py".to_string()));
        assert_eq!(specifics_field(&specifics, "nonexistent"), None);
    }
}
