//! MkDocs `search_index.json` parsing and the [`MkdocsInventoryProcessor`].

use crate::error::{Error, Result};
use crate::globals::Globals;
use crate::httpcache;
use crate::processors::ensure_trailing_slash;
use crate::registry::InventoryProcessor;
use crate::types::{DetectionInfo, InventoryObject, InventoryProcessorCapabilities, InventoryType, Specifics};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

/// MkDocs `search_index.json` inventory processor.
pub struct MkdocsInventoryProcessor;

#[derive(Debug, Deserialize)]
struct SearchIndex {
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    location: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    text: String,
}

const CANDIDATE_PATHS: [&str; 2] = ["search/search_index.json", "search_index.json"];

#[async_trait]
impl InventoryProcessor for MkdocsInventoryProcessor {
    fn name(&self) -> &'static str {
        "mkdocs"
    }

    async fn detect(&self, globals: &Globals, location: &str) -> Result<Option<DetectionInfo>> {
        let base = ensure_trailing_slash(location);
        for candidate_path in CANDIDATE_PATHS {
            let url = format!("{base}{candidate_path}");
            let Ok(body) = httpcache::retrieve_text(globals, &url, "utf-8").await else {
                continue;
            };
            let Ok(index) = serde_json::from_str::<SearchIndex>(&body) else {
                continue;
            };
            if index.docs.is_empty() {
                continue;
            }
            return Ok(Some(DetectionInfo {
                processor_name: self.name().to_string(),
                confidence: index_confidence(&index),
                base_url: base,
                metadata: serde_json::json!({ "search_index_path": candidate_path, "doc_count": index.docs.len() }),
            }));
        }
        Ok(None)
    }

    fn capabilities(&self) -> InventoryProcessorCapabilities {
        InventoryProcessorCapabilities {
            supported_inventory_types: vec![InventoryType::MkdocsSearchIndex],
            supported_filters: vec!["title".to_string(), "uri".to_string()],
            recommended_confidence_threshold: 0.6,
        }
    }

    async fn filter_inventory(
        &self,
        globals: &Globals,
        detection: &DetectionInfo,
        filters: &HashMap<String, String>,
    ) -> Result<Vec<InventoryObject>> {
        let search_index_path = detection
            .metadata
            .get("search_index_path")
            .and_then(|v| v.as_str())
            .unwrap_or(CANDIDATE_PATHS[0]);
        let url = format!("{}{search_index_path}", detection.base_url);
        let body = httpcache::retrieve_text(globals, &url, "utf-8")
            .await
            .map_err(|e| Error::InventoryInaccessibility { source: url.clone(), cause: e.to_string() })?;
        let index: SearchIndex = serde_json::from_str(&body)
            .map_err(|e| Error::InventoryInvalidity { source: url.clone(), reason: e.to_string() })?;

        let objects = index
            .docs
            .into_iter()
            .map(|doc| to_inventory_object(doc, &detection.base_url))
            .collect();
        Ok(apply_filters(objects, filters))
    }
}

fn index_confidence(index: &SearchIndex) -> f64 {
    let total = index.docs.len().max(1) as f64;
    let complete = index.docs.iter().filter(|d| !d.title.is_empty() && !d.text.is_empty()).count() as f64;
    let completeness = complete / total;
    let count_factor = (index.docs.len() as f64 / 20.0).min(1.0);
    (0.6 + 0.2 * completeness + 0.1 * count_factor).min(0.9)
}

fn to_inventory_object(doc: SearchDoc, base_url: &str) -> InventoryObject {
    let preview: String = doc.text.chars().take(200).collect();
    InventoryObject {
        name: doc.title.clone(),
        uri: doc.location.clone(),
        inventory_type: InventoryType::MkdocsSearchIndex,
        location_url: base_url.to_string(),
        specifics: Specifics::MkDocs { title: doc.title, page_location: doc.location, content_preview: preview },
    }
}

fn apply_filters(objects: Vec<InventoryObject>, filters: &HashMap<String, String>) -> Vec<InventoryObject> {
    if filters.is_empty() {
        return objects;
    }
    objects
        .into_iter()
        .filter(|object| {
            filters.iter().all(|(key, value)| {
                let value = value.to_lowercase();
                match key.as_str() {
                    "title" => object.name.to_lowercase().contains(&value),
                    "uri" => object.uri.to_lowercase().contains(&value),
                    _ => true,
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> SearchIndex {
        SearchIndex {
            docs: vec![
                SearchDoc { location: "api/".to_string(), title: "API Reference".to_string(), text: "Full API docs.".to_string() },
                SearchDoc { location: "usage/".to_string(), title: "Usage".to_string(), text: "How to use it.".to_string() },
            ],
        }
    }

    #[test]
    fn confidence_rewards_complete_docs() {
        let confidence = index_confidence(&sample_index());
        assert!(confidence >= 0.6 && confidence <= 0.9);
    }

    #[test]
    fn filter_by_title_substring() {
        let objects: Vec<InventoryObject> =
            sample_index().docs.into_iter().map(|d| to_inventory_object(d, "https://example.com/")).collect();
        let mut filters = HashMap::new();
        filters.insert("title".to_string(), "api".to_string());
        let filtered = apply_filters(objects, &filters);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "API Reference");
    }

    #[test]
    fn content_preview_truncates_to_200_chars() {
        let long_text = "x".repeat(300);
        let doc = SearchDoc { location: "p/".to_string(), title: "P".to_string(), text: long_text };
        let object = to_inventory_object(doc, "https://example.com/");
        let Specifics::MkDocs { content_preview, .. } = object.specifics else { panic!("wrong variant") };
        assert_eq!(content_preview.chars().count(), 200);
    }
}
