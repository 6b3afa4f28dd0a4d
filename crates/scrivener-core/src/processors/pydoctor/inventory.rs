//! Pydoctor `searchindex.json` (Lunr.js vector format) parsing and the
//! [`PydoctorInventoryProcessor`].

use crate::error::{Error, Result};
use crate::globals::Globals;
use crate::httpcache;
use crate::processors::ensure_trailing_slash;
use crate::registry::InventoryProcessor;
use crate::types::{DetectionInfo, InventoryObject, InventoryProcessorCapabilities, InventoryType, Specifics};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

/// Pydoctor `searchindex.json` inventory processor.
pub struct PydoctorInventoryProcessor;

#[derive(Debug, Deserialize)]
struct IndexEntry {
    qname: Option<String>,
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

const INDEX_PATH: &str = "searchindex.json";

#[async_trait]
impl InventoryProcessor for PydoctorInventoryProcessor {
    fn name(&self) -> &'static str {
        "pydoctor"
    }

    async fn detect(&self, globals: &Globals, location: &str) -> Result<Option<DetectionInfo>> {
        let base = ensure_trailing_slash(location);
        let url = format!("{base}{INDEX_PATH}");
        let Ok(body) = httpcache::retrieve_text(globals, &url, "utf-8").await else {
            return Ok(None);
        };
        let entries = parse_entries(&body);
        if entries.is_empty() {
            return Ok(None);
        }
        Ok(Some(DetectionInfo {
            processor_name: self.name().to_string(),
            confidence: 0.9,
            base_url: base,
            metadata: serde_json::json!({ "entry_count": entries.len() }),
        }))
    }

    fn capabilities(&self) -> InventoryProcessorCapabilities {
        InventoryProcessorCapabilities {
            supported_inventory_types: vec![InventoryType::PydoctorSearchIndex],
            supported_filters: vec!["kind".to_string()],
            recommended_confidence_threshold: 0.9,
        }
    }

    async fn filter_inventory(
        &self,
        globals: &Globals,
        detection: &DetectionInfo,
        filters: &HashMap<String, String>,
    ) -> Result<Vec<InventoryObject>> {
        let url = format!("{}{INDEX_PATH}", detection.base_url);
        let body = httpcache::retrieve_text(globals, &url, "utf-8")
            .await
            .map_err(|e| Error::InventoryInaccessibility { source: url.clone(), cause: e.to_string() })?;
        let entries = parse_entries(&body);
        if entries.is_empty() {
            return Err(Error::InventoryInvalidity { source: url, reason: "no qname/name entries found".to_string() });
        }
        let objects = entries.into_iter().map(|e| to_inventory_object(e, &detection.base_url)).collect();
        Ok(apply_filters(objects, filters))
    }
}

fn parse_entries(body: &str) -> Vec<IndexEntry> {
    if let Ok(entries) = serde_json::from_str::<Vec<IndexEntry>>(body) {
        return entries.into_iter().filter(|e| e.qname.is_some() || e.name.is_some()).collect();
    }
    #[derive(Deserialize)]
    struct Wrapped {
        #[serde(default)]
        names: Vec<IndexEntry>,
    }
    serde_json::from_str::<Wrapped>(body)
        .map(|w| w.names.into_iter().filter(|e| e.qname.is_some() || e.name.is_some()).collect())
        .unwrap_or_default()
}

fn to_inventory_object(entry: IndexEntry, base_url: &str) -> InventoryObject {
    let qname = entry.qname.or(entry.name).unwrap_or_default();
    let kind = entry.kind.unwrap_or_else(|| infer_kind(&qname).to_string());
    let uri = format!("{}.html", qname.replace('.', "/"));
    InventoryObject {
        name: qname.clone(),
        uri,
        inventory_type: InventoryType::PydoctorSearchIndex,
        location_url: base_url.to_string(),
        specifics: Specifics::Pydoctor { qname, kind },
    }
}

/// Infer `module`/`class`/`function` from a qualified name's shape: `Capitalized`
/// final segments are classes, dotted lowercase segments are functions,
/// undotted names are modules.
fn infer_kind(qname: &str) -> &'static str {
    let last = qname.rsplit('.').next().unwrap_or(qname);
    if last.chars().next().is_some_and(char::is_uppercase) {
        "class"
    } else if qname.contains('.') {
        "function"
    } else {
        "module"
    }
}

fn apply_filters(objects: Vec<InventoryObject>, filters: &HashMap<String, String>) -> Vec<InventoryObject> {
    if filters.is_empty() {
        return objects;
    }
    objects
        .into_iter()
        .filter(|object| {
            let Specifics::Pydoctor { kind, .. } = &object.specifics else { return true };
            filters.get("kind").is_none_or(|value| kind.eq_ignore_ascii_case(value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_class_from_capitalized_segment() {
        assert_eq!(infer_kind("pkg.module.Repo"), "class");
    }

    #[test]
    fn infers_function_from_dotted_lowercase() {
        assert_eq!(infer_kind("pkg.module.open"), "function");
    }

    #[test]
    fn infers_module_from_undotted_name() {
        assert_eq!(infer_kind("pkg"), "module");
    }

    #[test]
    fn parses_flat_array_format() {
        let body = r#"[{"qname": "pkg.Repo", "type": "class"}, {"qname": "pkg.open"}]"#;
        let entries = parse_entries(body);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn parses_wrapped_names_format() {
        let body = r#"{"names": [{"name": "pkg.Repo"}]}"#;
        let entries = parse_entries(body);
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn filters_by_kind() {
        let objects = vec![
            to_inventory_object(IndexEntry { qname: Some("pkg.Repo".to_string()), name: None, kind: Some("class".to_string()) }, "https://example.com/"),
            to_inventory_object(IndexEntry { qname: Some("pkg.open".to_string()), name: None, kind: Some("function".to_string()) }, "https://example.com/"),
        ];
        let mut filters = HashMap::new();
        filters.insert("kind".to_string(), "class".to_string());
        let filtered = apply_filters(objects, &filters);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "pkg.Repo");
    }
}
