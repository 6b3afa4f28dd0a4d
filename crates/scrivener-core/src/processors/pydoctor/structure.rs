//! Pydoctor HTML structure processor: signature from
//! `code.moduleName`/`code.classQualifiedName`/`div.functionHeader code`,
//! description from `div.docstring`.

use crate::content_id;
use crate::error::Result;
use crate::globals::Globals;
use crate::httpcache;
use crate::markdown;
use crate::processors::ensure_trailing_slash;
use crate::registry::StructureProcessor;
use crate::types::{ContentDocument, DetectionInfo, InventoryObject, InventoryType, StructureProcessorCapabilities};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use scraper::{Html, Selector};

/// Pydoctor HTML structure processor.
pub struct PydoctorStructureProcessor;

const SIGNATURE_SELECTORS: [&str; 3] = ["code.moduleName", "code.classQualifiedName", "div.functionHeader code"];

#[async_trait]
impl StructureProcessor for PydoctorStructureProcessor {
    fn name(&self) -> &'static str {
        "pydoctor"
    }

    async fn detect(&self, globals: &Globals, location: &str) -> Result<Option<DetectionInfo>> {
        let base = ensure_trailing_slash(location);
        let index_url = format!("{base}index.html");
        let Ok(html) = httpcache::retrieve_text(globals, &index_url, "utf-8").await else {
            return Ok(None);
        };
        let document = Html::parse_document(&html);
        let has_meta = generator_meta(&document).is_some_and(|g| g.to_lowercase().contains("pydoctor"));
        let has_css = html.contains("apidocs.css");
        let has_structure = has_selector(&document, "div.page") && has_selector(&document, "nav.navbar");

        let confidence = if has_meta {
            0.9
        } else if has_css && has_structure {
            0.7
        } else {
            return Ok(None);
        };

        Ok(Some(DetectionInfo {
            processor_name: self.name().to_string(),
            confidence,
            base_url: base,
            metadata: serde_json::json!({}),
        }))
    }

    fn capabilities(&self) -> StructureProcessorCapabilities {
        StructureProcessorCapabilities {
            supported_inventory_types: vec![InventoryType::PydoctorSearchIndex],
            content_extraction_features: vec!["signatures".to_string(), "descriptions".to_string()],
            confidence_by_inventory_type: vec![(InventoryType::PydoctorSearchIndex, 0.9)],
        }
    }

    async fn extract_contents(
        &self,
        globals: &Globals,
        _detection: &DetectionInfo,
        objects: &[InventoryObject],
        concurrency: usize,
    ) -> Vec<Option<ContentDocument>> {
        let concurrency = concurrency.max(1);
        let mut results: Vec<(usize, Option<ContentDocument>)> = stream::iter(objects.iter().enumerate())
            .map(|(index, object)| async move { (index, extract_one(globals, object).await) })
            .buffer_unordered(concurrency)
            .collect()
            .await;
        results.sort_by_key(|(index, _)| *index);

        let mut out = vec![None; objects.len()];
        for (index, document) in results {
            out[index] = document;
        }
        out
    }
}

async fn extract_one(globals: &Globals, object: &InventoryObject) -> Option<ContentDocument> {
    let page_url = object.resolved_uri();
    let html = match httpcache::retrieve_text(globals, &page_url, "utf-8").await {
        Ok(html) => html,
        Err(error) => {
            tracing::warn!(url = %page_url, %error, "pydoctor: page fetch failed, dropping object");
            return None;
        },
    };
    let document = Html::parse_document(&html);
    let signature = extract_signature(&document)?;
    let description_html = extract_docstring(&document).unwrap_or_default();

    Some(ContentDocument {
        content_id: content_id::encode(&object.location_url, &object.name),
        inventory_object: object.clone(),
        signature,
        description: markdown::html_to_markdown(&description_html),
        documentation_url: page_url,
    })
}

fn extract_signature(document: &Html) -> Option<String> {
    SIGNATURE_SELECTORS.iter().find_map(|selector_text| {
        let selector = Selector::parse(selector_text).ok()?;
        let text = document.select(&selector).next()?.text().collect::<String>();
        let text = text.trim();
        (!text.is_empty()).then(|| text.to_string())
    })
}

fn extract_docstring(document: &Html) -> Option<String> {
    let selector = Selector::parse("div.docstring").ok()?;
    document.select(&selector).next().map(|e| e.inner_html())
}

fn generator_meta(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"meta[name="generator"]"#).ok()?;
    document.select(&selector).next()?.value().attr("content").map(str::to_string)
}

fn has_selector(document: &Html, selector_text: &str) -> bool {
    Selector::parse(selector_text).is_ok_and(|selector| document.select(&selector).next().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_prefers_module_name_then_class_then_function() {
        let html = r#"<code class="classQualifiedName">pkg.Repo</code>"#;
        let document = Html::parse_document(html);
        assert_eq!(extract_signature(&document).as_deref(), Some("pkg.Repo"));
    }

    #[test]
    fn docstring_is_extracted_as_inner_html() {
        let html = r#"<div class="docstring"><p>Opens a repo.</p></div>"#;
        let document = Html::parse_document(html);
        assert!(extract_docstring(&document).unwrap().contains("Opens a repo"));
    }

    #[test]
    fn function_header_signature_is_found() {
        let html = r#"<div class="functionHeader">def <code>open(path)</code></div>"#;
        let document = Html::parse_document(html);
        assert_eq!(extract_signature(&document).as_deref(), Some("open(path)"));
    }
}
