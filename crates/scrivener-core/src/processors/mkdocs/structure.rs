//! MkDocs HTML structure processor: extracts page-level content from
//! `.md-content__inner`, or a matching `div.autodoc` block for mkdocstrings
//! API pages.

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
use scraper::{ElementRef, Html, Selector};

/// MkDocs HTML structure processor.
pub struct MkdocsStructureProcessor;

#[async_trait]
impl StructureProcessor for MkdocsStructureProcessor {
    fn name(&self) -> &'static str {
        "mkdocs"
    }

    async fn detect(&self, globals: &Globals, location: &str) -> Result<Option<DetectionInfo>> {
        let base = ensure_trailing_slash(location);
        let Ok(html) = httpcache::retrieve_text(globals, &base, "utf-8").await else {
            return Ok(None);
        };
        let document = Html::parse_document(&html);
        let generator = generator_meta(&document);
        let has_material_markers = html.contains("md-main") || html.contains("md-content");

        let confidence = if generator.as_deref().is_some_and(|g| g.to_lowercase().contains("mkdocs")) {
            0.9
        } else if has_material_markers {
            0.6
        } else {
            return Ok(None);
        };

        Ok(Some(DetectionInfo {
            processor_name: self.name().to_string(),
            confidence,
            base_url: base,
            metadata: serde_json::json!({ "theme": generator.unwrap_or_else(|| "material".to_string()) }),
        }))
    }

    fn capabilities(&self) -> StructureProcessorCapabilities {
        StructureProcessorCapabilities {
            supported_inventory_types: vec![InventoryType::MkdocsSearchIndex],
            content_extraction_features: vec!["signatures".to_string(), "descriptions".to_string(), "example_code".to_string()],
            confidence_by_inventory_type: vec![(InventoryType::MkdocsSearchIndex, 0.9)],
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
    let page_url = ensure_trailing_slash(&object.resolved_uri());
    let html = match httpcache::retrieve_text(globals, &page_url, "utf-8").await {
        Ok(html) => html,
        Err(error) => {
            tracing::warn!(url = %page_url, %error, "mkdocs: page fetch failed, dropping object");
            return None;
        },
    };
    let document = Html::parse_document(&html);
    let (signature, description_html) = extract_signature_and_body(&document, &object.name)?;

    Some(ContentDocument {
        content_id: content_id::encode(&object.location_url, &object.name),
        inventory_object: object.clone(),
        signature,
        description: markdown::html_to_markdown(&description_html),
        documentation_url: page_url,
    })
}

fn extract_signature_and_body(document: &Html, object_name: &str) -> Option<(String, String)> {
    if let Some(result) = extract_from_autodoc(document, object_name) {
        return Some(result);
    }
    extract_from_content_inner(document)
}

fn extract_from_autodoc(document: &Html, object_name: &str) -> Option<(String, String)> {
    let autodoc_selector = Selector::parse("div.autodoc").ok()?;
    let signature_selector = Selector::parse(".autodoc-signature").ok()?;
    let docstring_selector = Selector::parse(".autodoc-docstring").ok()?;

    document.select(&autodoc_selector).find_map(|block| {
        let signature_element = block.select(&signature_selector).next()?;
        let signature = signature_element.text().collect::<String>().trim().to_string();
        if !signature.contains(object_name) {
            return None;
        }
        let description_html = block.select(&docstring_selector).next().map(ElementRef::inner_html).unwrap_or_default();
        Some((signature, description_html))
    })
}

fn extract_from_content_inner(document: &Html) -> Option<(String, String)> {
    let content_selector = Selector::parse(".md-content__inner").ok()?;
    let heading_selector = Selector::parse("h1").ok()?;

    let content = document.select(&content_selector).next()?;
    let signature = document
        .select(&heading_selector)
        .next()
        .map_or_else(String::new, |h| h.text().collect::<String>().trim().to_string());

    let mut description_html = String::new();
    for child in content.children().filter_map(ElementRef::wrap) {
        let name = child.value().name();
        if name == "h2" {
            break;
        }
        if matches!(name, "nav" | "div") && is_navigational(child) {
            continue;
        }
        description_html.push_str(&child.html());
    }
    Some((signature, description_html))
}

fn is_navigational(element: ElementRef<'_>) -> bool {
    let name = element.value().name();
    let class = element.value().attr("class").unwrap_or_default();
    (name == "nav" && class.contains("md-nav")) || (name == "div" && class.contains("md-sidebar"))
}

fn generator_meta(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"meta[name="generator"]"#).ok()?;
    document.select(&selector).next()?.value().attr("content").map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_heading_and_body_up_to_first_h2() {
        let html = r#"
            <div class="md-content__inner">
                <h1>Usage</h1>
                <p>Intro paragraph.</p>
                <h2>Details</h2>
                <p>Ignored.</p>
            </div>"#;
        let document = Html::parse_document(html);
        let (signature, description) = extract_signature_and_body(&document, "").unwrap();
        assert_eq!(signature, "Usage");
        assert!(description.contains("Intro paragraph"));
        assert!(!description.contains("Ignored"));
    }

    #[test]
    fn skips_navigational_siblings() {
        let html = r#"
            <div class="md-content__inner">
                <h1>Usage</h1>
                <nav class="md-nav">skip</nav>
                <p>Kept.</p>
            </div>"#;
        let document = Html::parse_document(html);
        let (_, description) = extract_signature_and_body(&document, "").unwrap();
        assert!(!description.contains("skip"));
        assert!(description.contains("Kept"));
    }

    #[test]
    fn autodoc_block_matched_by_object_name() {
        let html = r#"
            <div class="autodoc">
                <div class="autodoc-signature">pkg.mod.func(a, b)</div>
                <div class="autodoc-docstring"><p>Does a thing.</p></div>
            </div>"#;
        let document = Html::parse_document(html);
        let (signature, description) = extract_signature_and_body(&document, "pkg.mod.func").unwrap();
        assert!(signature.contains("func"));
        assert!(description.contains("Does a thing"));
    }
}
