//! Sphinx HTML structure processor: locates an object's anchor in its
//! rendered page and extracts a signature + Markdown description using one
//! of the `dt`/`section`/`span`-or-`a` strategies.

use crate::content_id;
use crate::error::Result;
use crate::globals::Globals;
use crate::httpcache;
use crate::markdown;
use crate::processors::{ensure_trailing_slash, split_anchor};
use crate::registry::StructureProcessor;
use crate::types::{ContentDocument, DetectionInfo, InventoryObject, InventoryType, StructureProcessorCapabilities};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use scraper::{ElementRef, Html, Selector};

/// Sphinx HTML structure processor.
pub struct SphinxStructureProcessor;

#[async_trait]
impl StructureProcessor for SphinxStructureProcessor {
    fn name(&self) -> &'static str {
        "sphinx"
    }

    async fn detect(&self, globals: &Globals, location: &str) -> Result<Option<DetectionInfo>> {
        let base = ensure_trailing_slash(location);
        let index_url = format!("{base}index.html");
        let Ok(html) = httpcache::retrieve_text(globals, &index_url, "utf-8").await else {
            return Ok(None);
        };
        let document = Html::parse_document(&html);
        let generator = generator_meta(&document);
        let has_pygments = html.contains("pygments.css");

        let confidence = if generator.as_deref().is_some_and(|g| g.to_lowercase().contains("sphinx")) {
            1.0
        } else if has_pygments {
            0.7
        } else {
            return Ok(None);
        };

        Ok(Some(DetectionInfo {
            processor_name: self.name().to_string(),
            confidence,
            base_url: base,
            metadata: serde_json::json!({ "theme": generator.unwrap_or_else(|| "unknown".to_string()) }),
        }))
    }

    fn capabilities(&self) -> StructureProcessorCapabilities {
        StructureProcessorCapabilities {
            supported_inventory_types: vec![InventoryType::SphinxObjectsInv],
            content_extraction_features: vec![
                "signatures".to_string(),
                "descriptions".to_string(),
                "parameter_docs".to_string(),
                "return_docs".to_string(),
                "example_code".to_string(),
                "cross_references".to_string(),
            ],
            confidence_by_inventory_type: vec![(InventoryType::SphinxObjectsInv, 1.0)],
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
    let resolved = object.resolved_uri();
    let (page_url, anchor) = split_anchor(&resolved);

    let html = match httpcache::retrieve_text(globals, &page_url, "utf-8").await {
        Ok(html) => html,
        Err(error) => {
            tracing::warn!(url = %page_url, %error, "sphinx: page fetch failed, dropping object");
            return None;
        },
    };
    let document = Html::parse_document(&html);
    let anchor = anchor?;
    let element = find_by_id(&document, &anchor)?;
    let (signature, description_html) = apply_strategy(element)?;

    Some(ContentDocument {
        content_id: content_id::encode(&object.location_url, &object.name),
        inventory_object: object.clone(),
        signature,
        description: markdown::html_to_markdown(&description_html),
        documentation_url: resolved,
    })
}

fn generator_meta(document: &Html) -> Option<String> {
    let selector = Selector::parse(r#"meta[name="generator"]"#).ok()?;
    document.select(&selector).next()?.value().attr("content").map(str::to_string)
}

fn find_by_id<'a>(document: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    document.tree.nodes().find_map(|node| {
        let element = ElementRef::wrap(node)?;
        (element.value().attr("id") == Some(id)).then_some(element)
    })
}

/// Apply the `dt`/`section`/`span-or-a` strategy selection, returning
/// `(signature, description_html)`.
fn apply_strategy(element: ElementRef<'_>) -> Option<(String, String)> {
    match element.value().name() {
        "dt" => dt_strategy(element),
        "section" => section_strategy(element),
        "span" | "a" => find_ancestor_section(element).and_then(section_strategy),
        _ => fallback_strategy(element),
    }
}

fn dt_strategy(dt: ElementRef<'_>) -> Option<(String, String)> {
    let signature = dt.text().collect::<String>().trim().to_string();
    let dd = next_sibling_element(dt).filter(|e| e.value().name() == "dd")?;
    Some((signature, dd.inner_html()))
}

fn section_strategy(section: ElementRef<'_>) -> Option<(String, String)> {
    let heading = section
        .children()
        .filter_map(ElementRef::wrap)
        .find(|e| matches!(e.value().name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6"));
    let signature = heading.map_or_else(String::new, |h| h.text().collect::<String>().trim().to_string());

    let description_html = section
        .children()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "p")
        .map_or_else(String::new, |p| p.inner_html());

    Some((signature, description_html))
}

fn fallback_strategy(element: ElementRef<'_>) -> Option<(String, String)> {
    let paragraph = element
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == "p")?;
    Some((String::new(), paragraph.inner_html()))
}

fn next_sibling_element(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let mut sibling = element.next_sibling();
    while let Some(node) = sibling {
        if let Some(element) = ElementRef::wrap(node) {
            return Some(element);
        }
        sibling = node.next_sibling();
    }
    None
}

fn find_ancestor_section(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let mut node = element.parent();
    while let Some(current) = node {
        if let Some(element) = ElementRef::wrap(current) {
            if element.value().name() == "section" {
                return Some(element);
            }
        }
        node = current.parent();
    }
    None
}
