//! Self-rendering result types returned by the query functions in
//! [`crate::query`].
//!
//! Every success result and every [`crate::error::Error`] implements
//! [`Renderable`], giving the CLI and RPC front ends a single uniform way to
//! present either outcome in the caller's chosen display format.

use crate::types::{Detection, InventoryProcessorCapabilities, SearchResult, StructureProcessorCapabilities};
use serde::Serialize;
use serde_json::{Value, json};

/// Implemented by every success result type and by [`crate::error::Error`].
///
/// `render_as_markdown`'s `reveal_internals` flag controls whether
/// implementation detail (processor names, cache state, raw metadata) is
/// included — the CLI's default view omits it, `--verbose` enables it.
pub trait Renderable {
    /// Render as a JSON value suitable for RPC responses or `--display-format json`.
    fn render_as_json(&self) -> Value;
    /// Render as a Markdown string suitable for `--display-format markdown`.
    fn render_as_markdown(&self, reveal_internals: bool) -> String;
}

/// Metadata about how a search was performed, attached to query results.
#[derive(Debug, Clone, Serialize)]
pub struct SearchMetadata {
    /// Search mode used: `exact`, `pattern`, or `similar`.
    pub mode: String,
    /// Fuzzy threshold applied (only meaningful for `similar`).
    pub threshold: f64,
    /// Number of objects considered before the `results_max` cap.
    pub candidates_considered: usize,
}

/// Result of [`crate::query::query_inventory`].
#[derive(Debug, Clone, Serialize)]
pub struct InventoryQueryResult {
    /// The working location the detection resolved to.
    pub location: String,
    /// The search term the caller supplied.
    pub term: String,
    /// Ranked, filtered, capped search results.
    pub objects: Vec<SearchResult>,
    /// Diagnostics about how the search ran.
    pub search_metadata: SearchMetadata,
}

impl Renderable for InventoryQueryResult {
    fn render_as_json(&self) -> Value {
        json!(self)
    }

    fn render_as_markdown(&self, reveal_internals: bool) -> String {
        let mut out = format!(
            "# Inventory query: `{}`\n\nLocation: {}\n\n",
            self.term, self.location
        );
        for r in &self.objects {
            out.push_str(&format!(
                "- **{}** ({}) — {}\n",
                r.object.name,
                r.object.inventory_type.as_str(),
                r.match_reason.label(r.score)
            ));
        }
        if reveal_internals {
            out.push_str(&format!(
                "\n_mode={} threshold={} candidates={}_\n",
                self.search_metadata.mode,
                self.search_metadata.threshold,
                self.search_metadata.candidates_considered
            ));
        }
        out
    }
}

/// Result of [`crate::query::query_content`].
#[derive(Debug, Clone, Serialize)]
pub struct ContentQueryResult {
    /// The working location the detection resolved to.
    pub location: String,
    /// The search term the caller supplied (empty when selected by `content_id`).
    pub term: String,
    /// Successfully extracted documents, in input object order.
    pub documents: Vec<crate::types::ContentDocument>,
    /// Number of candidate objects that failed extraction and were dropped.
    pub omitted: usize,
}

impl Renderable for ContentQueryResult {
    fn render_as_json(&self) -> Value {
        json!(self)
    }

    fn render_as_markdown(&self, reveal_internals: bool) -> String {
        let mut out = format!("# Content query: `{}`\n\nLocation: {}\n\n", self.term, self.location);
        for doc in &self.documents {
            out.push_str(&format!(
                "## {}\n\n{}\n\n{}\n\n[source]({})\n\n",
                doc.inventory_object.name, doc.signature, doc.description, doc.documentation_url
            ));
        }
        if reveal_internals && self.omitted > 0 {
            out.push_str(&format!("\n_{} candidate(s) omitted (extraction failed)_\n", self.omitted));
        }
        out
    }
}

/// One group's count in [`SummarizeInventoryResult`].
#[derive(Debug, Clone, Serialize)]
pub struct GroupSummary {
    /// Group key value (e.g. the `domain` specifics field).
    pub group: String,
    /// Number of matching objects in this group.
    pub count: usize,
}

/// Result of [`crate::query::summarize_inventory`].
#[derive(Debug, Clone, Serialize)]
pub struct SummarizeInventoryResult {
    /// The working location the detection resolved to.
    pub location: String,
    /// Total number of matching objects across all groups.
    pub total: usize,
    /// Per-group counts, present only when `group_by` was supplied.
    pub groups: Vec<GroupSummary>,
}

impl Renderable for SummarizeInventoryResult {
    fn render_as_json(&self) -> Value {
        json!(self)
    }

    fn render_as_markdown(&self, _reveal_internals: bool) -> String {
        let mut out = format!("# Inventory summary\n\nLocation: {}\nTotal: {}\n\n", self.location, self.total);
        for g in &self.groups {
            out.push_str(&format!("- {}: {}\n", g.group, g.count));
        }
        out
    }
}

/// Result of [`crate::query::detect`].
#[derive(Debug, Clone, Serialize)]
pub struct DetectResult {
    /// The inventory detection, if any processor qualified.
    pub inventory: Option<Detection>,
    /// The structure detection, if any processor qualified.
    pub structure: Option<Detection>,
}

impl Renderable for DetectResult {
    fn render_as_json(&self) -> Value {
        json!(self)
    }

    fn render_as_markdown(&self, reveal_internals: bool) -> String {
        let mut out = String::from("# Detection\n\n");
        for (label, detection) in [("Inventory", &self.inventory), ("Structure", &self.structure)] {
            match detection {
                Some(d) => {
                    out.push_str(&format!(
                        "- {label}: `{}` (confidence {:.2}) at {}\n",
                        d.processor_name(),
                        d.confidence(),
                        d.base_url()
                    ));
                    if reveal_internals {
                        out.push_str(&format!("  metadata: {}\n", d.info().metadata));
                    }
                },
                None => out.push_str(&format!("- {label}: none qualified\n")),
            }
        }
        out
    }
}

/// One processor's capability description in [`SurveyProcessorsResult`].
#[derive(Debug, Clone, Serialize)]
pub struct ProcessorSurvey {
    /// Registry name.
    pub name: String,
    /// Processor genus: `inventory` or `structure`.
    pub genus: String,
    /// Inventory-genus capabilities, present for inventory processors.
    pub inventory_capabilities: Option<InventoryProcessorCapabilities>,
    /// Structure-genus capabilities, present for structure processors.
    pub structure_capabilities: Option<StructureProcessorCapabilities>,
}

/// Result of [`crate::query::survey_processors`].
#[derive(Debug, Clone, Serialize)]
pub struct SurveyProcessorsResult {
    /// One entry per registered processor (or just the requested one).
    pub processors: Vec<ProcessorSurvey>,
}

impl Renderable for SurveyProcessorsResult {
    fn render_as_json(&self) -> Value {
        json!(self)
    }

    fn render_as_markdown(&self, _reveal_internals: bool) -> String {
        let mut out = String::from("# Registered processors\n\n");
        for p in &self.processors {
            out.push_str(&format!("- **{}** ({})\n", p.name, p.genus));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InventoryObject, InventoryType, MatchReason, Specifics};

    fn sample_object() -> InventoryObject {
        InventoryObject {
            name: "print".to_string(),
            uri: "library/functions.html#print".to_string(),
            inventory_type: InventoryType::SphinxObjectsInv,
            location_url: "file:///fixture/sphinx/".to_string(),
            specifics: Specifics::Sphinx {
                domain: "py".to_string(),
                role: "function".to_string(),
                priority: 1,
                dispname: "print".to_string(),
                project: "python".to_string(),
                version: "3".to_string(),
            },
        }
    }

    #[test]
    fn inventory_query_result_renders_markdown_with_entries() {
        let result = InventoryQueryResult {
            location: "file:///fixture/sphinx/".to_string(),
            term: "print".to_string(),
            objects: vec![SearchResult {
                object: sample_object(),
                score: 1.0,
                match_reason: MatchReason::Exact,
            }],
            search_metadata: SearchMetadata {
                mode: "similar".to_string(),
                threshold: 50.0,
                candidates_considered: 1,
            },
        };
        let md = result.render_as_markdown(false);
        assert!(md.contains("print"));
        assert!(!md.contains("candidates="));
    }

    #[test]
    fn inventory_query_result_json_round_trips_shape() {
        let result = InventoryQueryResult {
            location: "loc".to_string(),
            term: "t".to_string(),
            objects: vec![],
            search_metadata: SearchMetadata {
                mode: "exact".to_string(),
                threshold: 100.0,
                candidates_considered: 0,
            },
        };
        let v = result.render_as_json();
        assert_eq!(v["location"], "loc");
        assert_eq!(v["objects"].as_array().unwrap().len(), 0);
    }
}
