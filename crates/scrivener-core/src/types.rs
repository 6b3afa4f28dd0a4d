//! Core data structures for the documentation intelligence engine.
//!
//! This module defines the fundamental types shared across detection,
//! inventory parsing, structure extraction, and search: [`InventoryObject`],
//! [`Detection`], [`ContentDocument`], and [`SearchResult`].
//!
//! ## Type Categories
//!
//! - **Inventory**: [`InventoryObject`], [`InventoryType`], [`Specifics`]
//! - **Detection**: [`Detection`], [`InventoryDetection`], [`StructureDetection`]
//! - **Content**: [`ContentDocument`]
//! - **Search**: [`SearchResult`], [`MatchReason`]
//!
//! All of these implement `Serialize`/`Deserialize` since they cross the
//! engine/front-end boundary as JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tag identifying which inventory format produced an [`InventoryObject`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum InventoryType {
    /// Sphinx `objects.inv`.
    SphinxObjectsInv,
    /// MkDocs `search_index.json`.
    MkdocsSearchIndex,
    /// Pydoctor `searchindex.json`.
    PydoctorSearchIndex,
}

impl InventoryType {
    /// The processor genus this inventory type belongs to.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SphinxObjectsInv => "sphinx_objects_inv",
            Self::MkdocsSearchIndex => "mkdocs_search_index",
            Self::PydoctorSearchIndex => "pydoctor_search_index",
        }
    }
}

/// Format-specific fields attached to an [`InventoryObject`].
///
/// Immutable once constructed; each variant corresponds to one inventory
/// processor's parse output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum Specifics {
    /// Fields carried by a Sphinx `objects.inv` entry.
    Sphinx {
        /// Sphinx domain, e.g. `py`, `std`.
        domain: String,
        /// Sphinx role within the domain, e.g. `class`, `function`.
        role: String,
        /// Search priority as declared in the inventory (usually 1).
        priority: i32,
        /// Display name; `-` in the raw inventory means "same as name".
        dispname: String,
        /// Project name from the inventory header.
        project: String,
        /// Project version from the inventory header.
        version: String,
    },
    /// Fields carried by an MkDocs `search_index.json` doc entry.
    MkDocs {
        /// Page or section title.
        title: String,
        /// Relative page location, e.g. `api/`.
        page_location: String,
        /// First 200 characters of the indexed text.
        content_preview: String,
    },
    /// Fields carried by a Pydoctor `searchindex.json` entry.
    Pydoctor {
        /// Fully qualified name, e.g. `pkg.module.Class`.
        qname: String,
        /// Inferred kind: `module`, `class`, or `function`.
        kind: String,
    },
}

/// One discoverable documentation entity: a class, function, page, or module.
///
/// Created by inventory processors; immutable; lives only as long as the
/// enclosing result (query results own their objects, nothing caches them
/// across queries).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryObject {
    /// Qualified identifier, non-empty.
    pub name: String,
    /// Absolute or base-relative URL; may contain a `$` placeholder for
    /// `name` substitution.
    pub uri: String,
    /// Which inventory format produced this object.
    pub inventory_type: InventoryType,
    /// Canonical base URL of the inventory — the working URL, not
    /// necessarily the caller's original input.
    pub location_url: String,
    /// Format-specific fields.
    pub specifics: Specifics,
}

impl InventoryObject {
    /// Resolve `uri` against `location_url`, substituting a trailing `$`
    /// placeholder with `name` first.
    #[must_use]
    pub fn resolved_uri(&self) -> String {
        let substituted = if self.uri.ends_with('$') {
            format!("{}{}", &self.uri[..self.uri.len() - 1], self.name)
        } else {
            self.uri.clone()
        };
        match url::Url::parse(&self.location_url).and_then(|base| base.join(&substituted)) {
            Ok(joined) => joined.to_string(),
            Err(_) => substituted,
        }
    }
}

/// Capability summary an inventory processor reports via `capabilities()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryProcessorCapabilities {
    /// Inventory types this processor can detect and parse.
    pub supported_inventory_types: Vec<InventoryType>,
    /// Filter keys this processor's `filter_inventory` understands.
    pub supported_filters: Vec<String>,
    /// Confidence threshold recommended for this processor's own detections.
    pub recommended_confidence_threshold: f64,
}

/// Capability summary a structure processor reports via `capabilities()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureProcessorCapabilities {
    /// Inventory types this processor can extract content for.
    pub supported_inventory_types: Vec<InventoryType>,
    /// Content extraction features this processor supports, e.g.
    /// `signatures`, `descriptions`, `parameter_docs`.
    pub content_extraction_features: Vec<String>,
    /// Confidence this processor reports per inventory type it recognizes.
    pub confidence_by_inventory_type: Vec<(InventoryType, f64)>,
}

/// The result of one processor's probe against a location: confidence plus
/// enough state to perform subsequent operations.
///
/// Carries `base_url`, the working URL after redirects and pattern
/// extension, and a free-form metadata bag (theme, project, version) that
/// varies per processor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionInfo {
    /// Registry name of the processor that produced this detection.
    pub processor_name: String,
    /// Confidence in `[0.0, 1.0]`.
    pub confidence: f64,
    /// The working URL after redirects/pattern extension succeeded.
    pub base_url: String,
    /// Format-specific metadata (theme, project, version, ...).
    pub metadata: Value,
}

/// A processor's detection result, tagged by genus.
///
/// `Detection` is polymorphic over the capability set a genus implies:
/// inventory detections can `filter_inventory`; structure detections can
/// `extract_contents`. The actual dispatch happens through the
/// [`crate::registry`] processor trait objects; this enum only carries the
/// detection metadata itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "genus", rename_all = "snake_case")]
pub enum Detection {
    /// An inventory processor's detection.
    Inventory(DetectionInfo),
    /// A structure processor's detection.
    Structure(DetectionInfo),
}

impl Detection {
    /// The shared detection info, regardless of genus.
    #[must_use]
    pub const fn info(&self) -> &DetectionInfo {
        match self {
            Self::Inventory(info) | Self::Structure(info) => info,
        }
    }

    /// Confidence in `[0.0, 1.0]`.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.info().confidence
    }

    /// The processor name that produced this detection.
    #[must_use]
    pub fn processor_name(&self) -> &str {
        &self.info().processor_name
    }

    /// The working URL this detection resolved to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.info().base_url
    }
}

/// Extracted documentation for one [`InventoryObject`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentDocument {
    /// The inventory object this content was extracted for.
    pub inventory_object: InventoryObject,
    /// Stable, reversible identifier: `base64(location_url + ":" + name)`.
    pub content_id: String,
    /// Extracted signature, rendered as Markdown.
    pub signature: String,
    /// Extracted description, rendered as Markdown.
    pub description: String,
    /// The HTML page URL (plus anchor) the content was extracted from.
    pub documentation_url: String,
}

/// Why a [`SearchResult`] matched its term.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchReason {
    /// Case-insensitive equality.
    Exact,
    /// Name starts with the term.
    StartsWith,
    /// Name contains the term as a substring.
    Contains,
    /// Fuzzy match above threshold but below the contains/starts-with bands.
    Partial,
    /// Regex pattern match.
    Pattern,
}

impl MatchReason {
    /// Human-readable label used in CLI/Markdown rendering, e.g. `"similar 72%"`.
    #[must_use]
    pub fn label(self, score: f64) -> String {
        match self {
            Self::Exact => "exact".to_string(),
            Self::StartsWith => "starts with".to_string(),
            Self::Contains => "contains".to_string(),
            Self::Pattern => "pattern".to_string(),
            Self::Partial => format!("similar {:.0}%", score * 100.0),
        }
    }
}

/// An [`InventoryObject`] ranked against a search term.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The matched object.
    pub object: InventoryObject,
    /// Score in `[0.0, 1.0]`.
    pub score: f64,
    /// Why this object matched.
    pub match_reason: MatchReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphinx_object() -> InventoryObject {
        InventoryObject {
            name: "dulwich.repo.Repo".to_string(),
            uri: "dulwich/repo.html#$".to_string(),
            inventory_type: InventoryType::SphinxObjectsInv,
            location_url: "https://example.com/en/latest/".to_string(),
            specifics: Specifics::Sphinx {
                domain: "py".to_string(),
                role: "class".to_string(),
                priority: 1,
                dispname: "dulwich.repo.Repo".to_string(),
                project: "dulwich".to_string(),
                version: "1.0".to_string(),
            },
        }
    }

    #[test]
    fn resolved_uri_substitutes_dollar_placeholder() {
        let obj = sphinx_object();
        let resolved = obj.resolved_uri();
        assert_eq!(
            resolved,
            "https://example.com/en/latest/dulwich/repo.html#dulwich.repo.Repo"
        );
    }

    #[test]
    fn detection_info_accessors() {
        let d = Detection::Inventory(DetectionInfo {
            processor_name: "sphinx".to_string(),
            confidence: 1.0,
            base_url: "https://example.com/en/latest/".to_string(),
            metadata: serde_json::json!({"project": "dulwich"}),
        });
        assert_eq!(d.processor_name(), "sphinx");
        assert!((d.confidence() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn match_reason_label_for_partial() {
        assert_eq!(MatchReason::Partial.label(0.72), "similar 72%");
        assert_eq!(MatchReason::Exact.label(1.0), "exact");
    }

    #[test]
    fn inventory_type_as_str_matches_spec_tags() {
        assert_eq!(InventoryType::SphinxObjectsInv.as_str(), "sphinx_objects_inv");
        assert_eq!(InventoryType::MkdocsSearchIndex.as_str(), "mkdocs_search_index");
        assert_eq!(
            InventoryType::PydoctorSearchIndex.as_str(),
            "pydoctor_search_index"
        );
    }
}
