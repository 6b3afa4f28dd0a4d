//! # scrivener-core
//!
//! Core engine for a documentation intelligence service: given a docs
//! site's root URL, detect whether it was built with Sphinx, MkDocs, or
//! Pydoctor, retrieve its machine-readable inventory (`objects.inv`,
//! `search_index.json`, `searchindex.json`), and serve fuzzy-search and
//! content-extraction queries against it.
//!
//! ## Architecture
//!
//! - **Globals**: the single context struct ([`globals::Globals`]) threaded
//!   through every call — configuration, the shared HTTP client, the
//!   processor registry, and every cache.
//! - **HTTP cache proxy**: [`httpcache`] fronts every outbound request with
//!   response caching, per-URL coalescing, and robots.txt compliance
//!   ([`robots`]).
//! - **Processors**: [`registry`] defines the `InventoryProcessor`/
//!   `StructureProcessor` traits; [`processors`] implements them for Sphinx,
//!   MkDocs, and Pydoctor; [`builtin`] wires the built-ins into a registry.
//! - **Detection**: [`orchestrator`] picks the best-qualified processor for a
//!   location, with cache-backed URL-pattern fallback.
//! - **Query functions**: [`query`] is the public surface CLI and RPC front
//!   ends call — `query_inventory`, `query_content`, `summarize_inventory`,
//!   `detect`, `survey_processors`.
//! - **Search**: [`search`] ranks `InventoryObject`s against a term in
//!   exact/pattern/fuzzy modes.
//! - **Results**: [`result`] gives every success type and [`error::Error`] a
//!   uniform `render_as_json`/`render_as_markdown` surface.
//!
//! ## Quick Start
//!
//! ```no_run
//! use scrivener_core::{Globals, query_inventory};
//! use scrivener_core::search::SearchMode;
//! use std::collections::HashMap;
//!
//! # async fn run() -> scrivener_core::Result<()> {
//! let globals = Globals::with_builtins()?;
//! let result = query_inventory(
//!     &globals,
//!     "https://docs.python.org/3/",
//!     "print",
//!     &HashMap::new(),
//!     SearchMode::Similar { threshold: 50.0 },
//!     10,
//! )
//! .await?;
//! println!("found {} objects", result.objects.len());
//! # Ok(())
//! # }
//! ```

/// Registration wiring for the built-in Sphinx/MkDocs/Pydoctor processors.
pub mod builtin;
/// The three structured response caches plus the redirects/detections caches.
pub mod cache;
/// Engine-initialization configuration.
pub mod config;
/// Stable, reversible content identifiers for `(location_url, name)` pairs.
pub mod content_id;
/// Error types and the `Result` alias.
pub mod error;
/// Application-globals context threaded through every engine call.
pub mod globals;
/// HTTP cache proxy: `probe`, `retrieve_bytes`, `retrieve_text`.
pub mod httpcache;
/// Theme-neutral HTML-to-Markdown conversion.
pub mod markdown;
/// Detection orchestrator: picks the best-qualified processor for a location.
pub mod orchestrator;
/// Built-in Sphinx/MkDocs/Pydoctor inventory and structure processors.
pub mod processors;
/// Query functions: the public surface CLI and RPC front ends call.
pub mod query;
/// Processor registry traits and the ordered `name -> processor` maps.
pub mod registry;
/// Self-rendering result types returned by the query functions.
pub mod result;
/// Hand-rolled `robots.txt` parser and policy evaluation.
pub mod robots;
/// Fuzzy search / match engine.
pub mod search;
/// Core data structures: `InventoryObject`, `Detection`, `ContentDocument`, `SearchResult`.
pub mod types;

pub use error::{Error, Result};
pub use globals::Globals;
pub use query::{DetailLevel, detect, query_content, query_inventory, summarize_inventory, survey_processors};
pub use types::*;
