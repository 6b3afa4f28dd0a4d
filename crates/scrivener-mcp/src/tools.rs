//! Tool definitions and dispatch for the five query functions.
//!
//! `query_inventory`, `query_content`, and `summarize_inventory` are always
//! listed; `detect` and `survey_processors` are diagnostic extras gated by
//! `--extra-functions`.

use crate::error::McpError;
use rmcp::model::{CallToolRequestParam, CallToolResult, Content, Tool};
use schemars::JsonSchema;
use scrivener_core::query;
use scrivener_core::result::Renderable;
use scrivener_core::search::SearchMode;
use serde::Deserialize;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

fn default_results_max() -> usize {
    20
}

#[derive(Debug, Deserialize, JsonSchema)]
struct QueryInventoryArgs {
    /// Docs site root URL to detect and query against.
    location: String,
    /// Fuzzy/exact/pattern search term; empty matches everything.
    #[serde(default)]
    term: String,
    /// Inventory filters understood by the detected processor.
    #[serde(default)]
    filters: HashMap<String, String>,
    /// One of "exact", "pattern", "similar" (default).
    #[serde(default)]
    mode: Option<String>,
    /// Regex source, required when `mode` is "pattern".
    #[serde(default)]
    pattern: Option<String>,
    /// Fuzzy score threshold (0-100), used when `mode` is "similar".
    #[serde(default)]
    threshold: Option<f64>,
    #[serde(default = "default_results_max")]
    results_max: usize,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct QueryContentArgs {
    location: String,
    #[serde(default)]
    term: String,
    #[serde(default)]
    filters: HashMap<String, String>,
    #[serde(default = "default_results_max")]
    results_max: usize,
    /// Truncate each extracted description to this many lines; 0 = no limit.
    #[serde(default)]
    lines_max: usize,
    /// Fetch the single object this content_id names instead of ranking `term`.
    #[serde(default)]
    content_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SummarizeInventoryArgs {
    location: String,
    #[serde(default)]
    term: Option<String>,
    #[serde(default)]
    filters: HashMap<String, String>,
    /// Specifics field to group counts by, e.g. "domain".
    #[serde(default)]
    group_by: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct DetectArgs {
    location: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SurveyProcessorsArgs {
    #[serde(default)]
    processor_name: Option<String>,
}

fn parse_mode(args: &QueryInventoryArgs) -> Result<SearchMode, McpError> {
    match args.mode.as_deref() {
        None | Some("similar") => Ok(SearchMode::Similar { threshold: args.threshold.unwrap_or(50.0) }),
        Some("exact") => Ok(SearchMode::Exact),
        Some("pattern") => {
            let source = args.pattern.as_deref().ok_or_else(|| McpError::InvalidArguments("mode \"pattern\" requires a pattern field".to_string()))?;
            let regex = regex::Regex::new(source).map_err(|e| McpError::InvalidArguments(format!("invalid pattern: {e}")))?;
            Ok(SearchMode::Pattern(regex))
        },
        Some(other) => Err(McpError::InvalidArguments(format!("unknown mode \"{other}\""))),
    }
}

fn create_tool(name: &'static str, description: &'static str, schema: schemars::schema::RootSchema) -> Result<Tool, McpError> {
    let schema_value = serde_json::to_value(schema).map_err(|e| McpError::InvalidArguments(e.to_string()))?;
    let input_schema = schema_value
        .as_object()
        .ok_or_else(|| McpError::InvalidArguments(format!("schema for {name} is not an object")))?
        .clone();
    Ok(Tool {
        name: Cow::Borrowed(name),
        title: None,
        description: Some(Cow::Borrowed(description)),
        input_schema: Arc::new(input_schema),
        output_schema: None,
        annotations: None,
        icons: None,
        meta: Default::default(),
    })
}

/// Build the advertised tool list. `extra_functions` adds the two
/// diagnostic tools (`detect`, `survey_processors`).
pub fn create_tool_list(extra_functions: bool) -> Result<Vec<Tool>, McpError> {
    let mut tools = vec![
        create_tool(
            "query_inventory",
            "Detect a docs site's format and fuzzy-search its inventory for matching objects",
            schemars::schema_for!(QueryInventoryArgs),
        )?,
        create_tool(
            "query_content",
            "Extract documentation content (signature, description) for objects matching a term or content_id",
            schemars::schema_for!(QueryContentArgs),
        )?,
        create_tool(
            "summarize_inventory",
            "Summarize a docs site's inventory, optionally grouped by a specifics field",
            schemars::schema_for!(SummarizeInventoryArgs),
        )?,
    ];
    if extra_functions {
        tools.push(create_tool(
            "detect",
            "Report which inventory and structure processor (if any) qualifies for a location",
            schemars::schema_for!(DetectArgs),
        )?);
        tools.push(create_tool(
            "survey_processors",
            "Report capabilities of every registered processor, or one by name",
            schemars::schema_for!(SurveyProcessorsArgs),
        )?);
    }
    Ok(tools)
}

fn parse_args<T: serde::de::DeserializeOwned>(request: &CallToolRequestParam) -> Result<T, McpError> {
    let value = Value::Object(request.arguments.clone().unwrap_or_default());
    serde_json::from_value(value).map_err(|e| McpError::InvalidArguments(e.to_string()))
}

/// Wrap a [`Renderable`] success value as a structured `CallToolResult`.
fn success<R: Renderable>(result: &R) -> CallToolResult {
    CallToolResult::structured(result.render_as_json())
}

/// Wrap an engine error as a tool-level error result: `{error: {...}}`
/// JSON, never a protocol fault.
fn failure(error: &scrivener_core::Error) -> CallToolResult {
    CallToolResult::error(vec![Content::text(error.render_as_json().to_string())])
}

/// Route an incoming tool call to its query function.
pub async fn route_tool_call(request: CallToolRequestParam, globals: &scrivener_core::Globals, extra_functions: bool) -> Result<CallToolResult, McpError> {
    match request.name.as_ref() {
        "query_inventory" => {
            let args: QueryInventoryArgs = parse_args(&request)?;
            let mode = parse_mode(&args)?;
            match query::query_inventory(globals, &args.location, &args.term, &args.filters, mode, args.results_max).await {
                Ok(result) => Ok(success(&result)),
                Err(error) => Ok(failure(&error)),
            }
        },
        "query_content" => {
            let args: QueryContentArgs = parse_args(&request)?;
            match query::query_content(globals, &args.location, &args.term, &args.filters, args.results_max, args.lines_max, args.content_id.as_deref()).await {
                Ok(result) => Ok(success(&result)),
                Err(error) => Ok(failure(&error)),
            }
        },
        "summarize_inventory" => {
            let args: SummarizeInventoryArgs = parse_args(&request)?;
            match query::summarize_inventory(globals, &args.location, args.term.as_deref(), &args.filters, args.group_by.as_deref()).await {
                Ok(result) => Ok(success(&result)),
                Err(error) => Ok(failure(&error)),
            }
        },
        "detect" if extra_functions => {
            let args: DetectArgs = parse_args(&request)?;
            let result = query::detect(globals, &args.location).await;
            Ok(success(&result))
        },
        "survey_processors" if extra_functions => {
            let args: SurveyProcessorsArgs = parse_args(&request)?;
            let result = query::survey_processors(globals, args.processor_name.as_deref());
            Ok(success(&result))
        },
        other => Err(McpError::InvalidArguments(format!("unknown tool: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn tool_list_excludes_extras_by_default() {
        let tools = create_tool_list(false).unwrap();
        assert_eq!(tools.len(), 3);
        assert!(tools.iter().all(|t| t.name != "detect" && t.name != "survey_processors"));
    }

    #[test]
    fn tool_list_includes_extras_when_enabled() {
        let tools = create_tool_list(true).unwrap();
        assert_eq!(tools.len(), 5);
    }

    fn write_objects_inv(dir: &std::path::Path) {
        let body = "dulwich.repo.Repo py:class 1 api/index.html#$ -\n";
        let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(body.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"# Sphinx inventory version 2\n");
        bytes.extend_from_slice(b"# Project: dulwich\n");
        bytes.extend_from_slice(b"# Version: 0.1\n");
        bytes.extend_from_slice(b"# The remainder of this file is compressed using zlib.\n");
        bytes.extend_from_slice(&compressed);
        std::fs::write(dir.join("objects.inv"), bytes).unwrap();
    }

    fn call(name: &'static str, args: serde_json::Value) -> CallToolRequestParam {
        CallToolRequestParam {
            name: Cow::Borrowed(name),
            arguments: args.as_object().cloned(),
        }
    }

    #[tokio::test]
    async fn route_tool_call_dispatches_query_inventory_to_the_engine() {
        let dir = tempfile::tempdir().unwrap();
        write_objects_inv(dir.path());
        let globals = scrivener_core::Globals::with_builtins().unwrap();
        let location = format!("file://{}/", dir.path().display());

        let request = call("query_inventory", serde_json::json!({"location": location, "term": "Repo"}));
        let result = route_tool_call(request, &globals, false).await.unwrap();
        assert!(!result.is_error.unwrap_or(false));
    }

    #[tokio::test]
    async fn route_tool_call_rejects_unknown_tool_names() {
        let globals = scrivener_core::Globals::with_builtins().unwrap();
        let request = call("not_a_real_tool", serde_json::json!({}));
        let result = route_tool_call(request, &globals, false).await;
        assert!(matches!(result, Err(McpError::InvalidArguments(_))));
    }

    #[tokio::test]
    async fn route_tool_call_hides_extras_unless_enabled() {
        let globals = scrivener_core::Globals::with_builtins().unwrap();
        let request = call("detect", serde_json::json!({"location": "file:///nonexistent/"}));
        let result = route_tool_call(request, &globals, false).await;
        assert!(matches!(result, Err(McpError::InvalidArguments(_))));
    }
}
