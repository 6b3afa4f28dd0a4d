//! Clap command-line definition.

use clap::{Parser, Subcommand, ValueEnum};
use std::collections::HashMap;

/// A documentation intelligence engine: detect a docs site's format, fetch
/// its machine-readable inventory, and fuzzy-search or extract content.
#[derive(Debug, Parser, Clone)]
#[command(name = "scrivener", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format for rendered results.
    #[arg(long, global = true, value_enum, default_value_t = DisplayFormat::Markdown)]
    pub display_format: DisplayFormat,

    /// Write logs to this file instead of stderr.
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<std::path::PathBuf>,

    /// Minimum log level emitted.
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

/// `--display-format {markdown,json}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DisplayFormat {
    /// Human-readable Markdown.
    Markdown,
    /// Machine-readable JSON (the engine's `render_as_json()` form).
    Json,
}

/// `--log-level {debug,info,warn,error}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Verbose diagnostics.
    Debug,
    /// Normal operation notices.
    Info,
    /// Recoverable problems.
    Warn,
    /// Failures only.
    Error,
}

/// `--details {documentation,full}`, mapped onto [`scrivener_core::DetailLevel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum DetailsArg {
    /// Hide processor/cache internals (the default view).
    #[default]
    Documentation,
    /// Reveal processor names, raw metadata, and search diagnostics.
    Full,
}

impl From<DetailsArg> for scrivener_core::DetailLevel {
    fn from(value: DetailsArg) -> Self {
        match value {
            DetailsArg::Documentation => Self::Documentation,
            DetailsArg::Full => Self::Full,
        }
    }
}

/// Which processor genus `detect` reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum GenusArg {
    /// Both genera (default).
    #[default]
    Both,
    /// Inventory processors only.
    Inventory,
    /// Structure processors only.
    Structure,
}

/// `serve --transport {stdio,sse,stdio-over-tcp}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum TransportArg {
    /// Standard input/output (default).
    #[default]
    Stdio,
    /// Server-sent events.
    Sse,
    /// A single stdio-framed TCP connection.
    StdioOverTcp,
}

impl From<TransportArg> for scrivener_mcp::Transport {
    fn from(value: TransportArg) -> Self {
        match value {
            TransportArg::Stdio => Self::Stdio,
            TransportArg::Sse => Self::Sse,
            TransportArg::StdioOverTcp => Self::StdioOverTcp,
        }
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum Commands {
    /// Report which inventory and structure processor (if any) qualifies for a location.
    Detect {
        /// Docs site root URL.
        location: String,
        /// Limit the report to one genus.
        #[arg(long, value_enum, default_value_t = GenusArg::Both)]
        genus: GenusArg,
    },
    /// Fuzzy-search a docs site's inventory for objects matching TERM.
    QueryInventory {
        /// Docs site root URL.
        location: String,
        /// Search term.
        term: String,
        /// Inventory filters as `key=value` pairs.
        #[arg(long = "filters", value_parser = parse_key_val, num_args = 0..)]
        filters: Vec<(String, String)>,
        /// Maximum number of objects to return.
        #[arg(long, default_value_t = 20)]
        results_max: usize,
        /// How much implementation detail to reveal in the rendered output.
        #[arg(long, value_enum, default_value_t = DetailsArg::Documentation)]
        details: DetailsArg,
    },
    /// Extract documentation content (signature, description) for matching objects.
    QueryContent {
        /// Docs site root URL.
        location: String,
        /// Search term; ignored when `--content-id` is given.
        #[arg(default_value = "")]
        term: String,
        /// Inventory filters as `key=value` pairs.
        #[arg(long = "filters", value_parser = parse_key_val, num_args = 0..)]
        filters: Vec<(String, String)>,
        /// Maximum number of documents to return.
        #[arg(long, default_value_t = 10)]
        results_max: usize,
        /// Truncate each description to this many lines; 0 = no limit.
        #[arg(long, default_value_t = 0)]
        lines_max: usize,
        /// Fetch the single object this content_id names instead of ranking `term`.
        #[arg(long)]
        content_id: Option<String>,
        /// How much implementation detail to reveal in the rendered output.
        #[arg(long, value_enum, default_value_t = DetailsArg::Documentation)]
        details: DetailsArg,
    },
    /// Summarize a docs site's inventory, optionally grouped by a specifics field.
    SummarizeInventory {
        /// Docs site root URL.
        location: String,
        /// Optional search term to narrow the inventory before counting.
        term: Option<String>,
        /// Specifics field to group counts by, e.g. "domain".
        #[arg(long)]
        group_by: Option<String>,
    },
    /// Report capabilities of every registered processor, or one by name.
    SurveyProcessors {
        /// Limit the report to one processor.
        processor_name: Option<String>,
    },
    /// Serve the query functions over the tool protocol.
    Serve {
        /// Transport to serve over.
        #[arg(long, value_enum, default_value_t = TransportArg::Stdio)]
        transport: TransportArg,
        /// TCP port, used only by `--transport stdio-over-tcp`.
        #[arg(long, default_value_t = 7777)]
        port: u16,
        /// Also expose `detect` and `survey_processors` as tools.
        #[arg(long)]
        extra_functions: bool,
    },
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s.split_once('=').ok_or_else(|| format!("expected key=value, got \"{s}\""))?;
    Ok((key.to_string(), value.to_string()))
}

/// Collect `--filters k=v...` pairs into a map, used by query subcommands.
#[must_use]
pub fn filters_map(pairs: &[(String, String)]) -> HashMap<String, String> {
    pairs.iter().cloned().collect()
}
