//! # scrivener-mcp
//!
//! Tool-protocol server exposing the documentation intelligence engine's
//! query functions — `query_inventory`, `query_content`, `summarize_inventory`,
//! and (behind `--extra-functions`) `detect`/`survey_processors` — over the
//! [`rmcp`] Model Context Protocol.
//!
//! Each tool call returns the engine's `render_as_json()` form; engine
//! failures come back as a tool-level `{error: {...}}` result rather than a
//! protocol fault.

pub mod error;
pub mod server;
pub mod tools;

pub use error::{McpError, McpResult};
pub use server::{McpServer, Transport};

/// Build a server and serve one session over `transport`.
///
/// Tracing must already be initialized by the caller (the CLI's `serve`
/// subcommand does this before invoking `run`).
///
/// # Errors
///
/// Returns an error if the engine fails to initialize, the transport fails
/// to bind, or the underlying protocol session errors.
pub async fn run(transport: Transport, port: u16, extra_functions: bool) -> McpResult<()> {
    let server = McpServer::new(extra_functions)?;
    server.serve(transport, port).await
}
