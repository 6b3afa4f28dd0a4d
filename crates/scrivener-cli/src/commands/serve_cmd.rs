//! `serve [--transport stdio|sse|stdio-over-tcp] [--port N] [--extra-functions]`.

use crate::cli::TransportArg;
use crate::error::{CliError, ErrorCategory};

/// Run `serve`. Tracing is already initialized by [`crate::run`]; the MCP
/// server must not re-initialize it.
///
/// # Errors
///
/// Returns a [`CliError`] (exit code 1) if the engine fails to initialize or
/// the transport fails.
pub async fn execute(transport: TransportArg, port: u16, extra_functions: bool) -> Result<(), CliError> {
    tracing::debug!(?transport, port, extra_functions, "starting tool-protocol server");
    scrivener_mcp::run(transport.into(), port, extra_functions)
        .await
        .map_err(|e| CliError::new(ErrorCategory::Engine, anyhow::anyhow!(e.to_string())))
}
