//! Error types for the tool-protocol server.
//!
//! Tool execution failures are *not* protocol faults — per the engine's
//! error-rendering contract they come back as a normal `CallToolResult` whose
//! content is the engine's `{error: {...}}` JSON envelope with `is_error`
//! set. [`McpError`] is reserved for failures in the protocol plumbing
//! itself (bad transport setup, malformed tool arguments).

use thiserror::Error;

/// Errors that can occur in the server's protocol/transport layer.
#[derive(Debug, Error)]
pub enum McpError {
    /// Engine initialization failed.
    #[error("engine initialization failed: {0}")]
    Engine(#[from] scrivener_core::Error),

    /// Tool arguments did not match the tool's declared schema.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Requested transport is not available.
    #[error("transport unavailable: {0}")]
    UnsupportedTransport(String),

    /// Protocol I/O (stdio, TCP) failed.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying rmcp service error.
    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Result type alias for server-layer operations.
pub type McpResult<T> = Result<T, McpError>;
