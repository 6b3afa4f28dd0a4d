//! The tool-protocol server: a thin [`rmcp::ServerHandler`] over the
//! five query functions, backed by a single [`scrivener_core::Globals`].

use crate::error::{McpError, McpResult};
use crate::tools::{create_tool_list, route_tool_call};
use rmcp::ErrorData as RmcpError;
use rmcp::ServerHandler;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam,
    ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::RoleServer;
use rmcp::service::RequestContext;
use scrivener_core::Globals;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};

/// Which transport to serve requests over (`serve --transport`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Standard input/output, the default MCP transport.
    Stdio,
    /// A single TCP connection carrying the same stdio framing.
    StdioOverTcp,
    /// Server-sent events; not currently implemented (see crate docs).
    Sse,
}

/// Tool-protocol server over a single [`Globals`] instance.
#[derive(Clone)]
pub struct McpServer {
    globals: Arc<Globals>,
    extra_functions: bool,
}

impl McpServer {
    /// Build a server over a fresh [`Globals::with_builtins`] instance.
    /// `extra_functions` adds the `detect`/`survey_processors` diagnostic tools.
    pub fn new(extra_functions: bool) -> McpResult<Self> {
        Ok(Self { globals: Arc::new(Globals::with_builtins()?), extra_functions })
    }

    /// Serve one session over `transport`, blocking until it ends.
    pub async fn serve(&self, transport: Transport, port: u16) -> McpResult<()> {
        match transport {
            Transport::Stdio => self.serve_stdio().await,
            Transport::StdioOverTcp => self.serve_stdio_over_tcp(port).await,
            Transport::Sse => Err(McpError::UnsupportedTransport(
                "sse requires an rmcp server-sent-events feature not currently enabled".to_string(),
            )),
        }
    }

    async fn serve_stdio(&self) -> McpResult<()> {
        tracing::info!("scrivener-mcp server starting over stdio");
        let transport = (tokio::io::stdin(), tokio::io::stdout());
        let service = rmcp::serve_server(self.clone(), transport)
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;
        service.waiting().await.map_err(|e| McpError::Protocol(e.to_string()))?;
        tracing::info!("scrivener-mcp server stopped");
        Ok(())
    }

    async fn serve_stdio_over_tcp(&self, port: u16) -> McpResult<()> {
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        tracing::info!(port, "listening for a single stdio-framed connection");
        let (stream, peer) = listener.accept().await?;
        tracing::info!(%peer, "accepted connection");
        let (read_half, write_half) = tokio::io::split(stream);
        self.serve_split(read_half, write_half).await
    }

    async fn serve_split<R, W>(&self, read_half: R, write_half: W) -> McpResult<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let service = rmcp::serve_server(self.clone(), (read_half, write_half))
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;
        service.waiting().await.map_err(|e| McpError::Protocol(e.to_string()))?;
        Ok(())
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "scrivener-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Documentation intelligence query tools.\n\n\
                 - query_inventory: fuzzy-search a docs site's inventory\n\
                 - query_content: extract signatures/descriptions for matching objects\n\
                 - summarize_inventory: grouped object counts\n"
                    .to_string(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _pagination: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, RmcpError> {
        let tools = create_tool_list(self.extra_functions).map_err(|e| RmcpError::internal_error(e.to_string(), None))?;
        Ok(ListToolsResult { tools, meta: Default::default(), next_cursor: None })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, RmcpError> {
        route_tool_call(request, &self.globals, self.extra_functions)
            .await
            .map_err(|e| RmcpError::invalid_params(e.to_string(), None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_info_names_the_server() {
        let server = McpServer::new(false).unwrap();
        let info = server.get_info();
        assert_eq!(info.server_info.name, "scrivener-mcp");
    }

    #[test]
    fn server_info_serialization_stays_small() {
        let server = McpServer::new(false).unwrap();
        let json = serde_json::to_string(&server.get_info()).unwrap();
        assert!(json.len() < 2048, "handshake response {} bytes", json.len());
    }
}
