//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::cache::{CacheGetParams, CachePurgeParams, get_impl, list_impl, purge_impl};
use crate::tools::worker::{WorkerFetchParams, activate_impl, fetch_impl, install_impl};

use offline_client::{CacheController, FetchClient};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for mcp-offline.
#[derive(Clone)]
pub struct OfflineServer {
    controller: Arc<CacheController<FetchClient>>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl OfflineServer {
    /// Create a new server handler around a shared controller.
    pub fn new(controller: Arc<CacheController<FetchClient>>) -> Self {
        Self { controller, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Precache the static asset manifest into the current static cache. Fails and stores nothing if any entry cannot be fetched."
    )]
    async fn worker_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&*self.controller).await
    }

    #[tool(description = "Delete every cache that does not belong to the current version and start controlling requests.")]
    async fn worker_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&*self.controller).await
    }

    /// Route one request through the controller.
    ///
    /// Non-GET, API and cross-origin requests go to the network untouched;
    /// documents are network-first with app-shell fallback; other assets are
    /// cache-first.
    #[tool(
        description = "Route a request through the offline cache controller. Returns the chosen strategy, where the response came from, and the response."
    )]
    async fn worker_fetch(&self, params: Parameters<WorkerFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&*self.controller, params.0).await
    }

    #[tool(description = "List named caches with entry counts and whether each belongs to the current version.")]
    async fn cache_list(&self) -> Result<CallToolResult, McpError> {
        list_impl(&*self.controller).await
    }

    #[tool(description = "Look up a stored response by URL, in one named cache or across all caches.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&*self.controller, params.0).await
    }

    #[tool(description = "Delete stale caches, a named cache, or entries older than a number of days.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&*self.controller, params.0).await
    }
}

impl ServerHandler for OfflineServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "mcp-offline".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Offline cache controller for a single-page app. Install and activate run at startup; use worker_fetch to route requests and the cache_* tools to inspect storage."
                    .into(),
            ),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
