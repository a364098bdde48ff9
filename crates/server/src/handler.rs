//! MCP server handler implementation.
//!
//! Every lifecycle signal of the worker is exposed as a tool; the handler
//! only routes calls to the matching implementation.
use crate::tools::{
    cache::{CacheEntriesParams, entries_impl, partitions_impl},
    events::{
        MessageParams, NotificationClickParams, PushParams, SyncParams, message_impl, notification_click_impl,
        push_impl, sync_impl,
    },
    fetch::{FetchParams, fetch_impl},
    lifecycle::{activate_impl, install_impl},
};

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
use tether_worker::Dispatcher;

/// The MCP server handler for tether.
#[derive(Clone)]
pub struct TetherServer {
    dispatcher: Dispatcher,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl TetherServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher, tool_router: Self::tool_router() }
    }

    #[tool(description = "Preload the asset manifest into the current static partition. Fails without writing anything if any asset cannot be fetched.")]
    async fn install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.dispatcher).await
    }

    #[tool(description = "Delete partitions of older versions and start intercepting requests. Requires a completed install.")]
    async fn activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.dispatcher).await
    }

    #[tool(
        description = "Route one request through the worker. Returns the response (status, headers, base64 body, source: network, cache or offline_fallback) or a passthrough marker."
    )]
    async fn fetch(&self, params: Parameters<FetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.dispatcher, params.0).await
    }

    #[tool(description = "Background sync signal. With the configured tag, replays every pending dynamic entry and removes the ones that succeed.")]
    async fn sync(&self, params: Parameters<SyncParams>) -> Result<CallToolResult, McpError> {
        sync_impl(&self.dispatcher, params.0).await
    }

    #[tool(description = "Command message. {\"type\": \"CLEAN_CACHE\"} evicts dynamic entries older than the max age.")]
    async fn message(&self, params: Parameters<MessageParams>) -> Result<CallToolResult, McpError> {
        message_impl(&self.dispatcher, params.0).await
    }

    #[tool(description = "Push signal. Shows the update notification and returns it.")]
    async fn push(&self, params: Parameters<PushParams>) -> Result<CallToolResult, McpError> {
        push_impl(&self.dispatcher, params.0).await
    }

    #[tool(description = "Notification click. The explore action opens the app root.")]
    async fn notification_click(
        &self, params: Parameters<NotificationClickParams>,
    ) -> Result<CallToolResult, McpError> {
        notification_click_impl(&self.dispatcher, params.0).await
    }

    #[tool(description = "List cache partitions with entry counts and the current static/dynamic pair.")]
    async fn cache_partitions(&self) -> Result<CallToolResult, McpError> {
        partitions_impl(&self.dispatcher).await
    }

    #[tool(description = "List the URLs stored in a partition (default: current dynamic partition).")]
    async fn cache_entries(&self, params: Parameters<CacheEntriesParams>) -> Result<CallToolResult, McpError> {
        entries_impl(&self.dispatcher, params.0).await
    }
}

impl ServerHandler for TetherServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "tether".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
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
