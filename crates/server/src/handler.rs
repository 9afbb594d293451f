//! MCP server handler implementation.
//!
//! Each tool call is one platform event delivered to the worker registration.
use std::sync::Arc;

use crate::tools::cache::{CacheGetParams, get_impl};
use crate::tools::{
    PostMessageParams, SwFetchParams, clear_impl, fetch_impl, post_message_impl, status_impl, update_impl,
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
use swcache_core::Registration;
use url::Url;

/// The MCP handler fronting a worker registration.
#[derive(Clone)]
pub struct SwHostServer {
    tool_router: ToolRouter<Self>,
    registration: Arc<Registration>,
    origin: Url,
}

/// Tool router implementation using the #[tool_router] macro.
#[tool_router]
impl SwHostServer {
    pub fn new(registration: Arc<Registration>, origin: Url) -> Self {
        Self { tool_router: Self::tool_router(), registration, origin }
    }

    #[tool(
        description = "Issue a page request through the active service worker. Returns the response and whether it came from cache, network, stale cache, the offline fallback, or pass-through."
    )]
    async fn sw_fetch(&self, params: Parameters<SwFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.registration, &self.origin, params.0).await
    }

    /// Debug hook: post CLEAR_CACHE to the active worker.
    #[tool(description = "Delete every cache namespace and notify controlled pages with CACHE_CLEARED.")]
    async fn clear_app_cache(&self) -> Result<CallToolResult, McpError> {
        clear_impl(&self.registration).await
    }

    #[tool(
        description = "Post message data to the active worker, as a page would. { \"type\": \"CLEAR_CACHE\" } clears every cache; unknown messages are ignored."
    )]
    async fn sw_post_message(&self, params: Parameters<PostMessageParams>) -> Result<CallToolResult, McpError> {
        post_message_impl(&self.registration, params.0).await
    }

    #[tool(description = "Report the active worker version, its lifecycle phase, and every cache namespace.")]
    async fn sw_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.registration).await
    }

    /// Stands in for the page regaining visibility.
    #[tool(description = "Check the deployed configuration for a new worker version and install it if the version changed.")]
    async fn sw_update(&self) -> Result<CallToolResult, McpError> {
        update_impl(&self.registration).await
    }

    #[tool(description = "Look up one cached entry by namespace and URL.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(self.registration.env().store.as_ref(), &self.origin, params.0).await
    }
}

impl ServerHandler for SwHostServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "sw-host".into(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{ORIGIN, active_registration};

    #[tokio::test]
    async fn test_router_lists_every_tool() {
        let (reg, _store, _net) = active_registration().await;
        let server = SwHostServer::new(reg, Url::parse(ORIGIN).unwrap());

        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();

        assert_eq!(names, vec!["cache_get", "clear_app_cache", "sw_fetch", "sw_post_message", "sw_status", "sw_update"]);
    }

    #[tokio::test]
    async fn test_server_info_name() {
        let (reg, _store, _net) = active_registration().await;
        let server = SwHostServer::new(reg, Url::parse(ORIGIN).unwrap());

        assert_eq!(server.get_info().server_info.name, "sw-host");
    }
}
