//! MCP server handler implementation.
//!
//! This module defines the main server handler that plays the host runtime:
//! it owns the proxy and routes lifecycle, fetch and cache tool calls to it.
use crate::tools::cache::{CacheDeleteParams, CacheGetParams, buckets_impl, delete_impl, get_impl};
use crate::tools::fetch::{ProxyFetchParams, fetch_impl};
use crate::tools::lifecycle::{activate_impl, install_impl};

use netfirst_client::InterceptionProxy;
use netfirst_core::CacheDb;
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

/// The main MCP server handler for netfirst.
#[derive(Clone)]
pub struct NetfirstServer {
    tool_router: ToolRouter<Self>,
    proxy: InterceptionProxy,
    cache: CacheDb,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl NetfirstServer {
    /// Create a new server handler around a registered proxy.
    pub fn new(proxy: InterceptionProxy, cache: CacheDb) -> Self {
        Self { tool_router: Self::tool_router(), proxy, cache }
    }

    #[tool(description = "Run the proxy's install hook. Nothing is pre-cached; the proxy asks to skip waiting.")]
    async fn proxy_install(&self) -> Result<CallToolResult, McpError> {
        install_impl(&self.proxy).await
    }

    #[tool(
        description = "Run the proxy's activate hook. Deletes every cache bucket except the current generation and claims open pages."
    )]
    async fn proxy_activate(&self) -> Result<CallToolResult, McpError> {
        activate_impl(&self.proxy).await
    }

    /// Send a request through the proxy.
    ///
    /// Same-origin reads go to the network first and fall back to the cache when the
    /// network is unreachable. Cross-origin and POST requests go straight to the network.
    #[tool(
        description = "Fetch a URL through the network-first cache proxy. Returns status, headers, body and whether it came from the network or the cache."
    )]
    async fn proxy_fetch(&self, params: Parameters<ProxyFetchParams>) -> Result<CallToolResult, McpError> {
        fetch_impl(&self.proxy, params.0).await
    }

    #[tool(description = "Look up a request in the current cache bucket without using the network.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.proxy, params.0).await
    }

    #[tool(description = "List cache buckets with entry counts and mark the current generation.")]
    async fn cache_buckets(&self) -> Result<CallToolResult, McpError> {
        buckets_impl(&self.cache, &self.proxy).await
    }

    #[tool(description = "Delete one cache bucket and all of its entries.")]
    async fn cache_delete(&self, params: Parameters<CacheDeleteParams>) -> Result<CallToolResult, McpError> {
        delete_impl(&self.cache, &self.proxy, params.0).await
    }
}

impl ServerHandler for NetfirstServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "netfirst".into(),
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
    use crate::tools::testing::active_proxy;

    #[tokio::test]
    async fn test_lists_all_tools() {
        let (proxy, db) = active_proxy("https://app.example.com").await;
        let server = NetfirstServer::new(proxy, db);

        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();

        assert_eq!(
            names,
            vec!["cache_buckets", "cache_delete", "cache_get", "proxy_activate", "proxy_fetch", "proxy_install"]
        );
    }
}
