//! proxy_fetch tool implementation.
//!
//! Runs one request through the interception proxy, as the page would.

use std::collections::BTreeMap;

use netfirst_client::{InterceptionProxy, ResponseSource};
use netfirst_core::ProxyRequest;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ToolError, json_result};

/// Input parameters for the proxy_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProxyFetchParams {
    /// Absolute URL, or a path relative to the page origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Optional request body (UTF-8).
    #[serde(default)]
    pub body: Option<String>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output structure for the proxy_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProxyFetchOutput {
    /// URL the response was served from.
    pub url: String,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    /// Response body decoded as UTF-8 (lossy).
    pub body: String,
    /// "network" or "cache".
    pub source: ResponseSource,
}

/// Implementation of the proxy_fetch tool.
pub async fn fetch_impl(proxy: &InterceptionProxy, params: ProxyFetchParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(ToolError::InvalidInput("url cannot be empty".into()).into());
    }
    if params.method.trim().is_empty() {
        return Err(ToolError::InvalidInput("method cannot be empty".into()).into());
    }

    let request = ProxyRequest {
        method: params.method,
        url: params.url,
        headers: params.headers,
        body: params.body.map(String::into_bytes),
    };

    let served = proxy.intercept(request).await?;

    let output = ProxyFetchOutput {
        body: served.response.body_text(),
        url: served.response.url,
        status: served.response.status,
        headers: served.response.headers,
        source: served.source,
    };

    json_result(&output)
}
