//! cache_get tool implementation.
//!
//! Looks a request up in the current generation's bucket without touching the network.

use netfirst_client::InterceptionProxy;
use netfirst_core::{Error, ProxyRequest, ProxyResponse};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ToolError, json_result};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Absolute URL, or a path relative to the page origin.
    pub url: String,

    /// HTTP method the entry was stored under (default: GET).
    #[serde(default = "default_method")]
    pub method: String,
}

fn default_method() -> String {
    "GET".into()
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    /// Bucket the entry was found in.
    pub generation: String,
    pub url: String,
    pub status: u16,
    pub headers: std::collections::BTreeMap<String, String>,
    /// Stored body decoded as UTF-8 (lossy).
    pub body: String,
}

impl CacheGetOutput {
    fn new(generation: &str, response: ProxyResponse) -> Self {
        Self {
            generation: generation.to_string(),
            body: response.body_text(),
            url: response.url,
            status: response.status,
            headers: response.headers,
        }
    }
}

/// Implementation of the cache_get tool.
pub async fn get_impl(proxy: &InterceptionProxy, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    if params.url.trim().is_empty() {
        return Err(ToolError::InvalidInput("url cannot be empty".into()).into());
    }

    let request = ProxyRequest::new(params.method, params.url.clone());
    let response = proxy
        .lookup(&request)
        .await?
        .into_response()
        .ok_or_else(|| Error::CacheMiss(params.url))?;

    json_result(&CacheGetOutput::new(proxy.generation(), response))
}
