//! cache_delete tool implementation.
//!
//! Deletes a single bucket and all of its entries.

use netfirst_client::InterceptionProxy;
use netfirst_core::CacheDb;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ToolError, json_result};

/// Parameters for the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteParams {
    /// Name of the bucket to delete.
    pub bucket: String,

    /// Allow deleting the current generation's bucket.
    #[serde(default)]
    pub force: bool,
}

/// Output from the cache_delete tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheDeleteOutput {
    pub bucket: String,
    /// False when the bucket did not exist.
    pub deleted: bool,
}

/// Implementation of the cache_delete tool.
pub async fn delete_impl(
    cache: &CacheDb, proxy: &InterceptionProxy, params: CacheDeleteParams,
) -> Result<CallToolResult, McpError> {
    if params.bucket.trim().is_empty() {
        return Err(ToolError::InvalidInput("bucket cannot be empty".into()).into());
    }
    if params.bucket == proxy.generation() && !params.force {
        return Err(ToolError::InvalidInput(format!(
            "{} is the current generation; pass force=true to delete it",
            params.bucket
        ))
        .into());
    }

    let deleted = cache.delete_bucket(&params.bucket).await?;
    tracing::info!(bucket = %params.bucket, deleted, "cache_delete");

    json_result(&CacheDeleteOutput { bucket: params.bucket, deleted })
}
