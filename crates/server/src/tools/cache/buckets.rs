//! cache_buckets tool implementation.
//!
//! Lists every known bucket with its entry count.

use netfirst_client::InterceptionProxy;
use netfirst_core::CacheDb;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::json_result;

/// One bucket in the listing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BucketInfo {
    pub name: String,
    pub entries: u64,
    pub created_at: String,
    /// Whether this is the proxy's current generation.
    pub current: bool,
}

/// Output from the cache_buckets tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheBucketsOutput {
    pub current: String,
    pub buckets: Vec<BucketInfo>,
}

/// Implementation of the cache_buckets tool.
pub async fn buckets_impl(cache: &CacheDb, proxy: &InterceptionProxy) -> Result<CallToolResult, McpError> {
    let buckets = cache
        .bucket_summaries()
        .await?
        .into_iter()
        .map(|s| BucketInfo {
            current: s.name == proxy.generation(),
            name: s.name,
            entries: s.entries,
            created_at: s.created_at,
        })
        .collect();

    json_result(&CacheBucketsOutput { current: proxy.generation().to_string(), buckets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{active_proxy, output};

    #[tokio::test]
    async fn test_buckets_marks_current() {
        let (proxy, db) = active_proxy("https://app.example.com").await;
        db.open_bucket("version-3").await.unwrap();
        db.open_bucket("scratch").await.unwrap();

        let result = buckets_impl(&db, &proxy).await.unwrap();
        let out: CacheBucketsOutput = output(&result);

        assert_eq!(out.current, "version-3");
        assert_eq!(out.buckets.len(), 2);
        assert!(out.buckets.iter().any(|b| b.name == "version-3" && b.current));
        assert!(out.buckets.iter().any(|b| b.name == "scratch" && !b.current));
    }

    #[tokio::test]
    async fn test_buckets_empty() {
        let (proxy, db) = active_proxy("https://app.example.com").await;
        let result = buckets_impl(&db, &proxy).await.unwrap();
        let out: CacheBucketsOutput = output(&result);
        assert!(out.buckets.is_empty());
    }
}
