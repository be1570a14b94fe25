//! MCP tool implementations.
//!
//! This module contains all tools exposed by the netfirst server.

pub mod cache;
pub mod fetch;
pub mod lifecycle;

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for tool tests.

    use std::sync::Arc;
    use std::time::Duration;

    use netfirst_client::{FetchClient, FetchConfig, InterceptionProxy};
    use netfirst_core::CacheDb;
    use rmcp::model::CallToolResult;

    /// An activated proxy for `page` backed by an in-memory cache.
    pub async fn active_proxy(page: &str) -> (InterceptionProxy, CacheDb) {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network =
            Arc::new(FetchClient::new(FetchConfig { timeout: Duration::from_secs(2), ..Default::default() }).unwrap());
        let proxy = InterceptionProxy::new(db.clone(), network, "version-3", url::Url::parse(page).unwrap());
        proxy.on_install().await;
        proxy.on_activate().await;
        (proxy, db)
    }

    /// Parse the JSON text of the first content block.
    pub fn output<T: serde::de::DeserializeOwned>(result: &CallToolResult) -> T {
        let content_val = serde_json::to_value(&result.content[0]).unwrap();
        let text = content_val
            .get("text")
            .and_then(|v| v.as_str())
            .expect("Expected text field in content");
        serde_json::from_str(text).unwrap()
    }
}
