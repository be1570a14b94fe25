//! proxy_install / proxy_activate tool implementations.
//!
//! The host normally runs both at startup; the tools let an operator
//! replay them, e.g. after importing buckets from an older release.

use netfirst_client::InterceptionProxy;
use rmcp::{ErrorData as McpError, model::CallToolResult};

use crate::error::json_result;

/// Run the install hook.
pub async fn install_impl(proxy: &InterceptionProxy) -> Result<CallToolResult, McpError> {
    let outcome = proxy.on_install().await;
    json_result(&outcome)
}

/// Run the activate hook.
pub async fn activate_impl(proxy: &InterceptionProxy) -> Result<CallToolResult, McpError> {
    let outcome = proxy.on_activate().await;
    json_result(&outcome)
}
