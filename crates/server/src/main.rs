//! netfirst server entry point.
//!
//! Boots the host: loads configuration, opens the cache database, registers the
//! interception proxy (install, then activate immediately) and serves MCP on stdio.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use netfirst_client::{FetchClient, FetchConfig, InterceptionProxy};
use netfirst_core::{AppConfig, CacheDb};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(generation = %config.generation, origin = %config.origin, "Starting netfirst server on stdio transport");

    let cache = CacheDb::open(&config.db_path).await?;
    let network = Arc::new(FetchClient::new(FetchConfig::from(&config))?);
    let proxy = InterceptionProxy::from_config(cache.clone(), network, &config)?;

    let installed = proxy.on_install().await;
    if installed.skip_waiting {
        proxy.on_activate().await;
    }

    let handler = handler::NetfirstServer::new(proxy, cache);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;

    Ok(())
}
