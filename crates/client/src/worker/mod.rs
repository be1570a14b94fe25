//! Interception cache proxy.
//!
//! ### Lifecycle
//! - `on_install`: no pre-caching; asks the host to skip the waiting phase.
//! - `on_activate`: deletes every bucket except the current generation and
//!   claims open pages. Never fails; storage errors are logged.
//! - `intercept`: network-first for same-origin reads, cache fallback when the
//!   network is unreachable, direct network for cross-origin and POST.
//!
//! ### Concurrency
//! Requests are handled independently. Concurrent requests for the same URL
//! each fetch and each store; the last write wins.

pub mod lifecycle;
pub mod policy;

use std::sync::Arc;

use netfirst_core::config::ConfigError;
use netfirst_core::http::resolve;
use netfirst_core::{AppConfig, Bucket, CacheDb, CacheMatch, Error, ProxyRequest, ProxyResponse};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use url::{Origin, Url};

use crate::fetch::Network;

pub use lifecycle::{ActivateOutcome, InstallOutcome, WorkerState};
pub use policy::{Route, route};

/// Status code of partial responses, which are never stored.
const PARTIAL_CONTENT: u16 = 206;

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Network,
    Cache,
}

/// A response handed back to the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub response: ProxyResponse,
    pub source: ResponseSource,
}

impl Served {
    fn network(response: ProxyResponse) -> Self {
        Self { response, source: ResponseSource::Network }
    }

    fn cache(response: ProxyResponse) -> Self {
        Self { response, source: ResponseSource::Cache }
    }
}

/// Network-first proxy bound to one cache generation and one page origin.
#[derive(Clone)]
pub struct InterceptionProxy {
    cache: CacheDb,
    network: Arc<dyn Network>,
    generation: String,
    page_url: Url,
    page_origin: Origin,
    state: Arc<RwLock<WorkerState>>,
}

impl InterceptionProxy {
    /// Create a proxy for the page at `page_url` using the `generation` bucket.
    pub fn new(cache: CacheDb, network: Arc<dyn Network>, generation: impl Into<String>, page_url: Url) -> Self {
        let page_origin = page_url.origin();
        Self {
            cache,
            network,
            generation: generation.into(),
            page_url,
            page_origin,
            state: Arc::new(RwLock::new(WorkerState::Parsed)),
        }
    }

    /// Create a proxy from loaded application configuration.
    pub fn from_config(cache: CacheDb, network: Arc<dyn Network>, config: &AppConfig) -> Result<Self, ConfigError> {
        config.page_origin()?;
        let page_url = Url::parse(&config.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;
        Ok(Self::new(cache, network, config.generation.clone(), page_url))
    }

    /// Name of the bucket this proxy reads and writes.
    pub fn generation(&self) -> &str {
        &self.generation
    }

    /// Origin of the controlled page; only same-origin reads are cached.
    pub fn page_origin(&self) -> &Origin {
        &self.page_origin
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    /// Install hook. Nothing is pre-cached.
    pub async fn on_install(&self) -> InstallOutcome {
        let state = {
            let mut state = self.state.write().await;
            *state = state.after_install();
            *state
        };

        tracing::info!(generation = %self.generation, "installed; skipping wait");

        InstallOutcome {
            generation: self.generation.clone(),
            skip_waiting: true,
            state,
            installed_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Activate hook: roll over to the current generation and claim open pages.
    pub async fn on_activate(&self) -> ActivateOutcome {
        let (deleted, failed) = self.delete_stale_buckets().await;

        *self.state.write().await = WorkerState::Activated;

        tracing::info!(
            generation = %self.generation,
            deleted = deleted.len(),
            failed = failed.len(),
            "activated; claimed clients"
        );

        ActivateOutcome {
            generation: self.generation.clone(),
            deleted,
            failed,
            clients_claimed: true,
            state: WorkerState::Activated,
            activated_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    async fn delete_stale_buckets(&self) -> (Vec<String>, Vec<String>) {
        let names = match self.cache.bucket_names().await {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!(error = %e, "could not enumerate cache buckets");
                return (Vec::new(), Vec::new());
            }
        };

        let mut deleted = Vec::new();
        let mut failed = Vec::new();
        for name in names.into_iter().filter(|name| *name != self.generation) {
            match self.cache.delete_bucket(&name).await {
                Ok(true) => deleted.push(name),
                Ok(false) => tracing::debug!(bucket = %name, "bucket already gone"),
                Err(e) => {
                    tracing::warn!(bucket = %name, error = %e, "failed to delete stale bucket");
                    failed.push(name);
                }
            }
        }

        (deleted, failed)
    }

    /// Handle one outgoing request from the page.
    ///
    /// # Errors
    ///
    /// - `Error::NotFoundInCache` when the network is unreachable and nothing is cached
    /// - `Error::Network` when a cross-origin or POST request fails on the network
    /// - `Error::InvalidUrl` / `Error::InvalidInput` for malformed requests
    /// - `Error::Database` and `Error::Encoding` from the cache storage
    pub async fn intercept(&self, request: ProxyRequest) -> Result<Served, Error> {
        let url = resolve(&request.url, &self.page_url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let request = ProxyRequest { url: url.to_string(), ..request };

        if !self.state().await.is_controlling() {
            tracing::debug!("not controlling yet, passing {} through", request.url);
            let response = self.network.fetch(&request).await?;
            return Ok(Served::network(response));
        }

        let bucket = self.cache.open_bucket(&self.generation).await?;

        let route = route(&self.page_origin, &url, request.is_write());
        tracing::debug!(route = route.as_str(), method = %request.method, url = %request.url, "intercepted");

        if route.caches() {
            self.network_first(&bucket, &request).await
        } else {
            let response = self.network.fetch(&request).await?;
            Ok(Served::network(response))
        }
    }

    /// Look a request up in the current bucket without touching the network.
    ///
    /// A bucket that does not exist yet is a miss and is not created.
    pub async fn lookup(&self, request: &ProxyRequest) -> Result<CacheMatch, Error> {
        let url = resolve(&request.url, &self.page_url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        if !self.cache.has_bucket(&self.generation).await? {
            return Ok(CacheMatch::Miss);
        }

        let request = ProxyRequest { url: url.to_string(), ..request.clone() };
        let bucket = self.cache.open_bucket(&self.generation).await?;
        bucket.match_request(&request).await
    }

    async fn network_first(&self, bucket: &Bucket, request: &ProxyRequest) -> Result<Served, Error> {
        match self.network.fetch(request).await {
            Ok(response) => {
                if response.status == PARTIAL_CONTENT {
                    tracing::debug!("not storing partial response for {}", request.url);
                } else if bucket.put(request, &response).await? {
                    tracing::debug!(bucket = bucket.name(), "stored {} ({})", request.url, response.status);
                }
                Ok(Served::network(response))
            }
            Err(err) if err.is_connectivity() => {
                tracing::warn!(url = %request.url, error = %err, "network failed, trying cache");
                match bucket.match_request(request).await? {
                    CacheMatch::Hit(response) => {
                        tracing::debug!(bucket = bucket.name(), "cache hit for {}", request.url);
                        Ok(Served::cache(response))
                    }
                    CacheMatch::Miss => Err(Error::NotFoundInCache(request.url.clone())),
                }
            }
            Err(err) => Err(err.into()),
        }
    }
}
