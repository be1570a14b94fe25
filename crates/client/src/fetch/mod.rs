//! Network layer consumed by the proxy.
//!
//! ### Contract
//! - A response with any HTTP status is a success; only transport failures are errors.
//! - Connectivity failures (connect refused, DNS, timeout, broken body) are
//!   reported as [`NetworkError`] variants the proxy may recover from.
//! - Malformed requests are reported as [`NetworkError::InvalidRequest`] and never
//!   trigger cache fallback.
//!
//! ### Limits
//! - Request timeout: 20s (configurable)
//! - Max redirects: 5 (configurable)

use std::time::{Duration, Instant};

use netfirst_core::{AppConfig, Error, Headers, ProxyRequest, ProxyResponse};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, SET_COOKIE};
use reqwest::{Client, Method};

/// Error type for network operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum NetworkError {
    #[error("unreachable: {0}")]
    Unreachable(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl NetworkError {
    /// Whether the failure means the network could not deliver a response.
    pub fn is_connectivity(&self) -> bool {
        !matches!(self, NetworkError::InvalidRequest(_))
    }
}

impl From<NetworkError> for Error {
    fn from(err: NetworkError) -> Self {
        match err {
            NetworkError::InvalidRequest(msg) => Error::InvalidInput(msg),
            other => Error::Network(other.to_string()),
        }
    }
}

/// Network collaborator used by the proxy.
#[async_trait::async_trait]
pub trait Network: Send + Sync {
    /// Issue the request and return whatever response the server sent.
    async fn fetch(&self, request: &ProxyRequest) -> Result<ProxyResponse, NetworkError>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "netfirst/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "netfirst/0.1".to_string(), timeout: Duration::from_millis(20000), max_redirects: 5 }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), max_redirects: config.max_redirects }
    }
}

/// reqwest-backed [`Network`] implementation.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpClient(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn build_headers(headers: &Headers) -> Result<HeaderMap, NetworkError> {
        let mut map = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| NetworkError::InvalidRequest(format!("header name {name:?}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| NetworkError::InvalidRequest(format!("header value for {name}: {e}")))?;
            map.append(name, value);
        }
        Ok(map)
    }
}

/// Collapse a reqwest header map, joining repeated names with ", ".
///
/// `set-cookie` values may contain commas, so they are joined with a newline
/// instead; a newline can never appear inside a header value.
fn collect_headers(map: &HeaderMap) -> Headers {
    let mut headers = Headers::new();
    for (name, value) in map {
        let separator = if *name == SET_COOKIE { "\n" } else { ", " };
        let value = String::from_utf8_lossy(value.as_bytes()).to_string();
        headers
            .entry(name.as_str().to_string())
            .and_modify(|existing: &mut String| {
                existing.push_str(separator);
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    headers
}

fn classify(err: reqwest::Error) -> NetworkError {
    if err.is_builder() {
        NetworkError::InvalidRequest(err.to_string())
    } else if err.is_timeout() {
        NetworkError::Timeout(err.to_string())
    } else if err.is_connect() {
        NetworkError::Unreachable(err.to_string())
    } else {
        NetworkError::Protocol(err.to_string())
    }
}

#[async_trait::async_trait]
impl Network for FetchClient {
    async fn fetch(&self, request: &ProxyRequest) -> Result<ProxyResponse, NetworkError> {
        let start = Instant::now();
        let method = Method::from_bytes(request.normalized_method().as_bytes())
            .map_err(|e| NetworkError::InvalidRequest(format!("method {:?}: {e}", request.method)))?;
        let url = reqwest::Url::parse(&request.url).map_err(|e| NetworkError::InvalidRequest(e.to_string()))?;

        let mut builder = self.http.request(method, url).headers(Self::build_headers(&request.headers)?);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(classify)?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = collect_headers(response.headers());
        let body = response.bytes().await.map_err(classify)?;

        tracing::debug!(
            "fetched {} {} -> {} ({}) in {}ms ({} bytes)",
            request.normalized_method(),
            request.url,
            final_url,
            status,
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(ProxyResponse { url: final_url, status, headers, body: body.to_vec() })
    }
}
