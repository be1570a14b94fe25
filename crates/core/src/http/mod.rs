//! Request and response model shared by the proxy, its network layer and the cache.
//!
//! Header names are case-insensitive; lookups go through [`header_value`].

pub mod url;

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use self::url::{UrlError, canonicalize, is_same_origin, resolve};

/// Header map (name -> value). Names keep the casing they arrived with.
pub type Headers = BTreeMap<String, String>;

/// The one method excluded from caching.
pub const WRITE_METHOD: &str = "POST";

/// Case-insensitive header lookup.
pub fn header_value<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// An outgoing request intercepted by the proxy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProxyRequest {
    /// HTTP method, e.g. `GET`.
    pub method: String,
    /// Target URL. Relative URLs are resolved against the page origin by the proxy.
    pub url: String,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub body: Option<Vec<u8>>,
}

impl ProxyRequest {
    /// A request with no headers and no body.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self { method: method.into(), url: url.into(), headers: Headers::new(), body: None }
    }

    /// A GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// A POST request carrying `body`.
    pub fn post(url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new("POST", url).with_body(body)
    }

    /// Add or replace a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attach a request body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }

    /// Uppercased method, as used for cache keys and routing.
    pub fn normalized_method(&self) -> String {
        self.method.trim().to_ascii_uppercase()
    }

    /// Whether the method implies server-side state mutation.
    pub fn is_write(&self) -> bool {
        self.method.trim().eq_ignore_ascii_case(WRITE_METHOD)
    }
}

/// A response, either live from the network or replayed from a bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProxyResponse {
    /// URL the response was served from (after redirects).
    pub url: String,
    pub status: u16,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub body: Vec<u8>,
}

impl ProxyResponse {
    pub fn new(url: impl Into<String>, status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { url: url.into(), status, headers: Headers::new(), body: body.into() }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        header_value(&self.headers, name)
    }

    /// Lowercased header names listed in `Vary`.
    pub fn vary_names(&self) -> Vec<String> {
        self.header("vary")
            .map(|v| {
                v.split(',')
                    .map(|name| name.trim().to_ascii_lowercase())
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `Vary: *` responses can never be matched again.
    pub fn varies_on_everything(&self) -> bool {
        self.vary_names().iter().any(|name| name == "*")
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_case_insensitive() {
        let req = ProxyRequest::get("https://example.com/").with_header("Accept-Language", "en");
        assert_eq!(req.header("accept-language"), Some("en"));
        assert_eq!(req.header("ACCEPT-LANGUAGE"), Some("en"));
        assert_eq!(req.header("accept"), None);
    }

    #[test]
    fn test_is_write() {
        assert!(ProxyRequest::new("POST", "/").is_write());
        assert!(ProxyRequest::new("post", "/").is_write());
        assert!(!ProxyRequest::new("PUT", "/").is_write());
        assert!(!ProxyRequest::get("/").is_write());
    }

    #[test]
    fn test_normalized_method() {
        assert_eq!(ProxyRequest::new(" get ", "/").normalized_method(), "GET");
    }

    #[test]
    fn test_vary_names() {
        let resp = ProxyResponse::new("https://example.com/", 200, "ok").with_header("Vary", "Accept-Encoding, Origin");
        assert_eq!(resp.vary_names(), vec!["accept-encoding".to_string(), "origin".to_string()]);
        assert!(!resp.varies_on_everything());
    }

    #[test]
    fn test_vary_star() {
        let resp = ProxyResponse::new("https://example.com/", 200, "ok").with_header("vary", "*");
        assert!(resp.varies_on_everything());
    }

    #[test]
    fn test_body_text_lossy() {
        let resp = ProxyResponse::new("https://example.com/", 200, vec![0x68, 0x69, 0xff]);
        assert_eq!(resp.body_text(), "hi\u{fffd}");
    }
}
