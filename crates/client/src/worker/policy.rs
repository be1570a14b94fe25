//! Routing decision for an intercepted request.

use netfirst_core::http::is_same_origin;
use url::{Origin, Url};

/// How the proxy handles a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Target is on another origin: straight to the network, never cached.
    CrossOrigin,
    /// Same origin but a write method: straight to the network, never cached.
    WriteMethod,
    /// Same-origin read: network first, store on success, cache on failure.
    NetworkFirst,
}

impl Route {
    /// Whether responses on this route are stored and used as a fallback.
    pub fn caches(self) -> bool {
        matches!(self, Route::NetworkFirst)
    }

    /// Short label used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Route::CrossOrigin => "cross-origin",
            Route::WriteMethod => "write-method",
            Route::NetworkFirst => "network-first",
        }
    }
}

/// Decide the route for `url` requested with `is_write` semantics from a page on `page_origin`.
pub fn route(page_origin: &Origin, url: &Url, is_write: bool) -> Route {
    if !is_same_origin(url, page_origin) {
        Route::CrossOrigin
    } else if is_write {
        Route::WriteMethod
    } else {
        Route::NetworkFirst
    }
}
