//! Per-request strategy selection.

use reqwest::{Method, Url};

use super::request::InterceptedRequest;
use crate::fetch::same_origin;

/// Why a request skipped the caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bypass {
    /// The controller is not active yet.
    Uncontrolled,
    /// Not a GET.
    Method,
    /// Backend API call.
    Api,
    /// Different origin.
    CrossOrigin,
}

/// Strategy chosen for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Passthrough(Bypass),
    NetworkFirst,
    CacheFirst,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Passthrough(Bypass::Uncontrolled) => "passthrough:uncontrolled",
            Route::Passthrough(Bypass::Method) => "passthrough:method",
            Route::Passthrough(Bypass::Api) => "passthrough:api",
            Route::Passthrough(Bypass::CrossOrigin) => "passthrough:cross-origin",
            Route::NetworkFirst => "network-first",
            Route::CacheFirst => "cache-first",
        }
    }
}

/// Pick a strategy. Rules apply in order; the first match wins.
pub fn route(request: &InterceptedRequest, origin: &Url, api_prefix: &str) -> Route {
    if request.method != Method::GET {
        return Route::Passthrough(Bypass::Method);
    }
    if request.url.path().starts_with(api_prefix) {
        return Route::Passthrough(Bypass::Api);
    }
    if !same_origin(&request.url, origin) {
        return Route::Passthrough(Bypass::CrossOrigin);
    }
    if request.is_document() {
        return Route::NetworkFirst;
    }
    Route::CacheFirst
}
