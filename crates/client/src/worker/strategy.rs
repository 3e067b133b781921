//! Network-first, cache-first and passthrough strategies.

use offline_core::{Error, ResponseType, StoredResponse};
use reqwest::Url;

use super::{CacheController, InterceptedRequest, ResponseSource, Route, WorkerResponse};
use crate::fetch::Network;

const OFFLINE_HTML: &str = "<!doctype html><html><head><meta charset=\"utf-8\"><title>Offline</title></head>\
<body><h1>You are offline</h1><p>This page has not been saved for offline use yet.</p></body></html>";

/// Generated 503 page for navigations with nothing cached.
pub fn offline_response(url: &Url) -> StoredResponse {
    StoredResponse {
        url: url.to_string(),
        status: 503,
        status_text: "Service Unavailable".into(),
        response_type: ResponseType::Basic,
        redirected: false,
        headers: vec![
            ("content-type".into(), "text/html; charset=utf-8".into()),
            ("cache-control".into(), "no-store".into()),
        ],
        body: OFFLINE_HTML.as_bytes().to_vec(),
    }
}

impl<N: Network> CacheController<N> {
    /// Forward to the network; no cache read or write.
    pub(crate) async fn passthrough(&self, route: Route, request: &InterceptedRequest) -> Result<WorkerResponse, Error> {
        let response = self.network.fetch(&request.to_fetch()).await?;
        Ok(WorkerResponse { route, source: ResponseSource::Network, response: response.to_stored() })
    }

    /// Prefer the network; fall back to the exact cached entry, then the app
    /// shell, then the offline page.
    pub(crate) async fn network_first(&self, request: &InterceptedRequest) -> Result<WorkerResponse, Error> {
        let route = Route::NetworkFirst;

        let err = match self.network.fetch(&request.to_fetch()).await {
            Ok(response) => {
                let stored = response.to_stored();
                if stored.is_ok() {
                    self.store_in_background(self.config.names.dynamic_name(), &request.url, stored.clone())
                        .await;
                }
                return Ok(WorkerResponse { route, source: ResponseSource::Network, response: stored });
            }
            Err(err) => err,
        };

        tracing::debug!(url = %request.url, error = %err, "network failed, trying cache");

        if let Some(hit) = self.storage.match_any("GET", request.url.as_str()).await? {
            return Ok(WorkerResponse { route, source: ResponseSource::Cache, response: hit });
        }

        if let Some(shell) = self.storage.match_any("GET", self.config.shell_url.as_str()).await? {
            tracing::debug!(url = %request.url, shell = %self.config.shell_url, "serving app shell");
            return Ok(WorkerResponse { route, source: ResponseSource::Cache, response: shell });
        }

        if self.config.offline_page {
            tracing::warn!(url = %request.url, "app shell not cached, serving offline page");
            return Ok(WorkerResponse { route, source: ResponseSource::Offline, response: offline_response(&request.url) });
        }

        Err(Error::Offline(format!("{}: {err}", request.url)))
    }

    /// Serve from any cache; on a miss fetch and keep a copy of valid
    /// same-origin responses.
    pub(crate) async fn cache_first(&self, request: &InterceptedRequest) -> Result<WorkerResponse, Error> {
        let route = Route::CacheFirst;

        if let Some(hit) = self.storage.match_any("GET", request.url.as_str()).await? {
            tracing::debug!(url = %request.url, "cache hit");
            return Ok(WorkerResponse { route, source: ResponseSource::Cache, response: hit });
        }

        tracing::debug!(url = %request.url, "cache miss");

        let stored = self.network.fetch(&request.to_fetch()).await?.to_stored();
        if stored.is_cacheable() {
            self.store_in_background(self.config.names.static_name(), &request.url, stored.clone())
                .await;
        }

        Ok(WorkerResponse { route, source: ResponseSource::Network, response: stored })
    }
}
