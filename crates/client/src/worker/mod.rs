//! Offline cache controller.
//!
//! ### Lifecycle
//! - `install` precaches the static asset manifest into the current static
//!   cache and asks to skip waiting.
//! - `activate` deletes every cache outside the current allow-list and asks
//!   to claim open clients.
//!
//! ### Fetch interception
//! - Non-GET, API and cross-origin requests go straight to the network.
//! - Documents are network-first with cache and app-shell fallback.
//! - Everything else is cache-first with lazy population.
//!
//! Cache writes triggered by a fetch run on a spawned task; the response is
//! returned without waiting for them.

pub mod lifecycle;
pub mod request;
pub mod routing;
pub mod strategy;

#[cfg(test)]
pub(crate) mod testing;

use offline_core::{AppConfig, CacheNames, CacheStorage, Error, StoredResponse};
use reqwest::Url;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinSet;

use crate::fetch::{Network, resolve};

pub use lifecycle::{ActivateOutcome, FailedDeletion, InstallOutcome, WorkerState};
pub use request::{Destination, InterceptedRequest, RequestMode};
pub use routing::{Bypass, Route, route};

/// Everything the controller needs to know about the deployed version.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub names: CacheNames,
    pub origin: Url,
    pub api_prefix: String,
    /// Absolute URL of the app shell.
    pub shell_url: Url,
    pub offline_page: bool,
    /// Host-relative paths to precache.
    pub manifest: Vec<String>,
}

impl ControllerConfig {
    /// Build from application config, reading the manifest file if one is
    /// configured.
    pub fn from_app(config: &AppConfig) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.origin)))?;
        let shell_url = resolve(&origin, &config.shell_path).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let manifest = config.manifest().map_err(|e| Error::InvalidInput(e.to_string()))?;

        Ok(Self {
            names: config.cache_names(),
            origin,
            api_prefix: config.api_prefix.clone(),
            shell_url,
            offline_page: config.offline_page,
            manifest,
        })
    }
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    Cache,
    /// Generated when neither network nor cache could answer a navigation.
    Offline,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Network => "network",
            ResponseSource::Cache => "cache",
            ResponseSource::Offline => "offline",
        }
    }
}

/// Result of handling one intercepted request.
#[derive(Debug, Clone)]
pub struct WorkerResponse {
    pub route: Route,
    pub source: ResponseSource,
    pub response: StoredResponse,
}

/// Intercepts requests and keeps the versioned cache set consistent.
pub struct CacheController<N> {
    network: N,
    storage: CacheStorage,
    config: ControllerConfig,
    state: RwLock<WorkerState>,
    writes: Mutex<JoinSet<()>>,
}

impl<N: Network> CacheController<N> {
    pub fn new(config: ControllerConfig, storage: CacheStorage, network: N) -> Self {
        Self { network, storage, config, state: RwLock::new(WorkerState::Parsed), writes: Mutex::new(JoinSet::new()) }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn storage(&self) -> &CacheStorage {
        &self.storage
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    /// Handle one intercepted request.
    ///
    /// # Errors
    ///
    /// - `Network` when a bypassed or cache-first request cannot reach the
    ///   network
    /// - `Offline` when a navigation fails, nothing is cached and the offline
    ///   page is disabled
    /// - storage errors from cache lookups
    pub async fn handle_fetch(&self, request: &InterceptedRequest) -> Result<WorkerResponse, Error> {
        let route = if self.state().await == WorkerState::Activated {
            route(request, &self.config.origin, &self.config.api_prefix)
        } else {
            Route::Passthrough(Bypass::Uncontrolled)
        };

        tracing::debug!(method = %request.method, url = %request.url, route = route.as_str(), "intercepted request");

        match route {
            Route::Passthrough(_) => self.passthrough(route, request).await,
            Route::NetworkFirst => self.network_first(request).await,
            Route::CacheFirst => self.cache_first(request).await,
        }
    }

    /// Wait for every cache write started so far.
    pub async fn settle(&self) {
        let mut pending = std::mem::take(&mut *self.writes.lock().await);
        while let Some(result) = pending.join_next().await {
            if let Err(e) = result {
                tracing::warn!(error = %e, "cache write task failed");
            }
        }
    }

    /// Store a copy of `response` under `url` without blocking the caller.
    async fn store_in_background(&self, cache_name: &str, url: &Url, response: StoredResponse) {
        let storage = self.storage.clone();
        let cache_name = cache_name.to_string();
        let url = url.to_string();

        let mut writes = self.writes.lock().await;
        while writes.try_join_next().is_some() {}
        writes.spawn(async move {
            match put_entry(&storage, &cache_name, &url, &response).await {
                Ok(()) => tracing::debug!(cache = %cache_name, %url, "stored response"),
                Err(e) => tracing::warn!(cache = %cache_name, %url, error = %e, "failed to store response"),
            }
        });
    }
}

async fn put_entry(storage: &CacheStorage, cache_name: &str, url: &str, response: &StoredResponse) -> Result<(), Error> {
    let cache = storage.open_cache(cache_name).await?;
    cache.put("GET", url, response).await
}
