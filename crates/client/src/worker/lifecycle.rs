//! Install and activate.

use futures_util::future::{join_all, try_join_all};
use serde::Serialize;

use offline_core::{Error, StoredResponse};

use super::CacheController;
use crate::fetch::{FetchRequest, Network, resolve};

/// Lifecycle state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    /// Constructed, install not attempted.
    Parsed,
    Installing,
    /// Precache complete, waiting for activation.
    Installed,
    Activating,
    /// Controlling requests.
    Activated,
    /// Install failed; caches from the previous version stay in use.
    Redundant,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        }
    }
}

/// Result of a successful install.
#[derive(Debug, Clone, Serialize)]
pub struct InstallOutcome {
    pub cache: String,
    /// Absolute URLs stored.
    pub entries: Vec<String>,
    /// Activate without waiting for existing clients to close.
    pub skip_waiting: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedDeletion {
    pub cache: String,
    pub reason: String,
}

/// Result of activation cleanup.
#[derive(Debug, Clone, Serialize)]
pub struct ActivateOutcome {
    pub kept: Vec<String>,
    pub deleted: Vec<String>,
    pub failed: Vec<FailedDeletion>,
    /// Take control of already open clients.
    pub claim_clients: bool,
}

impl<N: Network> CacheController<N> {
    /// Precache the static asset manifest.
    ///
    /// Every entry is fetched before anything is written; the writes then
    /// land in one transaction, so a failed install stores nothing.
    ///
    /// # Errors
    ///
    /// - `InvalidState` unless the controller is `Parsed` or `Redundant`
    /// - `InstallFailed` if any entry cannot be fetched or is not OK
    /// - storage errors from opening or writing the static cache
    pub async fn install(&self) -> Result<InstallOutcome, Error> {
        {
            let mut state = self.state.write().await;
            if !matches!(*state, WorkerState::Parsed | WorkerState::Redundant) {
                return Err(Error::InvalidState(format!("cannot install while {:?}", *state)));
            }
            *state = WorkerState::Installing;
        }

        let cache_name = self.config.names.static_name().to_string();
        tracing::info!(cache = %cache_name, entries = self.config.manifest.len(), "installing");

        match self.precache(&cache_name).await {
            Ok(entries) => {
                *self.state.write().await = WorkerState::Installed;
                tracing::info!(cache = %cache_name, entries = entries.len(), "installed");
                Ok(InstallOutcome { cache: cache_name, entries, skip_waiting: true })
            }
            Err(e) => {
                *self.state.write().await = WorkerState::Redundant;
                if e.is_storage() {
                    tracing::error!(cache = %cache_name, error = %e, "install failed writing cache");
                } else {
                    tracing::warn!(cache = %cache_name, error = %e, "install failed");
                }
                Err(e)
            }
        }
    }

    async fn precache(&self, cache_name: &str) -> Result<Vec<String>, Error> {
        let mut urls = Vec::with_capacity(self.config.manifest.len());
        for path in &self.config.manifest {
            let url = resolve(&self.config.origin, path).map_err(|e| Error::InstallFailed {
                url: path.clone(),
                reason: e.to_string(),
            })?;
            if !urls.contains(&url) {
                urls.push(url);
            }
        }

        let fetched = try_join_all(urls.iter().map(|url| async move {
            let response = self
                .network
                .fetch(&FetchRequest::get(url.clone()))
                .await
                .map_err(|e| Error::InstallFailed { url: url.to_string(), reason: e.to_string() })?;

            if !response.status.is_success() {
                return Err(Error::InstallFailed {
                    url: url.to_string(),
                    reason: format!("status {}", response.status.as_u16()),
                });
            }

            Ok::<(String, StoredResponse), Error>((url.to_string(), response.to_stored()))
        }))
        .await?;

        let entries = fetched.iter().map(|(url, _)| url.clone()).collect();

        let cache = self.storage.open_cache(cache_name).await?;
        cache.put_all(fetched).await?;

        Ok(entries)
    }

    /// Delete every cache outside the current allow-list.
    ///
    /// Deletions run concurrently and independently; a failed deletion is
    /// reported in the outcome but does not fail activation.
    ///
    /// # Errors
    ///
    /// - `InvalidState` unless the controller is `Installed`
    /// - storage errors from listing caches
    pub async fn activate(&self) -> Result<ActivateOutcome, Error> {
        {
            let mut state = self.state.write().await;
            if *state != WorkerState::Installed {
                return Err(Error::InvalidState(format!("cannot activate while {:?}", *state)));
            }
            *state = WorkerState::Activating;
        }

        let names = match self.storage.keys().await {
            Ok(names) => names,
            Err(e) => {
                *self.state.write().await = WorkerState::Installed;
                return Err(e);
            }
        };

        let (kept, stale): (Vec<String>, Vec<String>) =
            names.into_iter().partition(|name| self.config.names.is_current(name));

        let results = join_all(stale.into_iter().map(|name| async move {
            let result = self.storage.delete(&name).await;
            (name, result)
        }))
        .await;

        let mut deleted = Vec::new();
        let mut failed = Vec::new();
        for (name, result) in results {
            match result {
                Ok(true) => {
                    tracing::info!(cache = %name, "deleted stale cache");
                    deleted.push(name);
                }
                Ok(false) => tracing::debug!(cache = %name, "stale cache already gone"),
                Err(e) => {
                    tracing::warn!(cache = %name, error = %e, "failed to delete stale cache");
                    failed.push(FailedDeletion { cache: name, reason: e.to_string() });
                }
            }
        }

        *self.state.write().await = WorkerState::Activated;
        tracing::info!(kept = kept.len(), deleted = deleted.len(), failed = failed.len(), "activated");

        Ok(ActivateOutcome { kept, deleted, failed, claim_clients: true })
    }
}
