//! cache_purge tool implementation.
//!
//! Purges stale caches, a named cache, or entries older than a given age.

use chrono::{Duration, Utc};
use offline_client::{CacheController, Network};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Delete every cache that does not belong to the current version.
    #[serde(default)]
    pub stale: bool,

    /// Delete this cache and all of its entries.
    #[serde(default)]
    pub cache: Option<String>,

    /// Delete entries stored more than this many days ago, in any cache.
    #[serde(default)]
    pub older_than_days: Option<i64>,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Caches removed entirely.
    pub deleted_caches: Vec<String>,
    /// Entries removed by age.
    pub deleted_entries: u64,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl<N: Network>(
    controller: &CacheController<N>, params: CachePurgeParams,
) -> Result<CallToolResult, McpError> {
    if !params.stale && params.cache.is_none() && params.older_than_days.is_none() {
        return Err(ToolError::InvalidInput(
            "At least one of stale, cache, or older_than_days must be specified".to_string(),
        )
        .into());
    }
    if params.older_than_days.is_some_and(|days| days < 0) {
        return Err(ToolError::InvalidInput("older_than_days must not be negative".to_string()).into());
    }

    // Resolved before any deletion so an out-of-range age changes nothing.
    let cutoff = match params.older_than_days {
        Some(days) => Some(
            Duration::try_days(days)
                .and_then(|age| Utc::now().checked_sub_signed(age))
                .ok_or_else(|| ToolError::InvalidInput(format!("older_than_days out of range: {days}")))?,
        ),
        None => None,
    };

    let storage = controller.storage();
    let names = &controller.config().names;
    let mut deleted_caches = Vec::new();

    if params.stale {
        for name in storage.keys().await? {
            if !names.is_current(&name) && storage.delete(&name).await? {
                deleted_caches.push(name);
            }
        }
    }

    if let Some(name) = params.cache {
        if names.is_current(&name) {
            tracing::warn!(cache = %name, "purging a current cache");
        }
        if storage.delete(&name).await? && !deleted_caches.contains(&name) {
            deleted_caches.push(name);
        }
    }

    let mut deleted_entries = 0u64;
    if let Some(cutoff) = cutoff {
        deleted_entries = storage.purge_entries_before(cutoff).await?;
    }

    tracing::info!(caches = deleted_caches.len(), entries = deleted_entries, "purged");

    json_result(&CachePurgeOutput { deleted_caches, deleted_entries })
}
