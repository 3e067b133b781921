//! cache_get tool implementation.
//!
//! Looks up a stored GET response by URL in one cache or across all of them.

use offline_client::{CacheController, InterceptedRequest, Network};
use offline_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::{ResponseView, json_result};

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Absolute URL, or a path resolved against the configured origin.
    pub url: String,

    /// Restrict the lookup to this cache. Searches every cache when absent.
    #[serde(default)]
    pub cache: Option<String>,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    /// Request URL the entry is keyed by.
    pub url: String,
    pub response: ResponseView,
}

/// Implementation of the cache_get tool.
pub async fn get_impl<N: Network>(
    controller: &CacheController<N>, params: CacheGetParams,
) -> Result<CallToolResult, McpError> {
    let url = InterceptedRequest::from_parts(&controller.config().origin, "GET", &params.url)?.url;
    let storage = controller.storage();

    let response = match params.cache.as_deref() {
        Some(name) => {
            if !storage.has(name).await? {
                return Err(Error::CacheMiss(format!("no cache named {name}")).into());
            }
            storage.open_cache(name).await?.match_request("GET", url.as_str()).await?
        }
        None => storage.match_any("GET", url.as_str()).await?,
    }
    .ok_or_else(|| Error::CacheMiss(url.to_string()))?;

    json_result(&CacheGetOutput { url: url.to_string(), response: ResponseView::from(&response) })
}
