//! cache_list tool implementation.

use offline_client::{CacheController, Network};
use offline_core::CacheKind;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListEntry {
    pub name: String,
    pub entries: u64,
    pub created_at: String,
    /// Role of the cache when it belongs to the current version.
    pub kind: Option<CacheKind>,
    /// False for caches that activation would delete.
    pub current: bool,
}

/// Output from the cache_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheListOutput {
    pub version: String,
    pub caches: Vec<CacheListEntry>,
}

/// Implementation of the cache_list tool.
pub async fn list_impl<N: Network>(controller: &CacheController<N>) -> Result<CallToolResult, McpError> {
    let names = &controller.config().names;
    let caches = controller
        .storage()
        .summaries()
        .await?
        .into_iter()
        .map(|s| CacheListEntry {
            kind: names.kind_of(&s.name),
            current: names.is_current(&s.name),
            name: s.name,
            entries: s.entries,
            created_at: s.created_at,
        })
        .collect();

    json_result(&CacheListOutput { version: names.version().to_string(), caches })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{controller_for, output, page};

    #[tokio::test]
    async fn test_list_impl_empty() {
        let controller = controller_for("http://127.0.0.1:9", &[]).await;
        let out: CacheListOutput = output(&list_impl(&controller).await.unwrap());
        assert_eq!(out.version, "v1");
        assert!(out.caches.is_empty());
    }

    #[tokio::test]
    async fn test_list_impl_marks_current_and_stale() {
        let controller = controller_for("http://127.0.0.1:9", &[]).await;
        let storage = controller.storage();
        let url = "http://127.0.0.1:9/";
        storage.open_cache("static-v1").await.unwrap().put("GET", url, &page(url, "a")).await.unwrap();
        storage.open_cache("static-v0").await.unwrap();
        storage.open_cache("resume-analyzer-v1").await.unwrap();

        let out: CacheListOutput = output(&list_impl(&controller).await.unwrap());

        assert_eq!(out.caches.len(), 3);
        assert_eq!(out.caches[0].name, "static-v1");
        assert_eq!(out.caches[0].entries, 1);
        assert_eq!(out.caches[0].kind, Some(CacheKind::Static));
        assert!(out.caches[0].current);
        assert!(!out.caches[1].current);
        assert_eq!(out.caches[1].kind, None);
        assert_eq!(out.caches[2].kind, Some(CacheKind::Umbrella));
        assert!(out.caches[2].current);
    }
}
