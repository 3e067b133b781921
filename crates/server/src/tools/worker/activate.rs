//! worker_activate tool implementation.
//!
//! Deletes caches outside the current version's allow-list.

use offline_client::{CacheController, Network};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Output from the worker_activate tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerActivateOutput {
    /// Current caches left in place.
    pub kept: Vec<String>,
    pub deleted: Vec<String>,
    /// Stale caches that could not be deleted, with the reason.
    pub failed: Vec<(String, String)>,
    pub claim_clients: bool,
    pub state: String,
}

/// Implementation of the worker_activate tool.
pub async fn activate_impl<N: Network>(controller: &CacheController<N>) -> Result<CallToolResult, McpError> {
    let outcome = controller.activate().await?;

    let output = WorkerActivateOutput {
        kept: outcome.kept,
        deleted: outcome.deleted,
        failed: outcome.failed.into_iter().map(|f| (f.cache, f.reason)).collect(),
        claim_clients: outcome.claim_clients,
        state: controller.state().await.as_str().to_string(),
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{controller_for, output, page};
    use crate::tools::worker::install_impl;
    use rmcp::model::ErrorCode;

    #[tokio::test]
    async fn test_activate_impl_removes_stale_caches() {
        let controller = controller_for("http://127.0.0.1:9", &[]).await;
        let storage = controller.storage();
        storage
            .open_cache("static-v0")
            .await
            .unwrap()
            .put("GET", "http://127.0.0.1:9/", &page("http://127.0.0.1:9/", "old"))
            .await
            .unwrap();
        storage.open_cache("dynamic-v1").await.unwrap();

        install_impl(&controller).await.unwrap();
        let result = activate_impl(&controller).await.unwrap();
        let out: WorkerActivateOutput = output(&result);

        assert_eq!(out.deleted, vec!["static-v0".to_string()]);
        assert!(out.kept.contains(&"dynamic-v1".to_string()));
        assert!(out.kept.contains(&"static-v1".to_string()));
        assert!(out.failed.is_empty());
        assert_eq!(out.state, "activated");
        assert!(!storage.has("static-v0").await.unwrap());
    }

    #[tokio::test]
    async fn test_activate_impl_before_install() {
        let controller = controller_for("http://127.0.0.1:9", &[]).await;
        let err = activate_impl(&controller).await.unwrap_err();
        assert_eq!(err.code, ErrorCode(-32021));
    }
}
