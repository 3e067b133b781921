//! worker_install tool implementation.
//!
//! Precaches the configured manifest into the current static cache.

use offline_client::{CacheController, Network};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Output from the worker_install tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerInstallOutput {
    /// Static cache that received the entries.
    pub cache: String,
    /// Absolute URLs stored, in manifest order.
    pub entries: Vec<String>,
    pub skip_waiting: bool,
    /// Lifecycle state after install.
    pub state: String,
}

/// Implementation of the worker_install tool.
pub async fn install_impl<N: Network>(controller: &CacheController<N>) -> Result<CallToolResult, McpError> {
    let outcome = controller.install().await?;

    let output = WorkerInstallOutput {
        cache: outcome.cache,
        entries: outcome.entries,
        skip_waiting: outcome.skip_waiting,
        state: controller.state().await.as_str().to_string(),
    };
    json_result(&output)
}
