//! MCP tool implementations.
//!
//! This module contains all tools exposed by the mcp-offline server.

pub mod cache;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

use offline_core::StoredResponse;
use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// A stored or fetched response as returned to MCP clients.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResponseView {
    /// Final URL of the response.
    pub url: String,
    pub status: u16,
    pub status_text: String,
    /// `basic` for same-origin, `cors` otherwise.
    pub response_type: String,
    pub redirected: bool,
    pub headers: Vec<(String, String)>,
    /// Body decoded as UTF-8, lossily.
    pub body: String,
    /// Body size in bytes.
    pub size: usize,
}

impl From<&StoredResponse> for ResponseView {
    fn from(response: &StoredResponse) -> Self {
        Self {
            url: response.url.clone(),
            status: response.status,
            status_text: response.status_text.clone(),
            response_type: response.response_type.to_string(),
            redirected: response.redirected,
            headers: response.headers.clone(),
            body: String::from_utf8_lossy(&response.body).into_owned(),
            size: response.body.len(),
        }
    }
}

/// Pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(ToolError::from)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
