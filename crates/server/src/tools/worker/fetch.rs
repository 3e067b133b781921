//! worker_fetch tool implementation.
//!
//! Routes one request through the controller exactly as an intercepted
//! page request would be: passthrough, network-first or cache-first.

use std::collections::BTreeMap;

use offline_client::{CacheController, Destination, InterceptedRequest, Network, RequestMode};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ToolError;
use crate::tools::{ResponseView, json_result};

/// Parameters for the worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchParams {
    /// Absolute URL, or a path resolved against the configured origin.
    pub url: String,

    /// HTTP method (default: GET).
    #[serde(default = "default_method")]
    pub method: String,

    /// Request destination: document, script, style, image, font, manifest
    /// or other.
    #[serde(default)]
    pub destination: Option<String>,

    /// Request mode: navigate, same-origin, cors or no-cors.
    #[serde(default)]
    pub mode: Option<String>,

    /// Extra request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Request body, forwarded for non-GET requests.
    #[serde(default)]
    pub body: Option<String>,
}

fn default_method() -> String {
    "GET".into()
}

/// Output from the worker_fetch tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkerFetchOutput {
    /// Strategy chosen for the request.
    pub route: String,
    /// network, cache or offline.
    pub source: String,
    pub response: ResponseView,
}

/// Implementation of the worker_fetch tool.
pub async fn fetch_impl<N: Network>(
    controller: &CacheController<N>, params: WorkerFetchParams,
) -> Result<CallToolResult, McpError> {
    let request = build_request(controller, params)?;
    let served = controller.handle_fetch(&request).await?;

    let output = WorkerFetchOutput {
        route: served.route.as_str().to_string(),
        source: served.source.as_str().to_string(),
        response: ResponseView::from(&served.response),
    };
    json_result(&output)
}

fn build_request<N: Network>(
    controller: &CacheController<N>, params: WorkerFetchParams,
) -> Result<InterceptedRequest, McpError> {
    let mut request = InterceptedRequest::from_parts(&controller.config().origin, &params.method, &params.url)?;

    if let Some(destination) = params.destination.as_deref() {
        let destination: Destination = destination.parse().map_err(ToolError::InvalidInput)?;
        request = request.with_destination(destination);
    }

    if let Some(mode) = params.mode.as_deref() {
        let mode: RequestMode = mode.parse().map_err(ToolError::InvalidInput)?;
        request = request.with_mode(mode);
    }

    for (name, value) in &params.headers {
        request = request.with_header(name, value)?;
    }

    if let Some(body) = params.body {
        request = request.with_body(body);
    }

    Ok(request)
}
