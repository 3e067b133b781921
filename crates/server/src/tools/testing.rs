//! Shared fixtures for tool tests.

use offline_client::{CacheController, ControllerConfig, FetchClient, FetchConfig};
use offline_core::{CacheNames, CacheStorage, ResponseType, StoredResponse};
use rmcp::model::CallToolResult;
use serde::de::DeserializeOwned;
use url::Url;

/// Controller for `origin` backed by the real fetch client and an in-memory
/// database.
pub(crate) async fn controller_for(origin: &str, manifest: &[&str]) -> CacheController<FetchClient> {
    let origin = Url::parse(origin).unwrap();
    let config = ControllerConfig {
        names: CacheNames::new("v1", "static", "dynamic", "resume-analyzer"),
        origin: origin.clone(),
        api_prefix: "/api/".into(),
        shell_url: origin.join("/").unwrap(),
        offline_page: true,
        manifest: manifest.iter().map(|p| p.to_string()).collect(),
    };
    let network = FetchClient::new(FetchConfig { origin, ..Default::default() }).unwrap();
    let storage = CacheStorage::open_in_memory().await.unwrap();
    CacheController::new(config, storage, network)
}

pub(crate) fn page(url: &str, body: &str) -> StoredResponse {
    StoredResponse {
        url: url.to_string(),
        status: 200,
        status_text: "OK".into(),
        response_type: ResponseType::Basic,
        redirected: false,
        headers: vec![("content-type".into(), "text/html".into())],
        body: body.as_bytes().to_vec(),
    }
}

/// Decode the JSON text content of a tool result.
pub(crate) fn output<T: DeserializeOwned>(result: &CallToolResult) -> T {
    let content = serde_json::to_value(&result.content[0]).unwrap();
    let text = content
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
