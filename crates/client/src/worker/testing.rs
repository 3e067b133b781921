//! Scripted network for controller tests.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{StatusCode, Url, header};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use offline_core::{CacheNames, Error, ResponseType};

use super::ControllerConfig;
use crate::fetch::{FetchRequest, FetchResponse, Network, same_origin};

pub(crate) const ORIGIN: &str = "https://app.example.com";

pub(crate) fn origin() -> Url {
    Url::parse(ORIGIN).unwrap()
}

pub(crate) fn url(path: &str) -> Url {
    origin().join(path).unwrap()
}

pub(crate) fn test_config(manifest: &[&str]) -> ControllerConfig {
    ControllerConfig {
        names: CacheNames::new("v1", "static", "dynamic", "resume-analyzer"),
        origin: origin(),
        api_prefix: "/api/".into(),
        shell_url: url("/"),
        offline_page: true,
        manifest: manifest.iter().map(|p| p.to_string()).collect(),
    }
}

#[derive(Default)]
struct Inner {
    replies: Mutex<HashMap<String, (StatusCode, String)>>,
    offline: AtomicBool,
    calls: Mutex<Vec<String>>,
}

/// Answers from a fixed table; unknown URLs get 404. Cloning shares state.
#[derive(Clone, Default)]
pub(crate) struct StubNetwork {
    inner: Arc<Inner>,
}

impl StubNetwork {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// 200 for a same-origin path.
    pub(crate) fn with_ok(self, path: &str, body: &str) -> Self {
        self.with_reply(url(path).as_str(), StatusCode::OK, body)
    }

    /// Any status for any absolute URL.
    pub(crate) fn with_reply(self, url: &str, status: StatusCode, body: &str) -> Self {
        self.inner
            .replies
            .lock()
            .unwrap()
            .insert(url.to_string(), (status, body.to_string()));
        self
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    /// Every request seen, as `METHOD url`, including ones made while offline.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_to(&self, path: &str) -> usize {
        let target = url(path).to_string();
        self.calls()
            .iter()
            .filter(|c| c.split_once(' ').is_some_and(|(_, u)| u == target))
            .count()
    }
}

#[async_trait]
impl Network for StubNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, Error> {
        self.inner
            .calls
            .lock()
            .unwrap()
            .push(format!("{} {}", request.method, request.url));

        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("{}: offline", request.url)));
        }

        let (status, body) = self
            .inner
            .replies
            .lock()
            .unwrap()
            .get(request.url.as_str())
            .cloned()
            .unwrap_or((StatusCode::NOT_FOUND, "not found".to_string()));

        let response_type = if same_origin(&request.url, &origin()) { ResponseType::Basic } else { ResponseType::Cors };
        let mut headers = header::HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("text/plain"));

        Ok(FetchResponse {
            url: request.url.clone(),
            final_url: request.url.clone(),
            status,
            response_type,
            headers,
            bytes: Bytes::from(body),
            fetch_ms: 0,
        })
    }
}
