//! Intercepted requests as seen by the controller.

use bytes::Bytes;
use reqwest::{Method, Url, header};
use std::str::FromStr;

use offline_core::Error;

use crate::fetch::{FetchRequest, resolve};

/// What the requester intends to do with the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Document,
    Script,
    Style,
    Image,
    Font,
    Manifest,
    Other,
}

impl FromStr for Destination {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "document" => Ok(Destination::Document),
            "script" => Ok(Destination::Script),
            "style" => Ok(Destination::Style),
            "image" => Ok(Destination::Image),
            "font" => Ok(Destination::Font),
            "manifest" => Ok(Destination::Manifest),
            "" | "other" => Ok(Destination::Other),
            other => Err(format!("unknown destination: {other}")),
        }
    }
}

/// Request mode; `Navigate` marks top-level navigations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    Navigate,
    #[default]
    SameOrigin,
    Cors,
    NoCors,
}

impl FromStr for RequestMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "navigate" => Ok(RequestMode::Navigate),
            "same-origin" => Ok(RequestMode::SameOrigin),
            "cors" => Ok(RequestMode::Cors),
            "no-cors" => Ok(RequestMode::NoCors),
            other => Err(format!("unknown request mode: {other}")),
        }
    }
}

/// A request the host handed to the controller.
#[derive(Debug, Clone)]
pub struct InterceptedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: header::HeaderMap,
    pub destination: Option<Destination>,
    pub mode: RequestMode,
    pub body: Option<Bytes>,
}

impl InterceptedRequest {
    /// Subresource GET with no destination hint.
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::GET,
            url,
            headers: header::HeaderMap::new(),
            destination: None,
            mode: RequestMode::default(),
            body: None,
        }
    }

    /// Top-level navigation expecting HTML.
    pub fn navigate(url: Url) -> Self {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("text/html,application/xhtml+xml"));
        Self {
            method: Method::GET,
            url,
            headers,
            destination: Some(Destination::Document),
            mode: RequestMode::Navigate,
            body: None,
        }
    }

    /// Build from textual parts; `url` may be host-relative.
    pub fn from_parts(origin: &Url, method: &str, url: &str) -> Result<Self, Error> {
        let method = Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
            .map_err(|_| Error::InvalidInput(format!("invalid method: {method}")))?;
        let url = resolve(origin, url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self::get(url).with_method(method))
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, Error> {
        let name = header::HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::InvalidInput(format!("header name `{name}`: {e}")))?;
        let value =
            header::HeaderValue::from_str(value).map_err(|e| Error::InvalidInput(format!("header `{name}`: {e}")))?;
        self.headers.append(name, value);
        Ok(self)
    }

    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = Some(destination);
        self
    }

    /// A navigation expecting an HTML document.
    ///
    /// An explicit destination wins; otherwise the mode or the `Accept`
    /// header decides.
    pub fn is_document(&self) -> bool {
        match self.destination {
            Some(Destination::Document) => true,
            Some(_) => self.mode == RequestMode::Navigate,
            None => self.mode == RequestMode::Navigate || self.accepts_html(),
        }
    }

    fn accepts_html(&self) -> bool {
        self.headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.contains("text/html"))
    }

    /// The request as forwarded to the network.
    pub fn to_fetch(&self) -> FetchRequest {
        FetchRequest {
            method: self.method.clone(),
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse("https://app.example.com").unwrap().join(path).unwrap()
    }

    #[test]
    fn test_navigate_is_document() {
        assert!(InterceptedRequest::navigate(url("/jobs/data-analyst")).is_document());
    }

    #[test]
    fn test_plain_get_is_not_document() {
        assert!(!InterceptedRequest::get(url("/static/js/main.js")).is_document());
    }

    #[test]
    fn test_accept_html_is_document() {
        let mut request = InterceptedRequest::get(url("/blog"));
        request.headers.insert(header::ACCEPT, "text/html".parse().unwrap());
        assert!(request.is_document());
    }

    #[test]
    fn test_explicit_destination_wins_over_accept() {
        let mut request = InterceptedRequest::get(url("/logo.svg")).with_destination(Destination::Image);
        request.headers.insert(header::ACCEPT, "text/html,*/*".parse().unwrap());
        assert!(!request.is_document());
    }

    #[test]
    fn test_destination_from_str() {
        assert_eq!("Document".parse::<Destination>().unwrap(), Destination::Document);
        assert_eq!("".parse::<Destination>().unwrap(), Destination::Other);
        assert!("worker".parse::<Destination>().is_err());
    }

    #[test]
    fn test_to_fetch_keeps_method_and_body() {
        let mut request = InterceptedRequest::get(url("/api/analyze")).with_method(Method::POST);
        request.body = Some(Bytes::from_static(b"{}"));
        let fetch = request.to_fetch();
        assert_eq!(fetch.method, Method::POST);
        assert_eq!(fetch.body.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn test_from_parts_resolves_and_uppercases() {
        let origin = Url::parse("https://app.example.com").unwrap();
        let request = InterceptedRequest::from_parts(&origin, "post", "/api/analyze#x").unwrap();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url.as_str(), "https://app.example.com/api/analyze");
        assert_eq!(request.mode, RequestMode::SameOrigin);
    }

    #[test]
    fn test_from_parts_keeps_origin_for_redirect_query() {
        let origin = Url::parse("https://app.example.com").unwrap();
        let request = InterceptedRequest::from_parts(&origin, "GET", "/login?next=https://cdn.example.net/x").unwrap();
        assert_eq!(request.url.host_str(), Some("app.example.com"));
        assert_eq!(request.url.path(), "/login");
        assert_eq!(request.url.query(), Some("next=https://cdn.example.net/x"));
    }

    #[test]
    fn test_from_parts_rejects_bad_input() {
        let origin = Url::parse("https://app.example.com").unwrap();
        assert!(matches!(InterceptedRequest::from_parts(&origin, "GET", "ftp://x/"), Err(Error::InvalidUrl(_))));
        assert!(matches!(InterceptedRequest::from_parts(&origin, "G ET", "/"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_with_header_and_mode() {
        let request = InterceptedRequest::get(url("/blog"))
            .with_header("Accept", "text/html")
            .unwrap()
            .with_mode(RequestMode::Cors);
        assert!(request.is_document());
        assert!(InterceptedRequest::get(url("/")).with_header("bad header", "x").is_err());
        assert_eq!("no-cors".parse::<RequestMode>().unwrap(), RequestMode::NoCors);
    }
}
