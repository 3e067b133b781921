//! Stored response representation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Response type, using the fetch standard's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Same-origin response.
    Basic,
    /// Cross-origin response with readable body.
    Cors,
    /// Cross-origin response without CORS.
    Opaque,
    /// Redirect surfaced without following.
    OpaqueRedirect,
    /// Network error placeholder.
    Error,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Basic => "basic",
            ResponseType::Cors => "cors",
            ResponseType::Opaque => "opaque",
            ResponseType::OpaqueRedirect => "opaqueredirect",
            ResponseType::Error => "error",
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(ResponseType::Basic),
            "cors" => Ok(ResponseType::Cors),
            "opaque" => Ok(ResponseType::Opaque),
            "opaqueredirect" => Ok(ResponseType::OpaqueRedirect),
            "error" => Ok(ResponseType::Error),
            other => Err(format!("unknown response type: {other}")),
        }
    }
}

/// A response as held in a named cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct StoredResponse {
    /// Final URL of the response.
    pub url: String,
    pub status: u16,
    pub status_text: String,
    pub response_type: ResponseType,
    /// Whether redirects were followed to produce this response.
    pub redirected: bool,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl StoredResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Status in the 200..=299 range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Eligible for opportunistic storage in the static cache: exactly 200,
    /// same-origin `basic`.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.response_type == ResponseType::Basic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, response_type: ResponseType) -> StoredResponse {
        StoredResponse {
            url: "https://example.com/app.js".into(),
            status,
            status_text: String::new(),
            response_type,
            redirected: false,
            headers: vec![("Content-Type".into(), "application/javascript".into())],
            body: b"console.log(1)".to_vec(),
        }
    }

    #[test]
    fn test_response_type_round_trip() {
        for ty in [
            ResponseType::Basic,
            ResponseType::Cors,
            ResponseType::Opaque,
            ResponseType::OpaqueRedirect,
            ResponseType::Error,
        ] {
            assert_eq!(ty.as_str().parse::<ResponseType>().unwrap(), ty);
        }
        assert!("bogus".parse::<ResponseType>().is_err());
    }

    #[test]
    fn test_response_type_serde_matches_as_str() {
        let json = serde_json::to_string(&ResponseType::OpaqueRedirect).unwrap();
        assert_eq!(json, "\"opaqueredirect\"");
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let r = response(200, ResponseType::Basic);
        assert_eq!(r.content_type(), Some("application/javascript"));
        assert_eq!(r.header("CONTENT-TYPE"), Some("application/javascript"));
        assert_eq!(r.header("etag"), None);
    }

    #[test]
    fn test_is_cacheable() {
        assert!(response(200, ResponseType::Basic).is_cacheable());
        assert!(!response(200, ResponseType::Cors).is_cacheable());
        assert!(!response(200, ResponseType::Opaque).is_cacheable());
        assert!(!response(204, ResponseType::Basic).is_cacheable());
        assert!(!response(404, ResponseType::Basic).is_cacheable());
    }

    #[test]
    fn test_is_ok() {
        assert!(response(204, ResponseType::Basic).is_ok());
        assert!(!response(301, ResponseType::Basic).is_ok());
        assert!(!response(500, ResponseType::Basic).is_ok());
    }
}
