//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

/// Require every entry to be a host-relative path.
pub(crate) fn check_paths(field: &str, paths: &[String]) -> Result<(), ConfigError> {
    if let Some(bad) = paths.iter().find(|p| !p.starts_with('/') || p.starts_with("//")) {
        return Err(ConfigError::Invalid { field: field.into(), reason: format!("`{bad}` is not a host-relative path") });
    }
    Ok(())
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `origin` is not an absolute http(s) URL
    /// - `version` is empty or contains whitespace
    /// - the static, dynamic and umbrella cache names collide
    /// - `api_prefix`, `shell_path` or a `precache` entry is not host-relative
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        let origin = url::Url::parse(&self.origin)
            .map_err(|e| ConfigError::Invalid { field: "origin".into(), reason: e.to_string() })?;
        if !matches!(origin.scheme(), "http" | "https") || origin.host_str().is_none() {
            return Err(ConfigError::Invalid { field: "origin".into(), reason: "must be an http(s) origin".into() });
        }

        if self.version.is_empty() || self.version.chars().any(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                field: "version".into(),
                reason: "must be non-empty without whitespace".into(),
            });
        }

        for (field, prefix) in [
            ("static_prefix", &self.static_prefix),
            ("dynamic_prefix", &self.dynamic_prefix),
            ("umbrella_prefix", &self.umbrella_prefix),
        ] {
            if prefix.is_empty() {
                return Err(ConfigError::Invalid { field: field.into(), reason: "must not be empty".into() });
            }
        }

        if !self.cache_names().is_distinct() {
            return Err(ConfigError::Invalid {
                field: "static_prefix".into(),
                reason: "static, dynamic and umbrella cache names must differ".into(),
            });
        }

        check_paths("api_prefix", std::slice::from_ref(&self.api_prefix))?;
        check_paths("shell_path", std::slice::from_ref(&self.shell_path))?;
        check_paths("precache", &self.precache)?;

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.manifest_path.is_some() && !self.precache.is_empty() {
            tracing::debug!(
                precache_count = self.precache.len(),
                "manifest_path is set; precache list will be ignored"
            );
        }

        Ok(())
    }
}
