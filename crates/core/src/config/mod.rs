//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (MCP_OFFLINE_*)
//! 2. TOML config file (if MCP_OFFLINE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::CacheNames;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (MCP_OFFLINE_*)
/// 2. TOML config file (if MCP_OFFLINE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin of the controlled application, e.g. `https://app.example.com`.
    ///
    /// Requests to any other origin are treated as cross-origin.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Version tag embedded in every cache name.
    ///
    /// Set via MCP_OFFLINE_VERSION environment variable.
    #[serde(default = "default_version")]
    pub version: String,

    /// Name prefix of the precache.
    #[serde(default = "default_static_prefix")]
    pub static_prefix: String,

    /// Name prefix of the runtime document cache.
    #[serde(default = "default_dynamic_prefix")]
    pub dynamic_prefix: String,

    /// Name prefix of the legacy umbrella cache.
    #[serde(default = "default_umbrella_prefix")]
    pub umbrella_prefix: String,

    /// Host-relative paths fetched and stored at install.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// JSON manifest written by the build (array of paths).
    ///
    /// When set, replaces `precache`.
    #[serde(default)]
    pub manifest_path: Option<PathBuf>,

    /// Path prefix of backend API requests, never cached.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Root document served when a navigation fails offline.
    #[serde(default = "default_shell_path")]
    pub shell_path: String,

    /// Serve a generated offline page when even the shell is missing.
    #[serde(default = "default_true")]
    pub offline_page: bool,

    /// Path to SQLite cache database.
    ///
    /// Set via MCP_OFFLINE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_origin() -> String {
    "http://localhost:3000".into()
}

fn default_version() -> String {
    "v1".into()
}

fn default_static_prefix() -> String {
    "static".into()
}

fn default_dynamic_prefix() -> String {
    "dynamic".into()
}

fn default_umbrella_prefix() -> String {
    "resume-analyzer".into()
}

fn default_precache() -> Vec<String> {
    ["/", "/index.html", "/manifest.json", "/robots.txt", "/sitemap.xml"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_api_prefix() -> String {
    "/api/".into()
}

fn default_shell_path() -> String {
    "/".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./mcp-offline-cache.sqlite")
}

fn default_user_agent() -> String {
    "mcp-offline/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            version: default_version(),
            static_prefix: default_static_prefix(),
            dynamic_prefix: default_dynamic_prefix(),
            umbrella_prefix: default_umbrella_prefix(),
            precache: default_precache(),
            manifest_path: None,
            api_prefix: default_api_prefix(),
            shell_path: default_shell_path(),
            offline_page: true,
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Names of the caches belonging to the configured version.
    pub fn cache_names(&self) -> CacheNames {
        CacheNames::new(&self.version, &self.static_prefix, &self.dynamic_prefix, &self.umbrella_prefix)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `MCP_OFFLINE_`
    /// 2. TOML file from `MCP_OFFLINE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("MCP_OFFLINE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("MCP_OFFLINE_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Resolve the static asset manifest.
    ///
    /// Reads `manifest_path` when set, otherwise returns `precache`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::LoadFailed` if the manifest file cannot be read
    /// or is not a JSON array of strings, and `ConfigError::Invalid` if an
    /// entry is not host-relative.
    pub fn manifest(&self) -> Result<Vec<String>, ConfigError> {
        let Some(path) = &self.manifest_path else {
            return Ok(self.precache.clone());
        };

        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("manifest {}: {e}", path.display())))?;
        let entries: Vec<String> = serde_json::from_str(&raw)
            .map_err(|e| ConfigError::LoadFailed(format!("manifest {}: {e}", path.display())))?;

        validation::check_paths("manifest_path", &entries)?;

        tracing::debug!(path = %path.display(), entries = entries.len(), "loaded precache manifest");

        Ok(entries)
    }
}
