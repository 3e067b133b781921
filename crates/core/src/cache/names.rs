//! Versioned cache names and the activation allow-list.

use serde::{Deserialize, Serialize};

/// The caches a deployed version owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum CacheKind {
    /// Precached assets plus lazily cached static files.
    Static,
    /// Documents stored by the network-first strategy.
    Dynamic,
    /// Legacy single-cache name kept alive across the migration.
    Umbrella,
}

impl CacheKind {
    pub const ALL: [CacheKind; 3] = [CacheKind::Static, CacheKind::Dynamic, CacheKind::Umbrella];
}

/// Current cache names derived from a version tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheNames {
    version: String,
    static_name: String,
    dynamic_name: String,
    umbrella_name: String,
}

impl CacheNames {
    pub fn new(version: &str, static_prefix: &str, dynamic_prefix: &str, umbrella_prefix: &str) -> Self {
        Self {
            version: version.to_string(),
            static_name: format!("{static_prefix}-{version}"),
            dynamic_name: format!("{dynamic_prefix}-{version}"),
            umbrella_name: format!("{umbrella_prefix}-{version}"),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn static_name(&self) -> &str {
        &self.static_name
    }

    pub fn dynamic_name(&self) -> &str {
        &self.dynamic_name
    }

    pub fn umbrella_name(&self) -> &str {
        &self.umbrella_name
    }

    pub fn name(&self, kind: CacheKind) -> &str {
        match kind {
            CacheKind::Static => &self.static_name,
            CacheKind::Dynamic => &self.dynamic_name,
            CacheKind::Umbrella => &self.umbrella_name,
        }
    }

    /// Which current cache `name` is, if any. Exact match only.
    pub fn kind_of(&self, name: &str) -> Option<CacheKind> {
        CacheKind::ALL.into_iter().find(|kind| self.name(*kind) == name)
    }

    /// Whether `name` survives activation cleanup.
    pub fn is_current(&self, name: &str) -> bool {
        self.kind_of(name).is_some()
    }

    /// True when all three names differ.
    pub fn is_distinct(&self) -> bool {
        self.static_name != self.dynamic_name
            && self.static_name != self.umbrella_name
            && self.dynamic_name != self.umbrella_name
    }
}
