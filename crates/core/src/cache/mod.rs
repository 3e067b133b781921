//! SQLite-backed named caches.
//!
//! A persistent stand-in for the browser's cache storage, using SQLite
//! with async access via tokio-rusqlite. It supports:
//!
//! - Named caches created on first open and deleted as a unit
//! - Exact-match lookups by method + URL, per cache or across all caches
//! - Transactional bulk writes for precaching
//! - Automatic schema migrations and WAL mode

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod names;
pub mod response;
pub mod storage;

pub use crate::Error;

pub use connection::CacheStorage;
pub use entries::{EntryMeta, NamedCache};
pub use names::{CacheKind, CacheNames};
pub use response::{ResponseType, StoredResponse};
pub use storage::CacheSummary;

use chrono::{DateTime, SecondsFormat, Utc};

/// Fixed-width RFC 3339 so stored timestamps compare as strings.
pub(crate) fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}
