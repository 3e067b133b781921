//! Cache storage operations.
//!
//! Opening, enumerating and deleting named caches, plus lookups that
//! span every cache.

use super::connection::CacheStorage;
use super::entries::{NamedCache, read_response};
use super::hash::compute_request_key;
use super::response::StoredResponse;
use super::timestamp;
use crate::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::OptionalExtension;

/// Listing row for a named cache.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CacheSummary {
    pub name: String,
    pub entries: u64,
    pub created_at: String,
}

impl CacheStorage {
    /// Open the named cache, creating it if absent.
    pub async fn open_cache(&self, name: &str) -> Result<NamedCache, Error> {
        let name = name.to_string();
        let created_at = timestamp(Utc::now());
        let lookup = name.clone();
        let id = self
            .conn
            .call(move |conn| -> Result<i64, Error> {
                conn.execute(
                    "INSERT INTO caches (name, created_at) VALUES (?1, ?2) ON CONFLICT(name) DO NOTHING",
                    params![lookup, created_at],
                )?;
                let id = conn.query_row("SELECT id FROM caches WHERE name = ?1", params![lookup], |row| row.get(0))?;
                Ok(id)
            })
            .await
            .map_err(Error::from)?;

        Ok(NamedCache::new(self.clone(), id, name))
    }

    /// Whether a cache with this name exists.
    pub async fn has(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM caches WHERE name = ?1)",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// Names of all caches in creation order.
    pub async fn keys(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM caches ORDER BY id ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a cache and all of its entries.
    ///
    /// Returns false if no cache had that name.
    pub async fn delete(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM caches WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Find a stored response for the request in any cache.
    ///
    /// Caches are searched in creation order; the first hit wins.
    pub async fn match_any(&self, method: &str, url: &str) -> Result<Option<StoredResponse>, Error> {
        let key = compute_request_key(method, url);
        self.conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let row = conn
                    .query_row(
                        "SELECT e.url, e.status, e.status_text, e.response_type, e.redirected, e.headers_json, e.body
                         FROM entries e JOIN caches c ON c.id = e.cache_id
                         WHERE e.request_key = ?1
                         ORDER BY c.id ASC
                         LIMIT 1",
                        params![key],
                        read_response,
                    )
                    .optional()?;

                row.map(StoredResponse::try_from).transpose()
            })
            .await
            .map_err(Error::from)
    }

    /// Entry counts for every cache, in creation order.
    pub async fn summaries(&self) -> Result<Vec<CacheSummary>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<CacheSummary>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT c.name, COUNT(e.request_key), c.created_at
                     FROM caches c LEFT JOIN entries e ON e.cache_id = c.id
                     GROUP BY c.id
                     ORDER BY c.id ASC",
                )?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok(CacheSummary {
                            name: row.get(0)?,
                            entries: row.get::<_, i64>(1)? as u64,
                            created_at: row.get(2)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete entries stored before `cutoff` across all caches.
    ///
    /// Returns the number of deleted entries.
    pub async fn purge_entries_before(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        let cutoff = timestamp(cutoff);
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM entries WHERE stored_at < ?1", params![cutoff])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResponseType;

    fn page(url: &str, body: &str) -> StoredResponse {
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

    #[tokio::test]
    async fn test_open_creates_once() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        assert!(!storage.has("static-v1").await.unwrap());

        let first = storage.open_cache("static-v1").await.unwrap();
        let second = storage.open_cache("static-v1").await.unwrap();

        assert!(storage.has("static-v1").await.unwrap());
        assert_eq!(first.id(), second.id());
        assert_eq!(storage.keys().await.unwrap(), vec!["static-v1"]);
    }

    #[tokio::test]
    async fn test_keys_in_creation_order() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        for name in ["static-v1", "dynamic-v1", "old-cache-name"] {
            storage.open_cache(name).await.unwrap();
        }
        assert_eq!(storage.keys().await.unwrap(), vec!["static-v1", "dynamic-v1", "old-cache-name"]);
    }

    #[tokio::test]
    async fn test_delete_cascades_entries() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        let cache = storage.open_cache("old-cache-name").await.unwrap();
        cache.put("GET", "https://example.com/", &page("https://example.com/", "old")).await.unwrap();

        assert!(storage.delete("old-cache-name").await.unwrap());
        assert!(!storage.delete("old-cache-name").await.unwrap());
        assert!(storage.match_any("GET", "https://example.com/").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_match_any_prefers_oldest_cache() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        let older = storage.open_cache("static-v1").await.unwrap();
        let newer = storage.open_cache("dynamic-v1").await.unwrap();
        newer.put("GET", "https://example.com/", &page("https://example.com/", "newer")).await.unwrap();
        older.put("GET", "https://example.com/", &page("https://example.com/", "older")).await.unwrap();

        let hit = storage.match_any("GET", "https://example.com/").await.unwrap().unwrap();
        assert_eq!(hit.body, b"older");
    }

    #[tokio::test]
    async fn test_match_any_miss() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        storage.open_cache("static-v1").await.unwrap();
        assert!(storage.match_any("GET", "https://example.com/nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_summaries_count_entries() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        let cache = storage.open_cache("static-v1").await.unwrap();
        storage.open_cache("dynamic-v1").await.unwrap();
        cache.put("GET", "https://example.com/", &page("https://example.com/", "a")).await.unwrap();
        cache.put("GET", "https://example.com/app.css", &page("https://example.com/app.css", "b")).await.unwrap();

        let summaries = storage.summaries().await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "static-v1");
        assert_eq!(summaries[0].entries, 2);
        assert_eq!(summaries[1].entries, 0);
    }

    #[tokio::test]
    async fn test_purge_entries_before() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        let cache = storage.open_cache("dynamic-v1").await.unwrap();
        cache.put("GET", "https://example.com/", &page("https://example.com/", "a")).await.unwrap();

        let past = Utc::now() - chrono::Duration::days(1);
        assert_eq!(storage.purge_entries_before(past).await.unwrap(), 0);

        let future = Utc::now() + chrono::Duration::days(1);
        assert_eq!(storage.purge_entries_before(future).await.unwrap(), 1);
        assert!(storage.has("dynamic-v1").await.unwrap());
    }
}
