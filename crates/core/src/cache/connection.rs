//! Opening the cache database.

use super::migrations;
use crate::Error;
use std::path::Path;
use std::time::Duration;
use tokio_rusqlite::Connection;

/// Handle to the set of named caches.
///
/// Every operation runs on the connection's background thread. Clones share
/// the same connection, so a clone can be moved into a spawned task.
#[derive(Clone, Debug)]
pub struct CacheStorage {
    pub(crate) conn: Connection,
}

impl CacheStorage {
    /// Open (or create) the database at `path` and migrate it.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::InvalidInput(format!("cache directory {}: {e}", parent.display())))?;
        }

        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        let storage = Self::init(conn, true).await?;
        tracing::debug!(path = %path.display(), "opened cache database");
        Ok(storage)
    }

    /// Open a private in-memory database.
    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| Error::Database(e.into()))?;
        Self::init(conn, false).await
    }

    async fn init(conn: Connection, wal: bool) -> Result<Self, Error> {
        conn.call(move |conn| -> Result<(), Error> {
            if wal {
                conn.pragma_update(None, "journal_mode", "WAL")?;
                conn.pragma_update(None, "synchronous", "NORMAL")?;
            }
            conn.pragma_update(None, "foreign_keys", true)?;
            conn.busy_timeout(Duration::from_secs(5))?;
            Ok(())
        })
        .await
        .map_err(Error::from)?;

        migrations::run(&conn).await?;

        Ok(Self { conn })
    }

    /// Applied schema version.
    pub async fn schema_version(&self) -> Result<i64, Error> {
        self.conn
            .call(|conn| -> Result<i64, Error> { migrations::current_version(conn) })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory_is_migrated() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        assert_eq!(storage.schema_version().await.unwrap(), migrations::latest_version());
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let storage = CacheStorage::open_in_memory().await.unwrap();
        let enabled: i64 = storage
            .conn
            .call(|conn| conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn test_open_file_uses_wal_and_creates_parent() {
        let dir = std::env::temp_dir().join(format!("mcp-offline-test-{}", std::process::id()));
        let path = dir.join("nested").join("cache.sqlite");

        let storage = CacheStorage::open(&path).await.unwrap();
        let mode: String = storage
            .conn
            .call(|conn| conn.query_row("PRAGMA journal_mode", [], |row| row.get(0)))
            .await
            .unwrap();

        assert_eq!(mode.to_lowercase(), "wal");
        assert!(path.exists());
        drop(storage);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_reopen_keeps_caches() {
        let dir = std::env::temp_dir().join(format!("mcp-offline-reopen-{}", std::process::id()));
        let path = dir.join("cache.sqlite");

        CacheStorage::open(&path).await.unwrap().open_cache("static-v1").await.unwrap();
        let reopened = CacheStorage::open(&path).await.unwrap();

        assert!(reopened.has("static-v1").await.unwrap());
        let _ = std::fs::remove_dir_all(dir);
    }
}
