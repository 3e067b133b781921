//! Entry operations on a single named cache.

use super::connection::CacheStorage;
use super::hash::compute_request_key;
use super::response::{ResponseType, StoredResponse};
use super::timestamp;
use crate::Error;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension};

/// Listing row for one stored request.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct EntryMeta {
    pub method: String,
    pub url: String,
    pub status: u16,
    pub response_type: ResponseType,
    pub size: u64,
    pub stored_at: String,
}

/// Handle to one named cache.
///
/// Holds the cache's row id; the handle outlives a `delete` of the cache,
/// after which writes fail with a storage error.
#[derive(Clone, Debug)]
pub struct NamedCache {
    storage: CacheStorage,
    id: i64,
    name: String,
}

/// Columns as read from `entries`, before decoding.
pub(crate) struct RawEntry {
    url: String,
    status: i64,
    status_text: String,
    response_type: String,
    redirected: bool,
    headers_json: String,
    body: Vec<u8>,
}

/// Row mapper for `url, status, status_text, response_type, redirected, headers_json, body`.
pub(crate) fn read_response(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEntry> {
    Ok(RawEntry {
        url: row.get(0)?,
        status: row.get(1)?,
        status_text: row.get(2)?,
        response_type: row.get(3)?,
        redirected: row.get::<_, i32>(4)? == 1,
        headers_json: row.get(5)?,
        body: row.get(6)?,
    })
}

impl TryFrom<RawEntry> for StoredResponse {
    type Error = Error;

    fn try_from(raw: RawEntry) -> Result<Self, Self::Error> {
        let status = u16::try_from(raw.status).map_err(|_| Error::CorruptEntry(format!("status {}", raw.status)))?;
        let response_type = raw.response_type.parse().map_err(Error::CorruptEntry)?;
        let headers = serde_json::from_str(&raw.headers_json)
            .map_err(|e| Error::CorruptEntry(format!("headers for {}: {e}", raw.url)))?;

        Ok(StoredResponse {
            url: raw.url,
            status,
            status_text: raw.status_text,
            response_type,
            redirected: raw.redirected,
            headers,
            body: raw.body,
        })
    }
}

fn upsert(
    conn: &rusqlite::Connection, cache_id: i64, method: &str, url: &str, response: &StoredResponse, stored_at: &str,
) -> Result<(), Error> {
    let headers_json =
        serde_json::to_string(&response.headers).map_err(|e| Error::CorruptEntry(format!("headers for {url}: {e}")))?;
    conn.execute(
        "INSERT INTO entries (
            cache_id, request_key, method, url, status, status_text,
            response_type, redirected, headers_json, body, stored_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        ON CONFLICT(cache_id, request_key) DO UPDATE SET
            url = excluded.url,
            status = excluded.status,
            status_text = excluded.status_text,
            response_type = excluded.response_type,
            redirected = excluded.redirected,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            cache_id,
            compute_request_key(method, url),
            method.to_ascii_uppercase(),
            url,
            response.status,
            &response.status_text,
            response.response_type.as_str(),
            response.redirected as i32,
            headers_json,
            &response.body,
            stored_at,
        ],
    )?;
    Ok(())
}

impl NamedCache {
    pub(crate) fn new(storage: CacheStorage, id: i64, name: String) -> Self {
        Self { storage, id, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// Store a response for the request, replacing any previous one.
    pub async fn put(&self, method: &str, url: &str, response: &StoredResponse) -> Result<(), Error> {
        let (id, method, url, response) = (self.id, method.to_string(), url.to_string(), response.clone());
        let stored_at = timestamp(Utc::now());
        self.storage
            .conn
            .call(move |conn| -> Result<(), Error> { upsert(conn, id, &method, &url, &response, &stored_at) })
            .await
            .map_err(Error::from)
    }

    /// Store several GET responses in one transaction.
    ///
    /// Either every entry is written or none is.
    pub async fn put_all(&self, entries: Vec<(String, StoredResponse)>) -> Result<(), Error> {
        let id = self.id;
        let stored_at = timestamp(Utc::now());
        self.storage
            .conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                for (url, response) in &entries {
                    upsert(&tx, id, "GET", url, response, &stored_at)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Exact-match lookup in this cache only.
    pub async fn match_request(&self, method: &str, url: &str) -> Result<Option<StoredResponse>, Error> {
        let (id, key) = (self.id, compute_request_key(method, url));
        self.storage
            .conn
            .call(move |conn| -> Result<Option<StoredResponse>, Error> {
                let row = conn
                    .query_row(
                        "SELECT url, status, status_text, response_type, redirected, headers_json, body
                         FROM entries WHERE cache_id = ?1 AND request_key = ?2",
                        params![id, key],
                        read_response,
                    )
                    .optional()?;

                row.map(StoredResponse::try_from).transpose()
            })
            .await
            .map_err(Error::from)
    }

    /// Remove the entry for the request. Returns false if there was none.
    pub async fn delete(&self, method: &str, url: &str) -> Result<bool, Error> {
        let (id, key) = (self.id, compute_request_key(method, url));
        self.storage
            .conn
            .call(move |conn| -> Result<bool, Error> {
                let count =
                    conn.execute("DELETE FROM entries WHERE cache_id = ?1 AND request_key = ?2", params![id, key])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Stored requests in URL order.
    pub async fn keys(&self) -> Result<Vec<EntryMeta>, Error> {
        let id = self.id;
        self.storage
            .conn
            .call(move |conn| -> Result<Vec<EntryMeta>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT method, url, status, response_type, LENGTH(body), stored_at
                     FROM entries WHERE cache_id = ?1 ORDER BY url ASC",
                )?;
                let rows = stmt
                    .query_map(params![id], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, i64>(2)?,
                            row.get::<_, String>(3)?,
                            row.get::<_, i64>(4)?,
                            row.get::<_, String>(5)?,
                        ))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                rows.into_iter()
                    .map(|(method, url, status, response_type, size, stored_at)| -> Result<EntryMeta, Error> {
                        Ok(EntryMeta {
                            method,
                            status: u16::try_from(status).map_err(|_| Error::CorruptEntry(format!("status {status}")))?,
                            response_type: response_type.parse().map_err(Error::CorruptEntry)?,
                            size: size as u64,
                            stored_at,
                            url,
                        })
                    })
                    .collect()
            })
            .await
            .map_err(Error::from)
    }
}
