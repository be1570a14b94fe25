//! Entry operations on a single bucket: match, put, keys.
//!
//! An entry is keyed by method + canonical URL. Header values named by the
//! stored response's `Vary` header are recorded at put time and must match
//! the incoming request for a lookup to hit.

use std::collections::BTreeMap;

use super::connection::CacheDb;
use super::hash::compute_cache_key;
use crate::http::canonicalize;
use crate::{Error, Headers, ProxyRequest, ProxyResponse};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::{params, rusqlite};

/// Request header values recorded for `Vary` matching (lowercased name -> value).
type VarySnapshot = BTreeMap<String, Option<String>>;

/// Outcome of a bucket lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheMatch {
    Hit(ProxyResponse),
    Miss,
}

impl CacheMatch {
    /// Whether a stored response was found.
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheMatch::Hit(_))
    }

    /// The stored response, or `None` on a miss.
    pub fn into_response(self) -> Option<ProxyResponse> {
        match self {
            CacheMatch::Hit(response) => Some(response),
            CacheMatch::Miss => None,
        }
    }
}

/// Identity of a stored entry, as returned by [`Bucket::keys`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EntryKey {
    pub method: String,
    pub url: String,
    pub stored_at: String,
}

/// Handle on one named bucket.
#[derive(Clone, Debug)]
pub struct Bucket {
    db: CacheDb,
    name: String,
}

impl Bucket {
    pub(crate) fn new(db: CacheDb, name: &str) -> Self {
        Self { db, name: name.to_string() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up the stored response for a request.
    pub async fn match_request(&self, request: &ProxyRequest) -> Result<CacheMatch, Error> {
        let url = canonicalize(&request.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let key_hash = compute_cache_key(&request.method, url.as_str());
        let bucket = self.name.clone();

        let row = self
            .db
            .conn
            .call(move |conn| -> Result<Option<(Option<String>, u16, String, String, Vec<u8>)>, Error> {
                let result = conn.query_row(
                    "SELECT vary_json, status_code, response_url, headers_json, body
                     FROM entries WHERE bucket = ?1 AND key_hash = ?2",
                    params![bucket, key_hash],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
                );

                match result {
                    Ok(row) => Ok(Some(row)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        let Some((vary_json, status, response_url, headers_json, body)) = row else {
            return Ok(CacheMatch::Miss);
        };

        if let Some(vary_json) = vary_json {
            let recorded: VarySnapshot = serde_json::from_str(&vary_json)?;
            if recorded != vary_snapshot(request, recorded.keys()) {
                tracing::debug!(bucket = %self.name, url = %url, "vary mismatch");
                return Ok(CacheMatch::Miss);
            }
        }

        let headers: Headers = serde_json::from_str(&headers_json)?;
        Ok(CacheMatch::Hit(ProxyResponse { url: response_url, status, headers, body }))
    }

    /// Store a copy of `response` under the request's key, replacing any previous entry.
    ///
    /// Returns false when the response can never be matched (`Vary: *`) and was not stored.
    pub async fn put(&self, request: &ProxyRequest, response: &ProxyResponse) -> Result<bool, Error> {
        if response.varies_on_everything() {
            tracing::debug!(bucket = %self.name, url = %request.url, "not storing Vary: * response");
            return Ok(false);
        }

        let url = canonicalize(&request.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let method = request.normalized_method();
        let key_hash = compute_cache_key(&method, url.as_str());

        let vary_names = response.vary_names();
        let vary_json = if vary_names.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&vary_snapshot(request, vary_names.iter()))?)
        };
        let headers_json = serde_json::to_string(&response.headers)?;

        let bucket = self.name.clone();
        let url = url.to_string();
        let status = response.status;
        let response_url = response.url.clone();
        let body = response.body.clone();
        let stored_at = chrono::Utc::now().to_rfc3339();

        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO entries (
                        bucket, key_hash, method, url, vary_json,
                        status_code, response_url, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                    ON CONFLICT(bucket, key_hash) DO UPDATE SET
                        method = excluded.method,
                        url = excluded.url,
                        vary_json = excluded.vary_json,
                        status_code = excluded.status_code,
                        response_url = excluded.response_url,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![bucket, key_hash, method, url, vary_json, status, response_url, headers_json, body, stored_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)?;

        Ok(true)
    }

    /// Request identities stored in this bucket, oldest first.
    pub async fn keys(&self) -> Result<Vec<EntryKey>, Error> {
        let bucket = self.name.clone();
        self.db
            .conn
            .call(move |conn| -> Result<Vec<EntryKey>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT method, url, stored_at FROM entries WHERE bucket = ?1 ORDER BY stored_at ASC, url ASC",
                )?;
                let keys = stmt
                    .query_map(params![bucket], |row| {
                        Ok(EntryKey { method: row.get(0)?, url: row.get(1)?, stored_at: row.get(2)? })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }
}

fn vary_snapshot<'a>(request: &ProxyRequest, names: impl Iterator<Item = &'a String>) -> VarySnapshot {
    names
        .map(|name| (name.clone(), request.header(name).map(str::to_string)))
        .collect()
}
