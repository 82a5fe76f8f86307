//! Versioned offline response cache.
//!
//! The Rust rendition of the app's service worker: a fixed manifest of
//! critical URLs is precached under a version string, API requests go
//! network-first with a cached fallback, and everything else is served
//! cache-first with a background revalidation. Bumping the manifest version
//! and activating invalidates every previously cached version.

use async_trait::async_trait;
use libsql::{params, Connection};

use crate::error::{Error, Result};
use crate::util::{normalize_text_option, unix_millis_now};

const STATE_ACTIVE: &str = "active_version";
const STATE_PENDING: &str = "pending_version";

/// Fixed list of URLs to precache, tied to a cache version string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheManifest {
    pub version: String,
    pub urls: Vec<String>,
}

impl CacheManifest {
    /// Create a manifest; the version string must be non-empty.
    pub fn new(version: impl Into<String>, urls: Vec<String>) -> Result<Self> {
        let version = normalize_text_option(Some(version.into()))
            .ok_or_else(|| Error::Cache("cache version must not be empty".to_string()))?;
        Ok(Self { version, urls })
    }
}

/// One cached response body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub url: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    /// Unix ms when the body was fetched
    pub fetched_at: i64,
}

/// Network fetch seam; tests drive the cache with scripted fakes
#[async_trait]
pub trait RemoteFetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<CachedResponse>;
}

/// reqwest-backed [`RemoteFetch`]
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .build()
                .map_err(|error| Error::Cache(error.to_string()))?,
        })
    }
}

#[async_trait]
impl RemoteFetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<CachedResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| Error::Cache(format!("fetch {url} failed: {error}")))?;

        if !response.status().is_success() {
            return Err(Error::Cache(format!(
                "fetch {url} failed: HTTP {}",
                response.status().as_u16()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        let body = response
            .bytes()
            .await
            .map_err(|error| Error::Cache(format!("fetch {url} failed: {error}")))?
            .to_vec();

        Ok(CachedResponse {
            url: url.to_string(),
            content_type,
            body,
            fetched_at: unix_millis_now(),
        })
    }
}

/// Versioned response cache with service-worker fetch strategies
pub struct OfflineCache<F> {
    conn: Connection,
    fetcher: F,
    manifest: CacheManifest,
    api_prefixes: Vec<String>,
}

impl<F> OfflineCache<F>
where
    F: RemoteFetch + Clone + 'static,
{
    pub fn new(conn: Connection, fetcher: F, manifest: CacheManifest) -> Self {
        Self {
            conn,
            fetcher,
            manifest,
            api_prefixes: vec!["/api/".to_string()],
        }
    }

    /// Override which path prefixes get the network-first strategy
    #[must_use]
    pub fn with_api_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.api_prefixes = prefixes;
        self
    }

    /// Precache every manifest URL under the manifest version.
    ///
    /// All fetches complete before anything is written, so a single
    /// unreachable asset fails the install with nothing staged. A successful
    /// install records the version as pending until [`Self::activate`].
    pub async fn install(&self) -> Result<()> {
        let mut responses = Vec::with_capacity(self.manifest.urls.len());
        for url in &self.manifest.urls {
            let response = self.fetcher.fetch(url).await.map_err(|error| {
                Error::Cache(format!("install failed at {url}: {error}"))
            })?;
            responses.push(response);
        }

        self.conn.execute("BEGIN TRANSACTION", ()).await?;
        let staged: Result<()> = async {
            self.conn
                .execute(
                    "DELETE FROM cache_entries WHERE version = ?",
                    params![self.manifest.version.clone()],
                )
                .await?;
            for response in &responses {
                self.put(&self.manifest.version, response).await?;
            }
            self.set_state(STATE_PENDING, &self.manifest.version).await?;
            Ok(())
        }
        .await;

        if let Err(error) = staged {
            self.conn.execute("ROLLBACK", ()).await.ok();
            return Err(error);
        }
        self.conn.execute("COMMIT", ()).await?;

        tracing::info!(
            version = %self.manifest.version,
            urls = self.manifest.urls.len(),
            "offline cache installed"
        );
        Ok(())
    }

    /// Activate the manifest version: all other cached versions are deleted
    /// and every subsequent fetch is served from the new one.
    pub async fn activate(&self) -> Result<()> {
        self.set_state(STATE_ACTIVE, &self.manifest.version).await?;
        self.conn
            .execute(
                "DELETE FROM cache_entries WHERE version != ?",
                params![self.manifest.version.clone()],
            )
            .await?;
        self.conn
            .execute(
                "DELETE FROM cache_state WHERE key = ?",
                params![STATE_PENDING],
            )
            .await?;

        tracing::info!(version = %self.manifest.version, "offline cache activated");
        Ok(())
    }

    /// Explicit signal from the host forcing a staged version to activate
    /// immediately instead of waiting for the next startup.
    pub async fn skip_waiting(&self) -> Result<()> {
        if self.pending_version().await?.is_none() {
            tracing::debug!("skip_waiting with no pending cache version");
            return Ok(());
        }
        self.activate().await
    }

    /// Fetch a URL through the cache.
    ///
    /// API paths are network-first with a cached fallback; other URLs are
    /// served from the cache when present (a background revalidation
    /// refreshes the copy for next time), fetched and cached otherwise.
    pub async fn fetch(&self, url: &str) -> Result<CachedResponse> {
        if self.is_api_path(url) {
            self.fetch_network_first(url).await
        } else {
            self.fetch_cache_first(url).await
        }
    }

    /// Refresh the cached copy of a URL, swallowing network failures.
    pub async fn revalidate(&self, url: &str) {
        let version = match self.current_version().await {
            Ok(version) => version,
            Err(error) => {
                tracing::debug!(%url, %error, "revalidation skipped");
                return;
            }
        };
        revalidate_into(&self.conn, &self.fetcher, &version, url).await;
    }

    /// The version cached rows are currently read from and written to
    pub async fn current_version(&self) -> Result<String> {
        Ok(self
            .get_state(STATE_ACTIVE)
            .await?
            .unwrap_or_else(|| self.manifest.version.clone()))
    }

    pub async fn active_version(&self) -> Result<Option<String>> {
        self.get_state(STATE_ACTIVE).await
    }

    pub async fn pending_version(&self) -> Result<Option<String>> {
        self.get_state(STATE_PENDING).await
    }

    async fn fetch_network_first(&self, url: &str) -> Result<CachedResponse> {
        let version = self.current_version().await?;
        match self.fetcher.fetch(url).await {
            Ok(response) => {
                self.put(&version, &response).await?;
                Ok(response)
            }
            Err(network_error) => match self.get_cached(&version, url).await? {
                Some(cached) => {
                    tracing::debug!(%url, "network failed, served cached API response");
                    Ok(cached)
                }
                None => Err(network_error),
            },
        }
    }

    async fn fetch_cache_first(&self, url: &str) -> Result<CachedResponse> {
        let version = self.current_version().await?;
        if let Some(cached) = self.get_cached(&version, url).await? {
            // Stale-while-revalidate: refresh in the background for next time
            let conn = self.conn.clone();
            let fetcher = self.fetcher.clone();
            let url = url.to_string();
            tokio::spawn(async move {
                revalidate_into(&conn, &fetcher, &version, &url).await;
            });
            return Ok(cached);
        }

        let response = self.fetcher.fetch(url).await?;
        self.put(&version, &response).await?;
        Ok(response)
    }

    fn is_api_path(&self, url: &str) -> bool {
        let path = path_of(url);
        self.api_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    async fn put(&self, version: &str, response: &CachedResponse) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO cache_entries (version, url, content_type, body, fetched_at)
                 VALUES (?, ?, ?, ?, ?)",
                params![
                    version.to_string(),
                    response.url.clone(),
                    response.content_type.clone(),
                    response.body.clone(),
                    response.fetched_at,
                ],
            )
            .await?;
        Ok(())
    }

    async fn get_cached(&self, version: &str, url: &str) -> Result<Option<CachedResponse>> {
        let mut rows = self
            .conn
            .query(
                "SELECT content_type, body, fetched_at FROM cache_entries
                 WHERE version = ? AND url = ?",
                params![version.to_string(), url.to_string()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(CachedResponse {
                url: url.to_string(),
                content_type: row.get::<Option<String>>(0)?,
                body: row.get::<Vec<u8>>(1)?,
                fetched_at: row.get::<i64>(2)?,
            })),
            None => Ok(None),
        }
    }

    async fn set_state(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO cache_state (key, value) VALUES (?, ?)",
                params![key, value.to_string()],
            )
            .await?;
        Ok(())
    }

    async fn get_state(&self, key: &str) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query("SELECT value FROM cache_state WHERE key = ?", params![key])
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<String>(0)?)),
            None => Ok(None),
        }
    }
}

/// Best-effort cache refresh shared by `revalidate` and the background task
async fn revalidate_into<F: RemoteFetch>(conn: &Connection, fetcher: &F, version: &str, url: &str) {
    let response = match fetcher.fetch(url).await {
        Ok(response) => response,
        Err(error) => {
            tracing::debug!(%url, %error, "background revalidation failed");
            return;
        }
    };

    let result = conn
        .execute(
            "INSERT OR REPLACE INTO cache_entries (version, url, content_type, body, fetched_at)
             VALUES (?, ?, ?, ?, ?)",
            params![
                version.to_string(),
                response.url,
                response.content_type,
                response.body,
                response.fetched_at,
            ],
        )
        .await;

    if let Err(error) = result {
        tracing::debug!(%url, %error, "failed to store revalidated response");
    }
}

/// The path portion of a URL (the whole string when no scheme is present)
fn path_of(url: &str) -> &str {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(rest) => rest.find('/').map_or("/", |index| &rest[index..]),
        None => url,
    }
}
