//! HTTP client for the server entry API.
//!
//! The server (`POST/GET/DELETE /api/entries`) is an external collaborator;
//! this module only consumes it.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::models::{EntryId, EntryUpload, ServerEntry};
use crate::util::{compact_text, normalize_text_option};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid API configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Entry API HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Entry API error: {0}")]
    Api(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Remote entry operations consumed by the sync engine.
///
/// Kept behind a trait so tests can drive the engine with an in-memory fake.
#[async_trait]
pub trait EntryApi: Send + Sync {
    /// Upload one entry; the response carries the server-assigned id
    async fn create_entry(&self, upload: &EntryUpload) -> ApiResult<ServerEntry>;

    /// Download the server's full entry list
    async fn list_entries(&self) -> ApiResult<Vec<ServerEntry>>;

    /// Delete one entry on the server
    async fn delete_entry(&self, id: EntryId) -> ApiResult<()>;
}

/// reqwest-backed [`EntryApi`] implementation
#[derive(Clone)]
pub struct HttpEntryApi {
    base_url: String,
    session_token: Option<String>,
    client: reqwest::Client,
}

impl HttpEntryApi {
    /// Create a client for the given base URL (scheme required, trailing
    /// slash trimmed).
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        Ok(Self {
            base_url,
            session_token: None,
            client: reqwest::Client::builder().build()?,
        })
    }

    /// Attach a session bearer token to every request.
    ///
    /// Obtaining the token (the OAuth login flow) happens outside this crate.
    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = normalize_text_option(Some(token.into()));
        self
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self
            .client
            .request(method, format!("{}{path}", self.base_url))
            .header("Accept", "application/json");
        if let Some(token) = &self.session_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }
}

#[async_trait]
impl EntryApi for HttpEntryApi {
    async fn create_entry(&self, upload: &EntryUpload) -> ApiResult<ServerEntry> {
        let response = self
            .request(reqwest::Method::POST, "/api/entries")
            .json(upload)
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.json::<ServerEntry>().await?)
    }

    async fn list_entries(&self) -> ApiResult<Vec<ServerEntry>> {
        let response = self
            .request(reqwest::Method::GET, "/api/entries")
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.json::<Vec<ServerEntry>>().await?)
    }

    async fn delete_entry(&self, id: EntryId) -> ApiResult<()> {
        let response = self
            .request(reqwest::Method::DELETE, &format!("/api/entries/{id}"))
            .send()
            .await?;

        check_status(response).await?;
        Ok(())
    }
}

/// Treat any non-2xx response as a hard failure with the server's message
async fn check_status(response: reqwest::Response) -> ApiResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Api(parse_api_error(status, &body)))
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn normalize_base_url(raw: String) -> ApiResult<String> {
    let base_url = normalize_text_option(Some(raw)).ok_or_else(|| {
        ApiError::InvalidConfiguration("base URL must not be empty".to_string())
    })?;
    if crate::util::is_http_url(&base_url) {
        Ok(base_url.trim_end_matches('/').to_string())
    } else {
        Err(ApiError::InvalidConfiguration(
            "base URL must include http:// or https://".to_string(),
        ))
    }
}
