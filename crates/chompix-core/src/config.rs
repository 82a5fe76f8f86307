//! Client configuration.
//!
//! Public endpoints and cache settings used to wire up the API client and
//! offline cache. Secrets beyond the session token never live here; the
//! OAuth flow that produces the token is outside this crate.

use serde::{Deserialize, Serialize};

use crate::api::HttpEntryApi;
use crate::cache::CacheManifest;
use crate::error::Result;
use crate::util::normalize_text_option;

/// Environment variable names understood by [`ClientConfig::from_env`]
pub const ENV_API_BASE_URL: &str = "CHOMPIX_API_BASE_URL";
pub const ENV_SESSION_TOKEN: &str = "CHOMPIX_SESSION_TOKEN";
pub const ENV_CACHE_VERSION: &str = "CHOMPIX_CACHE_VERSION";
pub const ENV_CACHE_MANIFEST: &str = "CHOMPIX_CACHE_MANIFEST";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub session_token: Option<String>,
    #[serde(default)]
    pub cache_version: Option<String>,
    #[serde(default)]
    pub cache_manifest: Vec<String>,
}

impl ClientConfig {
    /// Read configuration from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            api_base_url: normalize_text_option(std::env::var(ENV_API_BASE_URL).ok()),
            session_token: normalize_text_option(std::env::var(ENV_SESSION_TOKEN).ok()),
            cache_version: normalize_text_option(std::env::var(ENV_CACHE_VERSION).ok()),
            cache_manifest: std::env::var(ENV_CACHE_MANIFEST)
                .map(|raw| parse_manifest_list(&raw))
                .unwrap_or_default(),
        }
    }

    /// Build the entry API client, or `None` when no base URL is configured.
    pub fn entry_api(&self) -> Result<Option<HttpEntryApi>> {
        let Some(base_url) = normalize_text_option(self.api_base_url.clone()) else {
            return Ok(None);
        };

        let mut api = HttpEntryApi::new(base_url)?;
        if let Some(token) = normalize_text_option(self.session_token.clone()) {
            api = api.with_session_token(token);
        }
        Ok(Some(api))
    }

    /// Build the offline cache manifest, or `None` when not configured.
    pub fn offline_cache_manifest(&self) -> Result<Option<CacheManifest>> {
        let Some(version) = normalize_text_option(self.cache_version.clone()) else {
            return Ok(None);
        };
        if self.cache_manifest.is_empty() {
            return Ok(None);
        }

        CacheManifest::new(version, self.cache_manifest.clone()).map(Some)
    }
}

/// Parse a comma-separated URL list, dropping blanks
fn parse_manifest_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(|url| normalize_text_option(Some(url.to_string())))
        .collect()
}
