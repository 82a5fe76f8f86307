use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] chompix_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No entry text or photo provided")]
    EmptyEntry,
    #[error("Entry ID must be a number, got: {0}")]
    InvalidEntryId(String),
    #[error("Invalid ISO-8601 timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("Could not read photo file {0}: {1}")]
    PhotoUnreadable(String, io::Error),
    #[error(
        "Sync is not configured. Set CHOMPIX_API_BASE_URL (and optionally CHOMPIX_SESSION_TOKEN) to enable `chompix sync`."
    )]
    SyncNotConfigured,
    #[error(
        "Offline cache is not configured. Set CHOMPIX_CACHE_VERSION and CHOMPIX_CACHE_MANIFEST to enable `chompix cache`."
    )]
    CacheNotConfigured,
}
