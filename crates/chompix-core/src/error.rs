//! Error types for chompix-core

use thiserror::Error;

/// Result type alias using chompix-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in chompix-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Entry not found
    #[error("Entry not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Server entry API error
    #[error(transparent)]
    Api(#[from] crate::api::ApiError),

    /// Offline cache error
    #[error("Cache error: {0}")]
    Cache(String),
}
