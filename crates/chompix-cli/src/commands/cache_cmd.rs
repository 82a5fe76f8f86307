//! `chompix cache` - manage the offline response cache.

use std::path::Path;

use chompix_core::cache::{HttpFetcher, OfflineCache};

use crate::commands::common::{client_config, open_database};
use crate::error::CliError;

async fn open_cache(db_path: &Path) -> Result<OfflineCache<HttpFetcher>, CliError> {
    let Some(manifest) = client_config().offline_cache_manifest()? else {
        return Err(CliError::CacheNotConfigured);
    };

    let db = open_database(db_path).await?;
    Ok(OfflineCache::new(
        db.connection().clone(),
        HttpFetcher::new()?,
        manifest,
    ))
}

/// Precache the configured manifest and activate it immediately.
pub async fn run_cache_warm(db_path: &Path) -> Result<(), CliError> {
    let cache = open_cache(db_path).await?;
    cache.install().await?;
    cache.skip_waiting().await?;

    let version = cache.current_version().await?;
    println!("Cache {version} installed and active");
    Ok(())
}

/// Fetch a URL through the cache (network-first for API paths, cache-first
/// otherwise) and print the body.
pub async fn run_cache_fetch(url: &str, db_path: &Path) -> Result<(), CliError> {
    let cache = open_cache(db_path).await?;
    let response = cache.fetch(url).await?;

    match String::from_utf8(response.body.clone()) {
        Ok(text) => println!("{text}"),
        Err(_) => println!("<{} binary bytes>", response.body.len()),
    }
    Ok(())
}
