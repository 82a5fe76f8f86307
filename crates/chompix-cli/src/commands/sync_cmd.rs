//! `chompix sync` - one push-then-pull pass against the configured server.

use std::path::Path;

use chompix_core::sync::SyncEngine;

use crate::commands::common::{client_config, connectivity_from_env, open_store};
use crate::error::CliError;

pub async fn run_sync(db_path: &Path) -> Result<(), CliError> {
    let Some(api) = client_config().entry_api()? else {
        return Err(CliError::SyncNotConfigured);
    };

    let (_db, store) = open_store(db_path).await?;
    let engine = SyncEngine::new(store, api, connectivity_from_env());

    let report = engine.sync_with_server().await?;
    if report.skipped_offline {
        println!("Offline, sync skipped");
    } else {
        println!(
            "Sync completed: {} pushed, {} pulled",
            report.pushed, report.pulled
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::common::test_support::{cleanup_db_files, unique_test_db_path};

    #[tokio::test(flavor = "multi_thread")]
    async fn run_sync_requires_configuration() {
        let db_path = unique_test_db_path();

        let error = run_sync(&db_path).await.unwrap_err();
        assert!(matches!(error, CliError::SyncNotConfigured));

        cleanup_db_files(&db_path);
    }
}
