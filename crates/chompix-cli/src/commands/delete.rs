//! `chompix delete` - remove an entry locally; the server copy is deleted
//! best effort and never blocks the local removal.

use std::path::Path;

use chompix_core::db::EntryStore;
use chompix_core::models::EntryId;
use chompix_core::sync::SyncEngine;

use crate::commands::common::{client_config, connectivity_from_env, open_store};
use crate::error::CliError;

pub async fn run_delete(raw_id: &str, db_path: &Path) -> Result<(), CliError> {
    let id: EntryId = raw_id
        .parse()
        .map_err(|_| CliError::InvalidEntryId(raw_id.to_string()))?;

    let (_db, store) = open_store(db_path).await?;

    match client_config().entry_api()? {
        Some(api) => {
            let engine = SyncEngine::new(store, api, connectivity_from_env());
            engine.delete_entry(id).await?;
        }
        None => {
            tracing::debug!(%id, "no server configured, deleting locally only");
            store.delete(id).await?;
        }
    }

    println!("{id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use chompix_core::db::EntryStore;
    use chompix_core::models::EntryDraft;

    use super::*;
    use crate::commands::common::open_store;
    use crate::commands::common::test_support::{cleanup_db_files, unique_test_db_path};

    #[tokio::test(flavor = "multi_thread")]
    async fn run_delete_removes_local_entry() {
        let db_path = unique_test_db_path();
        let id = {
            let (_db, store) = open_store(&db_path).await.unwrap();
            store
                .create(EntryDraft::with_text("delete me"))
                .await
                .unwrap()
                .id
        };

        run_delete(&id.to_string(), &db_path).await.unwrap();

        let (_db, store) = open_store(&db_path).await.unwrap();
        assert!(store.get(id).await.unwrap().is_none());

        cleanup_db_files(&db_path);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn run_delete_rejects_non_numeric_id() {
        let db_path = unique_test_db_path();

        let error = run_delete("abc", &db_path).await.unwrap_err();
        assert!(matches!(error, CliError::InvalidEntryId(_)));

        cleanup_db_files(&db_path);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn run_delete_missing_entry_is_not_found() {
        let db_path = unique_test_db_path();
        {
            let (_db, _store) = open_store(&db_path).await.unwrap();
        }

        let error = run_delete("42", &db_path).await.unwrap_err();
        assert!(matches!(
            error,
            CliError::Core(chompix_core::Error::NotFound(_))
        ));

        cleanup_db_files(&db_path);
    }
}
