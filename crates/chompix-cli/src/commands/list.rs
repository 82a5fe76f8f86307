//! `chompix list` - show diary entries, newest last (insertion order).

use std::path::Path;

use crate::commands::common::{
    entry_to_list_item, format_entry_lines, list_entries, open_store, EntryListItem,
};
use crate::error::CliError;

pub async fn run_list(
    limit: usize,
    unsynced_only: bool,
    as_json: bool,
    db_path: &Path,
) -> Result<(), CliError> {
    let (_db, store) = open_store(db_path).await?;
    let mut entries = list_entries(&store, unsynced_only).await?;
    entries.truncate(limit);

    if as_json {
        let json_items = entries
            .iter()
            .map(entry_to_list_item)
            .collect::<Vec<EntryListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
    } else {
        for line in format_entry_lines(&entries) {
            println!("{line}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chompix_core::db::EntryStore;
    use chompix_core::models::EntryDraft;
    use pretty_assertions::assert_eq;

    use crate::commands::common::open_store;
    use crate::commands::common::test_support::{cleanup_db_files, unique_test_db_path};

    #[tokio::test(flavor = "multi_thread")]
    async fn list_entries_filters_unsynced() {
        let db_path = unique_test_db_path();
        {
            let (_db, store) = open_store(&db_path).await.unwrap();
            let first = store.create(EntryDraft::with_text("synced")).await.unwrap();
            store.create(EntryDraft::with_text("pending")).await.unwrap();
            store.mark_synced(first.id).await.unwrap();
        }

        let (_db, store) = open_store(&db_path).await.unwrap();
        let all = super::list_entries(&store, false).await.unwrap();
        assert_eq!(all.len(), 2);

        let unsynced = super::list_entries(&store, true).await.unwrap();
        assert_eq!(unsynced.len(), 1);
        assert_eq!(unsynced[0].text, "pending");

        cleanup_db_files(&db_path);
    }
}
