//! Local entry store implementation

use async_trait::async_trait;
use libsql::{params, Connection};

use crate::error::{Error, Result};
use crate::models::{Entry, EntryDraft, EntryId, ServerEntry};

/// Trait for durable local entry storage.
///
/// All operations are local writes; no implementation may perform network
/// I/O. The sync engine is the only component that talks to the server.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Insert a new entry with `synced = false`, defaulting missing fields
    async fn create(&self, draft: EntryDraft) -> Result<Entry>;

    /// Get an entry by id
    async fn get(&self, id: EntryId) -> Result<Option<Entry>>;

    /// List every entry in insertion order
    async fn list_all(&self) -> Result<Vec<Entry>>;

    /// List entries not yet acknowledged by the server
    async fn list_unsynced(&self) -> Result<Vec<Entry>>;

    /// Mark an entry as acknowledged by the server
    async fn mark_synced(&self, id: EntryId) -> Result<()>;

    /// Remove an entry
    async fn delete(&self, id: EntryId) -> Result<()>;

    /// Merge a server entry into the local store.
    ///
    /// Unknown ids are inserted with `synced = true`. For an id that already
    /// exists locally only the synced flag is set; local `text`/`photo` edits
    /// are never overwritten by a pull.
    async fn upsert_from_server(&self, entry: &ServerEntry) -> Result<()>;
}

/// libSQL implementation of [`EntryStore`]
#[derive(Clone)]
pub struct LibSqlEntryStore {
    conn: Connection,
}

impl LibSqlEntryStore {
    /// Create a new store over the given connection
    #[must_use]
    pub const fn new(conn: Connection) -> Self {
        Self { conn }
    }

    fn parse_entry(row: &libsql::Row) -> Result<Entry> {
        Ok(Entry {
            id: EntryId::new(row.get::<i64>(0)?),
            timestamp: row.get::<String>(1)?,
            event_datetime: row.get::<String>(2)?,
            text: row.get::<String>(3)?,
            photo: row.get::<Option<String>>(4)?,
            synced: row.get::<i32>(5)? != 0,
        })
    }

    async fn query_entries(&self, sql: &str) -> Result<Vec<Entry>> {
        let mut rows = self.conn.query(sql, ()).await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(Self::parse_entry(&row)?);
        }
        Ok(entries)
    }
}

#[async_trait]
impl EntryStore for LibSqlEntryStore {
    async fn create(&self, draft: EntryDraft) -> Result<Entry> {
        let resolved = draft.resolve();

        self.conn
            .execute(
                "INSERT INTO entries (timestamp, event_datetime, text, photo, synced)
                 VALUES (?, ?, ?, ?, 0)",
                params![
                    resolved.timestamp.clone(),
                    resolved.event_datetime.clone(),
                    resolved.text.clone(),
                    resolved.photo.clone(),
                ],
            )
            .await?;

        let id = EntryId::new(self.conn.last_insert_rowid());
        tracing::debug!(%id, "created local entry");

        Ok(Entry {
            id,
            timestamp: resolved.timestamp,
            event_datetime: resolved.event_datetime,
            text: resolved.text,
            photo: resolved.photo,
            synced: false,
        })
    }

    async fn get(&self, id: EntryId) -> Result<Option<Entry>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, timestamp, event_datetime, text, photo, synced
                 FROM entries WHERE id = ?",
                params![id.as_i64()],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_entry(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<Entry>> {
        self.query_entries(
            "SELECT id, timestamp, event_datetime, text, photo, synced
             FROM entries ORDER BY id ASC",
        )
        .await
    }

    async fn list_unsynced(&self) -> Result<Vec<Entry>> {
        self.query_entries(
            "SELECT id, timestamp, event_datetime, text, photo, synced
             FROM entries WHERE synced = 0 ORDER BY id ASC",
        )
        .await
    }

    async fn mark_synced(&self, id: EntryId) -> Result<()> {
        let rows = self
            .conn
            .execute(
                "UPDATE entries SET synced = 1 WHERE id = ?",
                params![id.as_i64()],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn delete(&self, id: EntryId) -> Result<()> {
        let rows = self
            .conn
            .execute("DELETE FROM entries WHERE id = ?", params![id.as_i64()])
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn upsert_from_server(&self, entry: &ServerEntry) -> Result<()> {
        if self.get(entry.id).await?.is_some() {
            self.conn
                .execute(
                    "UPDATE entries SET synced = 1 WHERE id = ?",
                    params![entry.id.as_i64()],
                )
                .await?;
            return Ok(());
        }

        self.conn
            .execute(
                "INSERT INTO entries (id, timestamp, event_datetime, text, photo, synced)
                 VALUES (?, ?, ?, ?, ?, 1)",
                params![
                    entry.id.as_i64(),
                    entry.timestamp.clone(),
                    entry.event_datetime_or_timestamp().to_string(),
                    entry.text.clone(),
                    entry.photo.clone(),
                ],
            )
            .await?;
        tracing::debug!(id = %entry.id, "inserted server entry");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::db::Database;

    async fn setup() -> (Database, LibSqlEntryStore) {
        let db = Database::open_in_memory().await.unwrap();
        let store = LibSqlEntryStore::new(db.connection().clone());
        (db, store)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn create_assigns_unique_ids_and_defaults() {
        let (_db, store) = setup().await;

        let first = store.create(EntryDraft::with_text("eggs")).await.unwrap();
        let second = store.create(EntryDraft::default()).await.unwrap();

        assert_ne!(first.id, second.id);
        assert!(!first.synced);
        assert_eq!(second.text, "");
        assert_eq!(second.event_datetime, second.timestamp);

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|entry| !entry.synced));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn list_unsynced_filters_on_flag() {
        let (_db, store) = setup().await;

        let first = store.create(EntryDraft::with_text("a")).await.unwrap();
        store.create(EntryDraft::with_text("b")).await.unwrap();

        store.mark_synced(first.id).await.unwrap();

        let unsynced = store.list_unsynced().await.unwrap();
        assert_eq!(unsynced.len(), 1);
        assert_eq!(unsynced[0].text, "b");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn mark_synced_flips_flag() {
        let (_db, store) = setup().await;

        let entry = store.create(EntryDraft::with_text("soup")).await.unwrap();
        store.mark_synced(entry.id).await.unwrap();

        let fetched = store.get(entry.id).await.unwrap().unwrap();
        assert!(fetched.synced);
        assert_eq!(fetched.text, "soup");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn mark_synced_missing_id_fails_without_side_effects() {
        let (_db, store) = setup().await;

        let entry = store.create(EntryDraft::with_text("kept")).await.unwrap();

        let error = store.mark_synced(EntryId::new(9999)).await.unwrap_err();
        assert!(matches!(error, Error::NotFound(_)));

        let fetched = store.get(entry.id).await.unwrap().unwrap();
        assert!(!fetched.synced);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_removes_entry() {
        let (_db, store) = setup().await;

        let entry = store.create(EntryDraft::with_text("gone")).await.unwrap();
        store.delete(entry.id).await.unwrap();

        assert!(store.get(entry.id).await.unwrap().is_none());
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_missing_id_is_not_found() {
        let (_db, store) = setup().await;

        let error = store.delete(EntryId::new(1)).await.unwrap_err();
        assert!(matches!(error, Error::NotFound(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn upsert_inserts_unknown_server_entry_as_synced() {
        let (_db, store) = setup().await;

        let server = ServerEntry {
            id: EntryId::new(41),
            timestamp: "2024-03-01T12:00:00+00:00".to_string(),
            event_datetime: None,
            text: "from server".to_string(),
            photo: None,
        };
        store.upsert_from_server(&server).await.unwrap();

        let fetched = store.get(EntryId::new(41)).await.unwrap().unwrap();
        assert!(fetched.synced);
        assert_eq!(fetched.text, "from server");
        assert_eq!(fetched.event_datetime, fetched.timestamp);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn upsert_existing_id_keeps_local_fields() {
        let (_db, store) = setup().await;

        let local = store
            .create(EntryDraft::with_text("local edit"))
            .await
            .unwrap();

        let server = ServerEntry {
            id: local.id,
            timestamp: "2024-03-01T12:00:00+00:00".to_string(),
            event_datetime: None,
            text: "server copy".to_string(),
            photo: Some("cGhvdG8=".to_string()),
        };
        store.upsert_from_server(&server).await.unwrap();

        let fetched = store.get(local.id).await.unwrap().unwrap();
        assert!(fetched.synced);
        assert_eq!(fetched.text, "local edit");
        assert_eq!(fetched.photo, None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn local_ids_keep_incrementing_past_server_ids() {
        let (_db, store) = setup().await;

        let server = ServerEntry {
            id: EntryId::new(100),
            timestamp: "2024-03-01T12:00:00+00:00".to_string(),
            event_datetime: None,
            text: "pulled".to_string(),
            photo: None,
        };
        store.upsert_from_server(&server).await.unwrap();

        let next = store.create(EntryDraft::with_text("new")).await.unwrap();
        assert!(next.id > EntryId::new(100));
    }
}
