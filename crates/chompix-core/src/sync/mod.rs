//! Best-effort reconciliation between the local entry store and the server.
//!
//! One sync pass pushes unsynced entries sequentially, then pulls the
//! server's full list and merges it. There is no retry, no backoff, and no
//! conflict detection beyond the synced flag; two clients syncing the same
//! account can still duplicate server entries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::api::EntryApi;
use crate::db::EntryStore;
use crate::error::Result;
use crate::models::EntryId;

/// Shared connectivity signal, the analogue of `navigator.onLine`.
///
/// Advisory only: a positive answer does not guarantee a request will
/// succeed. The host flips it on connectivity change events.
#[derive(Clone, Debug)]
pub struct Connectivity(Arc<AtomicBool>);

impl Connectivity {
    #[must_use]
    pub fn new(online: bool) -> Self {
        Self(Arc::new(AtomicBool::new(online)))
    }

    #[must_use]
    pub fn online() -> Self {
        Self::new(true)
    }

    pub fn set_online(&self, online: bool) {
        self.0.store(online, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_online(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::online()
    }
}

/// Outcome of one sync pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    /// Entries uploaded and marked synced during this pass
    pub pushed: usize,
    /// Server entries merged into the local store
    pub pulled: usize,
    /// True when the pass was skipped because the client was offline
    pub skipped_offline: bool,
}

impl SyncReport {
    #[must_use]
    const fn skipped() -> Self {
        Self {
            pushed: 0,
            pulled: 0,
            skipped_offline: true,
        }
    }
}

/// Orchestrates push-then-pull reconciliation, tolerating offline conditions
pub struct SyncEngine<S, A> {
    store: S,
    api: A,
    connectivity: Connectivity,
}

impl<S: EntryStore, A: EntryApi> SyncEngine<S, A> {
    pub const fn new(store: S, api: A, connectivity: Connectivity) -> Self {
        Self {
            store,
            api,
            connectivity,
        }
    }

    /// Advisory connectivity signal
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    /// Run one sync pass: push unsynced entries, then pull the server list.
    ///
    /// Offline is a successful no-op. An upload failure aborts the pass with
    /// the remaining entries left unsynced for the next attempt; entries are
    /// never double-uploaded because only `synced = false` rows are pushed
    /// and the flag flips only after the server acknowledges the upload.
    pub async fn sync_with_server(&self) -> Result<SyncReport> {
        if !self.is_online() {
            tracing::debug!("offline, skipping sync pass");
            return Ok(SyncReport::skipped());
        }

        let unsynced = self.store.list_unsynced().await?;
        let mut pushed = 0;
        for entry in &unsynced {
            let uploaded = self.api.create_entry(&entry.to_upload()).await?;
            self.store.mark_synced(entry.id).await?;
            tracing::debug!(local_id = %entry.id, server_id = %uploaded.id, "uploaded entry");
            pushed += 1;
        }

        let server_entries = self.api.list_entries().await?;
        for server_entry in &server_entries {
            self.store.upsert_from_server(server_entry).await?;
        }
        let pulled = server_entries.len();

        tracing::info!(pushed, pulled, "sync pass complete");
        Ok(SyncReport {
            pushed,
            pulled,
            skipped_offline: false,
        })
    }

    /// Best-effort remote delete.
    ///
    /// Offline skips silently; there is no durable queue, so a deferred
    /// delete is abandoned on restart. Online failures are logged and
    /// swallowed so local deletion always proceeds.
    pub async fn delete_entry_on_server(&self, id: EntryId) {
        if !self.is_online() {
            tracing::debug!(%id, "offline, deferring server delete");
            return;
        }

        if let Err(error) = self.api.delete_entry(id).await {
            tracing::warn!(%id, %error, "server delete failed, keeping local deletion");
        }
    }

    /// Delete an entry locally, then best-effort on the server.
    ///
    /// Local state is the source of truth for delete intent; a remote
    /// failure never blocks the local removal.
    pub async fn delete_entry(&self, id: EntryId) -> Result<()> {
        self.store.delete(id).await?;
        self.delete_entry_on_server(id).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::api::{ApiError, ApiResult};
    use crate::db::{Database, LibSqlEntryStore};
    use crate::models::{EntryDraft, EntryUpload, ServerEntry};

    /// In-memory stand-in for the server entry API
    #[derive(Default)]
    struct FakeApi {
        entries: Mutex<Vec<ServerEntry>>,
        next_id: AtomicI64,
        requests: AtomicUsize,
        uploads: AtomicUsize,
        deleted: Mutex<Vec<EntryId>>,
        fail_upload_at: Option<usize>,
        fail_deletes: bool,
    }

    impl FakeApi {
        fn new() -> Self {
            Self {
                next_id: AtomicI64::new(1000),
                ..Self::default()
            }
        }

        fn with_entries(entries: Vec<ServerEntry>) -> Self {
            let api = Self::new();
            *api.entries.lock().unwrap() = entries;
            api
        }

        fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }

        fn server_entry(id: i64, text: &str) -> ServerEntry {
            ServerEntry {
                id: EntryId::new(id),
                timestamp: "2024-03-01T12:00:00+00:00".to_string(),
                event_datetime: None,
                text: text.to_string(),
                photo: None,
            }
        }
    }

    #[async_trait]
    impl EntryApi for FakeApi {
        async fn create_entry(&self, upload: &EntryUpload) -> ApiResult<ServerEntry> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            let attempt = self.uploads.fetch_add(1, Ordering::SeqCst);
            if self.fail_upload_at == Some(attempt) {
                return Err(ApiError::Api("injected upload failure (500)".to_string()));
            }

            let entry = ServerEntry {
                id: EntryId::new(self.next_id.fetch_add(1, Ordering::SeqCst)),
                timestamp: upload.timestamp.clone(),
                event_datetime: Some(upload.event_datetime.clone()),
                text: upload.text.clone(),
                photo: upload.photo.clone(),
            };
            self.entries.lock().unwrap().push(entry.clone());
            Ok(entry)
        }

        async fn list_entries(&self) -> ApiResult<Vec<ServerEntry>> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            Ok(self.entries.lock().unwrap().clone())
        }

        async fn delete_entry(&self, id: EntryId) -> ApiResult<()> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            if self.fail_deletes {
                return Err(ApiError::Api("injected delete failure (502)".to_string()));
            }
            self.deleted.lock().unwrap().push(id);
            Ok(())
        }
    }

    async fn engine_with(
        api: FakeApi,
        connectivity: Connectivity,
    ) -> (Database, SyncEngine<LibSqlEntryStore, FakeApi>) {
        let db = Database::open_in_memory().await.unwrap();
        let store = LibSqlEntryStore::new(db.connection().clone());
        (db, SyncEngine::new(store, api, connectivity))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn offline_sync_is_a_noop_with_zero_requests() {
        let (_db, engine) = engine_with(FakeApi::new(), Connectivity::new(false)).await;
        engine
            .store
            .create(EntryDraft::with_text("pending"))
            .await
            .unwrap();

        let report = engine.sync_with_server().await.unwrap();

        assert!(report.skipped_offline);
        assert_eq!(engine.api.requests(), 0);
        let all = engine.store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(!all[0].synced);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sync_uploads_all_unsynced_and_marks_them() {
        let (_db, engine) = engine_with(FakeApi::new(), Connectivity::online()).await;
        for text in ["breakfast", "lunch", "dinner"] {
            engine
                .store
                .create(EntryDraft::with_text(text))
                .await
                .unwrap();
        }

        let report = engine.sync_with_server().await.unwrap();

        assert_eq!(report.pushed, 3);
        assert!(engine.store.list_unsynced().await.unwrap().is_empty());
        assert_eq!(engine.api.entries.lock().unwrap().len(), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn upload_failure_aborts_remaining_uploads() {
        let api = FakeApi {
            fail_upload_at: Some(1),
            ..FakeApi::new()
        };
        let (_db, engine) = engine_with(api, Connectivity::online()).await;
        for text in ["first", "second", "third"] {
            engine
                .store
                .create(EntryDraft::with_text(text))
                .await
                .unwrap();
        }

        let error = engine.sync_with_server().await.unwrap_err();
        assert!(error.to_string().contains("injected upload failure"));

        // First upload landed, second failed, third was never attempted
        assert_eq!(engine.api.uploads.load(Ordering::SeqCst), 2);
        let unsynced = engine.store.list_unsynced().await.unwrap();
        assert_eq!(unsynced.len(), 2);
        assert_eq!(unsynced[0].text, "second");
        assert_eq!(unsynced[1].text, "third");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn second_pass_does_not_reupload_synced_entries() {
        let (_db, engine) = engine_with(FakeApi::new(), Connectivity::online()).await;
        engine
            .store
            .create(EntryDraft::with_text("once"))
            .await
            .unwrap();

        engine.sync_with_server().await.unwrap();
        let report = engine.sync_with_server().await.unwrap();

        assert_eq!(report.pushed, 0);
        assert_eq!(engine.api.entries.lock().unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sync_pulls_server_entries_into_store() {
        let api = FakeApi::with_entries(vec![
            FakeApi::server_entry(11, "remote one"),
            FakeApi::server_entry(12, "remote two"),
        ]);
        let (_db, engine) = engine_with(api, Connectivity::online()).await;

        let report = engine.sync_with_server().await.unwrap();

        assert_eq!(report.pulled, 2);
        let all = engine.store.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|entry| entry.synced));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_entry_offline_removes_locally_without_requests() {
        let connectivity = Connectivity::new(false);
        let (_db, engine) = engine_with(FakeApi::new(), connectivity).await;
        let entry = engine
            .store
            .create(EntryDraft::with_text("doomed"))
            .await
            .unwrap();

        engine.delete_entry(entry.id).await.unwrap();

        assert!(engine.store.list_all().await.unwrap().is_empty());
        assert_eq!(engine.api.requests(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_entry_swallows_remote_failure() {
        let api = FakeApi {
            fail_deletes: true,
            ..FakeApi::new()
        };
        let (_db, engine) = engine_with(api, Connectivity::online()).await;
        let entry = engine
            .store
            .create(EntryDraft::with_text("doomed"))
            .await
            .unwrap();

        engine.delete_entry(entry.id).await.unwrap();

        assert!(engine.store.list_all().await.unwrap().is_empty());
        assert!(engine.api.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn delete_entry_online_issues_remote_delete() {
        let (_db, engine) = engine_with(FakeApi::new(), Connectivity::online()).await;
        let entry = engine
            .store
            .create(EntryDraft::with_text("doomed"))
            .await
            .unwrap();

        engine.delete_entry(entry.id).await.unwrap();

        assert_eq!(engine.api.deleted.lock().unwrap().as_slice(), &[entry.id]);
    }

    #[test]
    fn connectivity_flag_is_shared_between_clones() {
        let connectivity = Connectivity::online();
        let clone = connectivity.clone();
        clone.set_online(false);
        assert!(!connectivity.is_online());
    }
}
