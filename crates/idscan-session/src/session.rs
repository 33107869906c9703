//! Operator session: one backend wired to the record store, edit modes,
//! uploads, search and notifications.

use crate::edit::{EditSession, EditState};
use crate::error::Result;
use crate::notifications::{NotificationCenter, NotificationKind, NotificationLifetimes};
use crate::search;
use crate::store::RecordStore;
use crate::upload::UploadController;
use idscan_client::RecordBackend;
use idscan_core::{is_properly_extracted, AppConfig, ImageFile, Record, RecordField, RecordId};
use serde::Serialize;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// One rendered row of the held collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRow {
    /// The record as currently held
    pub record: Record,
    /// Whether the identification number has the expected length
    pub properly_extracted: bool,
    /// Display or edit mode
    pub edit_state: EditState,
}

#[derive(Debug, Default)]
struct SearchPanel {
    visible: bool,
    term: String,
}

/// Shared operator session. Clones share state, so operations started from
/// different clones race exactly as independent operator actions do.
#[derive(Debug)]
pub struct Session<B: ?Sized> {
    backend: Arc<B>,
    store: RecordStore,
    edits: EditSession,
    uploads: UploadController,
    notifications: NotificationCenter,
    panel: Arc<Mutex<SearchPanel>>,
}

impl<B: ?Sized> Clone for Session<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            store: self.store.clone(),
            edits: self.edits.clone(),
            uploads: self.uploads.clone(),
            notifications: self.notifications.clone(),
            panel: Arc::clone(&self.panel),
        }
    }
}

impl<B: RecordBackend> Session<B> {
    /// Create a session with default limits and lifetimes.
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, &AppConfig::default())
    }

    /// Create a session using the upload limit and notification lifetimes
    /// from `config`.
    pub fn with_config(backend: B, config: &AppConfig) -> Self {
        Self::from_arc(Arc::new(backend), config)
    }
}

impl<B: RecordBackend + ?Sized> Session<B> {
    /// Create a session around an already shared backend.
    pub fn from_arc(backend: Arc<B>, config: &AppConfig) -> Self {
        debug!(backend = backend.backend_id(), "starting session");
        Self {
            backend,
            store: RecordStore::new(),
            edits: EditSession::new(),
            uploads: UploadController::new(config.upload.max_file_bytes),
            notifications: NotificationCenter::new(NotificationLifetimes::from(
                &config.notifications,
            )),
            panel: Arc::new(Mutex::new(SearchPanel::default())),
        }
    }

    fn panel(&self) -> MutexGuard<'_, SearchPanel> {
        self.panel.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The held collection.
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Per-record edit modes.
    pub fn edits(&self) -> &EditSession {
        &self.edits
    }

    /// Upload state.
    pub fn uploads(&self) -> &UploadController {
        &self.uploads
    }

    /// Visible notifications.
    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    // ── Upload ──────────────────────────────────────────────────────

    /// Select an image for upload. See [`UploadController::select`].
    pub fn select_file(&self, file: ImageFile) -> Result<()> {
        self.uploads.select(file)
    }

    /// Select an image file from disk. See [`UploadController::select_path`].
    pub fn select_path(&self, path: &Path) -> Result<()> {
        self.uploads.select_path(path)
    }

    /// Upload the selected image. See [`UploadController::submit`].
    pub async fn upload(&self) -> Result<Record> {
        self.uploads
            .submit(self.backend.as_ref(), &self.store, &self.notifications)
            .await
    }

    /// Whether the upload trigger is enabled.
    pub fn can_upload(&self) -> bool {
        self.uploads.can_submit()
    }

    // ── Search panel ────────────────────────────────────────────────

    /// Show or hide the search panel. Becoming visible reloads the
    /// collection; hiding leaves any in-flight load running.
    ///
    /// Returns the new visibility. A failed load is returned as an error,
    /// the panel stays visible.
    pub async fn toggle_search(&self) -> Result<bool> {
        let visible = {
            let mut panel = self.panel();
            panel.visible = !panel.visible;
            panel.visible
        };
        debug!(visible, "search panel toggled");
        if visible {
            self.load().await?;
        }
        Ok(visible)
    }

    /// Whether the search panel is shown.
    pub fn search_visible(&self) -> bool {
        self.panel().visible
    }

    /// Replace the held collection with the backend's list.
    /// See [`RecordStore::load`].
    pub async fn load(&self) -> Result<usize> {
        Ok(self.store.load(self.backend.as_ref()).await?)
    }

    /// Set the search query. Nothing is filtered until a search is committed.
    pub fn set_search_term(&self, term: impl Into<String>) {
        self.panel().term = term.into();
    }

    /// Current search query.
    pub fn search_term(&self) -> String {
        self.panel().term.clone()
    }

    /// Narrow the held collection to records matching the current query.
    /// Returns the number of records kept.
    pub fn search(&self) -> usize {
        let term = self.search_term();
        search::narrow(&self.store, &term)
    }

    /// Handle a key press in the query input. The commit key runs
    /// [`search`](Self::search); any other key does nothing.
    pub fn search_key_pressed(&self, key: &str) -> Option<usize> {
        search::is_commit_key(key).then(|| self.search())
    }

    // ── Editing ─────────────────────────────────────────────────────

    /// Put `id` into edit mode.
    pub fn begin_edit(&self, id: &RecordId) {
        self.edits.begin(id);
    }

    /// Apply a typed value to a record in edit mode.
    pub fn edit_field(&self, id: &RecordId, field: RecordField, value: &str) -> bool {
        self.edits.edit_field(&self.store, id, field, value)
    }

    /// Send the record's local values to the backend.
    /// See [`EditSession::save`].
    pub async fn save(&self, id: &RecordId) -> Result<()> {
        self.edits.save(self.backend.as_ref(), &self.store, id).await
    }

    // ── Deletion ────────────────────────────────────────────────────

    /// Delete a record.
    ///
    /// An id not held locally is ignored without a backend call. Otherwise the
    /// record is removed locally once the backend confirms, and a confirmation
    /// is shown. A failed delete is logged and returned; the collection is
    /// unchanged. Returns whether a record was deleted.
    pub async fn delete(&self, id: &RecordId) -> Result<bool> {
        if !self.store.contains(id) {
            debug!(%id, "ignoring delete of record that is not held");
            return Ok(false);
        }

        if let Err(e) = self.backend.delete_record(id).await {
            warn!(%id, error = %e, "record delete failed");
            return Err(e.into());
        }

        self.store.remove(id);
        self.edits.forget(id);
        info!(%id, "record deleted");
        self.notifications.show(
            NotificationKind::DeletionConfirmed,
            format!("ID \"{id}\" deleted successfully!"),
        );
        Ok(true)
    }

    /// Dismiss a notification. Returns whether it was visible.
    pub fn dismiss(&self, kind: NotificationKind) -> bool {
        self.notifications.dismiss(kind)
    }

    /// Render snapshot of the held collection, in display order.
    pub fn rows(&self) -> Vec<RecordRow> {
        self.store
            .records()
            .into_iter()
            .map(|record| RecordRow {
                properly_extracted: is_properly_extracted(&record),
                edit_state: self.edits.state(&record.id),
                record,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idscan_client::{Failure, MemoryBackend, Operation};

    fn session_with(records: Vec<Record>) -> (MemoryBackend, Session<MemoryBackend>) {
        let backend = MemoryBackend::with_records(records);
        (backend.clone(), Session::new(backend))
    }

    #[tokio::test]
    async fn test_toggle_loads_only_when_shown() {
        let (backend, session) = session_with(vec![Record::new("a1")]);

        assert!(session.toggle_search().await.expect("show"));
        assert_eq!(backend.calls(Operation::List), 1);
        assert_eq!(session.store().len(), 1);

        assert!(!session.toggle_search().await.expect("hide"));
        assert_eq!(backend.calls(Operation::List), 1);
        assert!(!session.search_visible());
    }

    #[tokio::test]
    async fn test_failed_load_keeps_panel_visible() {
        let (backend, session) = session_with(vec![Record::new("a1")]);
        backend.fail(Operation::List, Failure::Status(500));

        assert!(session.toggle_search().await.is_err());
        assert!(session.search_visible());
        assert!(session.store().is_empty());
    }

    #[tokio::test]
    async fn test_key_press_commits_only_on_enter() {
        let (_, session) = session_with(vec![
            Record::new("a1").with_field(RecordField::Name, "Somchai"),
            Record::new("b2").with_field(RecordField::Name, "Malee"),
        ]);
        session.load().await.expect("load");
        session.set_search_term("MALEE");

        assert_eq!(session.search_key_pressed("m"), None);
        assert_eq!(session.store().len(), 2);

        assert_eq!(session.search_key_pressed("Enter"), Some(1));
        assert_eq!(session.search_term(), "MALEE");
    }

    #[tokio::test]
    async fn test_delete_confirms_with_id() {
        let (backend, session) = session_with(vec![Record::new("a1"), Record::new("b2")]);
        session.load().await.expect("load");

        assert!(session.delete(&RecordId::new("a1")).await.expect("delete"));
        assert_eq!(session.store().len(), 1);
        assert_eq!(backend.records().len(), 1);
        assert_eq!(
            session
                .notifications()
                .current(NotificationKind::DeletionConfirmed)
                .map(|n| n.message),
            Some("ID \"a1\" deleted successfully!".to_string())
        );
    }

    #[tokio::test]
    async fn test_delete_clears_edit_state() {
        let (_, session) = session_with(vec![Record::new("a1"), Record::new("b2")]);
        session.load().await.expect("load");
        let id = RecordId::new("a1");
        session.begin_edit(&id);
        session.begin_edit(&RecordId::new("b2"));

        assert!(session.delete(&id).await.expect("delete"));
        assert!(!session.edits().is_editing(&id));
        assert_eq!(session.edits().editing_ids(), vec![RecordId::new("b2")]);
    }

    #[tokio::test]
    async fn test_rows_carry_validity_and_edit_state() {
        let (_, session) = session_with(vec![
            Record::new("ok").with_field(RecordField::IdNumber, "1 2345 67890 12 3"),
            Record::new("bad").with_field(RecordField::IdNumber, "12345"),
        ]);
        session.load().await.expect("load");
        session.begin_edit(&RecordId::new("bad"));

        let rows = session.rows();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].properly_extracted);
        assert_eq!(rows[0].edit_state, EditState::Viewing);
        assert!(!rows[1].properly_extracted);
        assert_eq!(rows[1].edit_state, EditState::Editing);
    }

    #[tokio::test]
    async fn test_rows_serialize_camel_case() {
        let (_, session) = session_with(vec![Record::new("a1")]);
        session.load().await.expect("load");

        let json = serde_json::to_value(session.rows()).expect("serialize");
        assert_eq!(json[0]["properlyExtracted"], false);
        assert_eq!(json[0]["editState"], "viewing");
        assert_eq!(json[0]["record"]["_id"], "a1");
    }

    #[test]
    fn test_config_limits_apply() {
        let mut config = AppConfig::default();
        config.upload.max_file_bytes = 10;
        let session = Session::with_config(MemoryBackend::new(), &config);

        assert!(session
            .select_file(ImageFile::new("card.jpg", vec![0; 11]))
            .is_err());
        assert!(session.uploads().size_error());
        assert!(!session.can_upload());
    }
}
