//! Per-record edit mode.
//!
//! Field edits are applied to the [`RecordStore`] as they are typed, not
//! buffered. Saving sends the record's current local values as a full-record
//! update. A failed save leaves the record in edit mode with its local values
//! in place (no rollback) and raises no notification; the failure is only
//! logged and returned.

use crate::error::{Result, SessionError};
use crate::store::RecordStore;
use idscan_client::RecordBackend;
use idscan_core::{RecordField, RecordId};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Whether a record is being displayed or edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EditState {
    /// Read-only display
    #[default]
    Viewing,
    /// Inline field editing
    Editing,
}

/// Shared handle to the per-record edit states. Clones share state.
///
/// Records absent from the mapping are [`EditState::Viewing`].
#[derive(Clone, Debug, Default)]
pub struct EditSession {
    states: Arc<Mutex<HashMap<RecordId, EditState>>>,
}

impl EditSession {
    /// Create an edit session with every record in viewing state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RecordId, EditState>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Put `id` into edit mode. Any number of records may be edited at once.
    pub fn begin(&self, id: &RecordId) {
        debug!(%id, "entering edit mode");
        self.lock().insert(id.clone(), EditState::Editing);
    }

    /// Current state of `id`.
    #[must_use]
    pub fn state(&self, id: &RecordId) -> EditState {
        self.lock().get(id).copied().unwrap_or_default()
    }

    /// Whether `id` is in edit mode.
    #[must_use]
    pub fn is_editing(&self, id: &RecordId) -> bool {
        self.state(id) == EditState::Editing
    }

    /// Ids currently in edit mode, sorted.
    #[must_use]
    pub fn editing_ids(&self) -> Vec<RecordId> {
        let mut ids: Vec<RecordId> = self
            .lock()
            .iter()
            .filter(|(_, state)| **state == EditState::Editing)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Drop the edit state of a record that no longer exists.
    pub fn forget(&self, id: &RecordId) {
        self.lock().remove(id);
    }

    /// Apply a typed value to the held record immediately.
    ///
    /// Ignored unless `id` is in edit mode. Returns whether the store changed.
    pub fn edit_field(
        &self,
        store: &RecordStore,
        id: &RecordId,
        field: RecordField,
        value: &str,
    ) -> bool {
        if !self.is_editing(id) {
            debug!(%id, %field, "ignoring edit of record not in edit mode");
            return false;
        }
        store.update_field(id, field, value)
    }

    /// Send the record's current local values to the backend.
    ///
    /// On success the record returns to viewing state. On failure it stays
    /// in edit mode and its local values are kept.
    pub async fn save<B>(&self, backend: &B, store: &RecordStore, id: &RecordId) -> Result<()>
    where
        B: RecordBackend + ?Sized,
    {
        let Some(record) = store.get(id) else {
            warn!(%id, "cannot save record that is not held");
            return Err(SessionError::RecordNotFound(id.clone()));
        };

        match backend.update_record(&record).await {
            Ok(()) => {
                self.lock().insert(id.clone(), EditState::Viewing);
                info!(%id, "record updated");
                Ok(())
            }
            Err(e) => {
                warn!(%id, error = %e, "record update failed, staying in edit mode");
                Err(e.into())
            }
        }
    }
}
