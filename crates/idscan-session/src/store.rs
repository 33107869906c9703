//! The held collection of records.
//!
//! Order is insertion/load order and is the display order. Ids are keys but
//! no deduplication is performed: operations addressing an id apply to every
//! held record carrying it.

use idscan_client::{ClientError, RecordBackend};
use idscan_core::{Record, RecordField, RecordId};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// Shared handle to the ordered record collection. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct RecordStore {
    records: Arc<RwLock<Vec<Record>>>,
}

impl RecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `records`.
    #[must_use]
    pub fn with_records(records: Vec<Record>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Record>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Record>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the whole collection with the backend's current list.
    ///
    /// Unsaved local edits and any applied filter are discarded. On failure
    /// the collection is left as it was. Concurrent loads are not sequenced:
    /// whichever response arrives last wins.
    pub async fn load<B>(&self, backend: &B) -> Result<usize, ClientError>
    where
        B: RecordBackend + ?Sized,
    {
        match backend.list_records().await {
            Ok(records) => {
                let count = records.len();
                self.replace_all(records);
                info!(count, backend = backend.backend_id(), "loaded records");
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, backend = backend.backend_id(), "failed to load records");
                Err(e)
            }
        }
    }

    /// Add a record at the end.
    pub fn append(&self, record: Record) {
        debug!(id = %record.id, "appending record");
        self.write().push(record);
    }

    /// Remove the record with `id`. Returns whether anything was removed.
    pub fn remove(&self, id: &RecordId) -> bool {
        let mut records = self.write();
        let before = records.len();
        records.retain(|r| &r.id != id);
        records.len() < before
    }

    /// Replace one field of the record with `id` in place.
    /// Returns whether a record was updated.
    pub fn update_field(&self, id: &RecordId, field: RecordField, value: &str) -> bool {
        let mut updated = false;
        for record in self.write().iter_mut().filter(|r| &r.id == id) {
            record.set_field(field, value);
            updated = true;
        }
        updated
    }

    /// Replace the whole collection.
    pub fn replace_all(&self, records: Vec<Record>) {
        *self.write() = records;
    }

    /// Replace the collection with a value computed from it, under one lock.
    pub fn replace_with<F>(&self, f: F) -> usize
    where
        F: FnOnce(&[Record]) -> Vec<Record>,
    {
        let mut records = self.write();
        *records = f(&records);
        records.len()
    }

    /// Snapshot of the collection, in display order.
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        self.read().clone()
    }

    /// First held record with `id`.
    #[must_use]
    pub fn get(&self, id: &RecordId) -> Option<Record> {
        self.read().iter().find(|r| &r.id == id).cloned()
    }

    /// Whether a record with `id` is held.
    #[must_use]
    pub fn contains(&self, id: &RecordId) -> bool {
        self.read().iter().any(|r| &r.id == id)
    }

    /// Number of held records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
