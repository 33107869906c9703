//! Text search over the held collection.
//!
//! Filtering is destructive: the result replaces the held collection, so
//! broadening the query afterwards does not bring excluded records back.
//! Only a fresh load restores them.

use crate::store::RecordStore;
use idscan_core::Record;
use tracing::debug;

/// Key that commits a search from the query input.
pub const COMMIT_KEY: &str = "Enter";

/// Whether `key` is the commit key.
#[must_use]
pub fn is_commit_key(key: &str) -> bool {
    key == COMMIT_KEY
}

/// Whether any member of `record` contains `query`, ignoring case.
///
/// An empty query matches every record.
#[must_use]
pub fn matches(record: &Record, query: &str) -> bool {
    let needle = query.to_lowercase();
    matches_lowercase(record, &needle)
}

fn matches_lowercase(record: &Record, needle: &str) -> bool {
    record
        .searchable_values()
        .any(|value| value.to_lowercase().contains(needle))
}

/// The records matching `query`, in their original relative order.
#[must_use]
pub fn apply_filter(records: &[Record], query: &str) -> Vec<Record> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|record| matches_lowercase(record, &needle))
        .cloned()
        .collect()
}

/// Narrow the held collection to the records matching `query`.
/// Returns the number of records kept.
pub fn narrow(store: &RecordStore, query: &str) -> usize {
    let kept = store.replace_with(|held| apply_filter(held, query));
    debug!(query, kept, "applied search filter");
    kept
}
