//! Extraction quality hint.
//!
//! A record whose identification number does not have the expected length was
//! most likely misread by the recognition backend. This is only a display
//! hint: such records stay editable and deletable.

use crate::types::Record;

/// Expected length, in characters, of a correctly extracted identification number.
pub const ID_NUMBER_LENGTH: usize = 17;

/// Returns `false` iff the record's `id_number` is not exactly
/// [`ID_NUMBER_LENGTH`] characters long. Content is not inspected.
#[must_use]
pub fn is_properly_extracted(record: &Record) -> bool {
    record.id_number.chars().count() == ID_NUMBER_LENGTH
}
