//! Record model shared across the IDScan client.
//!
//! A [`Record`] is one recognized identity document as returned by the
//! recognition backend. The backend assigns the [`RecordId`]; every other
//! field is free-form text the operator may correct.

use crate::error::{IdScanError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Backend-assigned record identifier.
///
/// Opaque to the client: it is only compared, displayed and placed in URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap an identifier received from the backend.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The editable text fields of a [`Record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordField {
    /// National identification number
    IdNumber,
    /// Given name
    Name,
    /// Family name
    LastName,
    /// Date of birth
    DateOfBirth,
    /// Date the document was issued
    DateOfIssue,
    /// Date the document expires
    DateOfExpiry,
}

impl RecordField {
    /// Every editable field, in display order.
    pub const ALL: [RecordField; 6] = [
        Self::IdNumber,
        Self::Name,
        Self::LastName,
        Self::DateOfBirth,
        Self::DateOfIssue,
        Self::DateOfExpiry,
    ];

    /// Name of the field in the backend's JSON.
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::IdNumber => "idNumber",
            Self::Name => "name",
            Self::LastName => "lastName",
            Self::DateOfBirth => "dateOfBirth",
            Self::DateOfIssue => "dateOfIssue",
            Self::DateOfExpiry => "dateOfExpiry",
        }
    }

    /// Get a human-readable column label.
    #[must_use]
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::IdNumber => "Identification Number",
            Self::Name => "Name",
            Self::LastName => "Last Name",
            Self::DateOfBirth => "Date of Birth",
            Self::DateOfIssue => "Date of Issue",
            Self::DateOfExpiry => "Date of Expiry",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for RecordField {
    type Err = IdScanError;

    /// Accepts the wire name (`lastName`) or its snake_case form (`last_name`).
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s.chars().filter(|c| *c != '_').collect();
        Self::ALL
            .into_iter()
            .find(|field| field.wire_name().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| IdScanError::Validation(format!("unknown record field '{s}'")))
    }
}

/// One recognized identity document.
///
/// Members the backend sends beyond the known fields are kept in `extra` so
/// they survive a full-record update and take part in search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Backend-assigned identifier
    #[serde(rename = "_id", alias = "id")]
    pub id: RecordId,
    /// National identification number
    #[serde(default, deserialize_with = "null_as_empty")]
    pub id_number: String,
    /// Given name
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    /// Family name
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_name: String,
    /// Date of birth
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date_of_birth: String,
    /// Date of issue
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date_of_issue: String,
    /// Date of expiry
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date_of_expiry: String,
    /// Unrecognized backend members, echoed back verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Read a text member, treating JSON `null` as empty.
///
/// The backend sends `null` for fields its OCR could not read.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Record {
    /// Create a record with empty text fields.
    #[must_use]
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            id_number: String::new(),
            name: String::new(),
            last_name: String::new(),
            date_of_birth: String::new(),
            date_of_issue: String::new(),
            date_of_expiry: String::new(),
            extra: Map::new(),
        }
    }

    /// Set a field and return the record (builder style).
    #[must_use]
    pub fn with_field(mut self, field: RecordField, value: impl Into<String>) -> Self {
        self.set_field(field, value);
        self
    }

    /// Read one editable field.
    #[must_use]
    pub fn field(&self, field: RecordField) -> &str {
        match field {
            RecordField::IdNumber => &self.id_number,
            RecordField::Name => &self.name,
            RecordField::LastName => &self.last_name,
            RecordField::DateOfBirth => &self.date_of_birth,
            RecordField::DateOfIssue => &self.date_of_issue,
            RecordField::DateOfExpiry => &self.date_of_expiry,
        }
    }

    /// Replace one editable field.
    pub fn set_field(&mut self, field: RecordField, value: impl Into<String>) {
        let slot = match field {
            RecordField::IdNumber => &mut self.id_number,
            RecordField::Name => &mut self.name,
            RecordField::LastName => &mut self.last_name,
            RecordField::DateOfBirth => &mut self.date_of_birth,
            RecordField::DateOfIssue => &mut self.date_of_issue,
            RecordField::DateOfExpiry => &mut self.date_of_expiry,
        };
        *slot = value.into();
    }

    /// String form of every member: the id, the text fields, then `extra`.
    ///
    /// Strings are yielded as-is; other JSON values use their JSON text.
    pub fn searchable_values(&self) -> impl Iterator<Item = Cow<'_, str>> {
        let known = std::iter::once(Cow::Borrowed(self.id.as_str()))
            .chain(RecordField::ALL.into_iter().map(move |f| Cow::Borrowed(self.field(f))));
        let extra = self.extra.values().map(|value| match value {
            Value::String(s) => Cow::Borrowed(s.as_str()),
            other => Cow::Owned(other.to_string()),
        });
        known.chain(extra)
    }
}

/// An image chosen by the operator for recognition.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageFile {
    /// File name sent with the upload
    pub file_name: String,
    /// Raw image bytes
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Create an image from in-memory bytes.
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Read an image from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map_or_else(|| "image".to_string(), |n| n.to_string_lossy().into_owned());
        Ok(Self { file_name, bytes })
    }

    /// Size of the image in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

impl fmt::Debug for ImageFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageFile")
            .field("file_name", &self.file_name)
            .field("size", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserializes_backend_shape() {
        let json = r#"{
            "_id": "65a1f0",
            "idNumber": "1 2345 67890 12 3",
            "name": "Somchai",
            "lastName": "Jaidee",
            "dateOfBirth": "1 Jan. 1990",
            "dateOfIssue": "2 Feb. 2020",
            "dateOfExpiry": "1 Jan. 2029",
            "__v": 0
        }"#;

        let record: Record = serde_json::from_str(json).expect("deserialize record");
        assert_eq!(record.id.as_str(), "65a1f0");
        assert_eq!(record.last_name, "Jaidee");
        assert_eq!(record.extra.get("__v"), Some(&Value::from(0)));
    }

    #[test]
    fn test_record_reads_null_fields_as_empty() {
        let record: Record = serde_json::from_str(r#"{"_id":"b","dateOfIssue":null}"#)
            .expect("deserialize record");
        assert_eq!(record.id, RecordId::new("b"));
        assert_eq!(record.date_of_issue, "");
        assert!(record.extra.is_empty());

        let records: Vec<Record> =
            serde_json::from_str(r#"[{"_id":"a","name":"X"},{"_id":"b","dateOfIssue":null}]"#)
                .expect("one null field does not fail the list");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "X");
    }

    #[test]
    fn test_record_accepts_plain_id_and_missing_fields() {
        let record: Record =
            serde_json::from_str(r#"{"id": "a1", "name": "X"}"#).expect("deserialize record");
        assert_eq!(record.id, RecordId::new("a1"));
        assert_eq!(record.name, "X");
        assert!(record.id_number.is_empty());
    }

    #[test]
    fn test_record_serializes_wire_names() {
        let record = Record::new("a1").with_field(RecordField::DateOfExpiry, "2030");
        let json = serde_json::to_value(&record).expect("serialize record");
        assert_eq!(json["_id"], "a1");
        assert_eq!(json["dateOfExpiry"], "2030");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn test_field_access() {
        let mut record = Record::new("a1");
        for field in RecordField::ALL {
            record.set_field(field, field.wire_name());
        }
        for field in RecordField::ALL {
            assert_eq!(record.field(field), field.wire_name());
        }
    }

    #[test]
    fn test_field_from_str() {
        assert_eq!("lastName".parse::<RecordField>().unwrap(), RecordField::LastName);
        assert_eq!(
            "date_of_issue".parse::<RecordField>().unwrap(),
            RecordField::DateOfIssue
        );
        assert_eq!("NAME".parse::<RecordField>().unwrap(), RecordField::Name);
        assert!("age".parse::<RecordField>().is_err());
    }

    #[test]
    fn test_field_display() {
        assert_eq!(RecordField::IdNumber.to_string(), "Identification Number");
        assert_eq!(RecordField::DateOfBirth.to_string(), "Date of Birth");
    }

    #[test]
    fn test_searchable_values_include_id_and_extra() {
        let mut record = Record::new("a1").with_field(RecordField::Name, "Somchai");
        record.extra.insert("__v".to_string(), Value::from(3));
        record
            .extra
            .insert("source".to_string(), Value::from("scanner"));

        let values: Vec<String> = record.searchable_values().map(Cow::into_owned).collect();
        assert_eq!(values[0], "a1");
        assert!(values.contains(&"Somchai".to_string()));
        assert!(values.contains(&"3".to_string()));
        assert!(values.contains(&"scanner".to_string()));
    }

    #[test]
    fn test_image_file_from_path() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("card.png");
        std::fs::write(&path, [0u8; 64]).expect("write image");

        let image = ImageFile::from_path(&path).expect("read image");
        assert_eq!(image.file_name, "card.png");
        assert_eq!(image.size(), 64);
        assert!(format!("{image:?}").contains("size: 64"));
    }
}
