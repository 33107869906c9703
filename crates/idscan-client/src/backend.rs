//! The recognition backend contract.

use crate::error::Result;
use async_trait::async_trait;
use idscan_core::{ImageFile, Record, RecordId};

/// Remote store and recognizer of identity-document records.
///
/// Implementations should be thread-safe (Send + Sync) so a session handle
/// can be shared between tasks.
#[async_trait]
pub trait RecordBackend: Send + Sync {
    /// Submit an image for recognition and return the record created from it.
    ///
    /// # Errors
    /// Returns [`ClientError::Rejected`](crate::ClientError::Rejected) when the
    /// backend refuses the image with a structured message.
    async fn upload_image(&self, image: &ImageFile) -> Result<Record>;

    /// Fetch every stored record, in backend order.
    async fn list_records(&self) -> Result<Vec<Record>>;

    /// Overwrite the stored record with `record`'s current values.
    async fn update_record(&self, record: &Record) -> Result<()>;

    /// Delete the record with the given id.
    async fn delete_record(&self, id: &RecordId) -> Result<()>;

    /// Short identifier used in log output.
    fn backend_id(&self) -> &str;
}
