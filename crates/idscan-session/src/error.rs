//! Error types for session operations.

use idscan_client::ClientError;
use idscan_core::{IdScanError, RecordId};
use thiserror::Error;

/// Errors returned by session operations.
///
/// Returning one of these never ends the session; the affected component is
/// already back in its idle or viewing state.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Upload triggered with no valid file selected
    #[error("no file selected")]
    NoFileSelected,

    /// Upload triggered while another upload is in flight
    #[error("an upload is already in progress")]
    UploadInProgress,

    /// Selected file exceeds the upload size limit
    #[error("file is {size} bytes, the limit is {max} bytes")]
    FileTooLarge {
        /// Size of the rejected file
        size: u64,
        /// Configured limit
        max: u64,
    },

    /// Selected image could not be read
    #[error("cannot read image: {0}")]
    File(#[from] IdScanError),

    /// Operation addressed a record that is not held locally
    #[error("record not found: {0}")]
    RecordNotFound(RecordId),

    /// Backend call failed
    #[error(transparent)]
    Backend(#[from] ClientError),
}

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SessionError::FileTooLarge {
            size: 3_145_728,
            max: 2_097_152,
        };
        assert_eq!(
            err.to_string(),
            "file is 3145728 bytes, the limit is 2097152 bytes"
        );

        let err = SessionError::RecordNotFound(RecordId::new("a1"));
        assert_eq!(err.to_string(), "record not found: a1");
    }

    #[test]
    fn test_backend_error_is_transparent() {
        let err: SessionError = ClientError::UnexpectedStatus { status: 204 }.into();
        assert_eq!(err.to_string(), "unexpected status 204");
    }
}
