//! Image selection and single-flight upload.
//!
//! ```text
//! select ──(too large)──► selection cleared, size error set
//!    │
//!    ▼
//!  Idle ──submit──► Uploading ──(success | failure)──► Idle
//! ```

use crate::error::{Result, SessionError};
use crate::notifications::{NotificationCenter, NotificationKind};
use crate::store::RecordStore;
use idscan_client::RecordBackend;
use idscan_core::{IdScanError, ImageFile, Record, UploadConfig};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, warn};

/// Shown after a successful upload.
pub const UPLOAD_SUCCESS_MESSAGE: &str = "Entry added, click show search to see entries.";

/// Shown after any failed upload.
pub const UPLOAD_FAILED_MESSAGE: &str = "Failed to process the image. Please try again.";

/// Upload progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadPhase {
    /// No upload in flight
    #[default]
    Idle,
    /// An upload call is awaiting its response
    Uploading,
}

#[derive(Debug, Default)]
struct UploadState {
    selected: Option<ImageFile>,
    size_error: bool,
    phase: UploadPhase,
}

/// Shared handle to the upload state. Clones share state.
#[derive(Clone, Debug)]
pub struct UploadController {
    state: Arc<Mutex<UploadState>>,
    max_file_bytes: u64,
}

impl Default for UploadController {
    fn default() -> Self {
        Self::new(UploadConfig::default().max_file_bytes)
    }
}

/// Returns the controller to `Idle` when the upload future completes or is dropped.
struct PhaseGuard<'a> {
    state: &'a Mutex<UploadState>,
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .phase = UploadPhase::Idle;
    }
}

impl UploadController {
    /// Create a controller accepting files up to `max_file_bytes`.
    #[must_use]
    pub fn new(max_file_bytes: u64) -> Self {
        Self {
            state: Arc::new(Mutex::new(UploadState::default())),
            max_file_bytes,
        }
    }

    fn lock(&self) -> MutexGuard<'_, UploadState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Largest accepted file, in bytes.
    #[must_use]
    pub fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }

    /// Select a file for upload.
    ///
    /// A file over the size limit clears the current selection and sets the
    /// size error; it can never be submitted.
    pub fn select(&self, file: ImageFile) -> Result<()> {
        let size = file.size();
        if size > self.max_file_bytes {
            return Err(self.reject_oversize(&file.file_name, size));
        }
        info!(file = %file.file_name, size, "file selected");
        let mut state = self.lock();
        state.selected = Some(file);
        state.size_error = false;
        Ok(())
    }

    /// Select an image file from disk.
    ///
    /// The size is checked from the file's metadata, so an oversized file is
    /// rejected without being read.
    pub fn select_path(&self, path: &Path) -> Result<()> {
        let size = std::fs::metadata(path).map_err(IdScanError::from)?.len();
        if size > self.max_file_bytes {
            return Err(self.reject_oversize(&path.display().to_string(), size));
        }
        self.select(ImageFile::from_path(path)?)
    }

    fn reject_oversize(&self, file_name: &str, size: u64) -> SessionError {
        let mut state = self.lock();
        state.selected = None;
        state.size_error = true;
        warn!(file = file_name, size, max = self.max_file_bytes, "selected file too large");
        SessionError::FileTooLarge {
            size,
            max: self.max_file_bytes,
        }
    }

    /// Drop the current selection and size error.
    pub fn clear_selection(&self) {
        let mut state = self.lock();
        state.selected = None;
        state.size_error = false;
    }

    /// Name of the selected file.
    #[must_use]
    pub fn selected_file_name(&self) -> Option<String> {
        self.lock().selected.as_ref().map(|f| f.file_name.clone())
    }

    /// Whether the last selection was rejected for its size.
    #[must_use]
    pub fn size_error(&self) -> bool {
        self.lock().size_error
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> UploadPhase {
        self.lock().phase
    }

    /// Whether an upload is in flight.
    #[must_use]
    pub fn is_uploading(&self) -> bool {
        self.phase() == UploadPhase::Uploading
    }

    /// Whether a submit would be accepted right now.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        let state = self.lock();
        state.selected.is_some() && !state.size_error && state.phase == UploadPhase::Idle
    }

    /// Upload the selected file.
    ///
    /// Rejected without a backend call when nothing is selected or another
    /// upload is in flight. On success the record is appended to `store`; on
    /// failure an error notification is shown, plus the backend's own message
    /// when it sent one. The controller is idle again afterwards either way.
    /// The selection is kept.
    pub async fn submit<B>(
        &self,
        backend: &B,
        store: &RecordStore,
        notifications: &NotificationCenter,
    ) -> Result<Record>
    where
        B: RecordBackend + ?Sized,
    {
        let image = {
            let mut state = self.lock();
            if state.phase == UploadPhase::Uploading {
                return Err(SessionError::UploadInProgress);
            }
            let Some(image) = state.selected.clone() else {
                return Err(SessionError::NoFileSelected);
            };
            state.phase = UploadPhase::Uploading;
            image
        };
        let _idle = PhaseGuard { state: &self.state };

        match backend.upload_image(&image).await {
            Ok(record) => {
                info!(id = %record.id, file = %image.file_name, "upload succeeded");
                store.append(record.clone());
                notifications.show(NotificationKind::Success, UPLOAD_SUCCESS_MESSAGE);
                Ok(record)
            }
            Err(e) => {
                warn!(file = %image.file_name, error = %e, "upload failed");
                notifications.show(NotificationKind::Error, UPLOAD_FAILED_MESSAGE);
                if let Some(message) = e.rejection_message() {
                    notifications.show(NotificationKind::ValidationError, message);
                }
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idscan_client::{Failure, MemoryBackend, Operation};
    use std::time::Duration;

    const MIB: usize = 1024 * 1024;

    fn image(size: usize) -> ImageFile {
        ImageFile::new("card.jpg", vec![0u8; size])
    }

    #[test]
    fn test_oversize_selection_clears_previous() {
        let uploads = UploadController::default();
        uploads.select(image(MIB)).expect("1 MiB accepted");
        assert!(uploads.can_submit());

        let err = uploads.select(image(3 * MIB)).expect_err("3 MiB rejected");
        assert!(matches!(err, SessionError::FileTooLarge { .. }));
        assert!(uploads.size_error());
        assert_eq!(uploads.selected_file_name(), None);
        assert!(!uploads.can_submit());

        uploads.select(image(MIB)).expect("accepted again");
        assert!(!uploads.size_error());
    }

    #[test]
    fn test_limit_is_inclusive() {
        let uploads = UploadController::default();
        assert!(uploads.select(image(2 * MIB)).is_ok());
        assert!(uploads.select(image(2 * MIB + 1)).is_err());
    }

    #[test]
    fn test_select_path_checks_size_before_reading() {
        let dir = tempfile::TempDir::new().expect("create temp dir");
        let small = dir.path().join("card.jpg");
        std::fs::write(&small, [0u8; 64]).expect("write small image");
        let large = dir.path().join("huge.jpg");
        std::fs::File::create(&large)
            .and_then(|f| f.set_len(2 * MIB as u64 + 1))
            .expect("create large image");

        let uploads = UploadController::default();
        uploads.select_path(&small).expect("small file accepted");
        assert_eq!(uploads.selected_file_name().as_deref(), Some("card.jpg"));

        let err = uploads.select_path(&large).expect_err("large file rejected");
        assert!(matches!(err, SessionError::FileTooLarge { size, .. } if size == 2 * MIB as u64 + 1));
        assert!(uploads.size_error());
        assert_eq!(uploads.selected_file_name(), None);

        let err = uploads
            .select_path(&dir.path().join("missing.jpg"))
            .expect_err("missing file");
        assert!(matches!(err, SessionError::File(_)));
    }

    #[tokio::test]
    async fn test_submit_without_selection() {
        let backend = MemoryBackend::new();
        let uploads = UploadController::default();
        let err = uploads
            .submit(&backend, &RecordStore::new(), &NotificationCenter::default())
            .await
            .expect_err("nothing selected");
        assert!(matches!(err, SessionError::NoFileSelected));
        assert_eq!(backend.calls(Operation::Upload), 0);
    }

    #[tokio::test]
    async fn test_oversize_never_reaches_backend() {
        let backend = MemoryBackend::new();
        let uploads = UploadController::default();
        let _ = uploads.select(image(3 * MIB));

        let result = uploads
            .submit(&backend, &RecordStore::new(), &NotificationCenter::default())
            .await;
        assert!(result.is_err());
        assert_eq!(backend.calls(Operation::Upload), 0);
        assert_eq!(uploads.phase(), UploadPhase::Idle);
    }

    #[tokio::test]
    async fn test_success_appends_and_notifies() {
        let backend = MemoryBackend::new();
        let store = RecordStore::with_records(vec![Record::new("x")]);
        let notifications = NotificationCenter::default();
        let uploads = UploadController::default();
        uploads.select(image(MIB)).expect("select");

        let record = uploads
            .submit(&backend, &store, &notifications)
            .await
            .expect("upload");
        assert_eq!(store.records().last(), Some(&record));
        assert_eq!(store.len(), 2);
        assert_eq!(
            notifications
                .current(NotificationKind::Success)
                .map(|n| n.message),
            Some(UPLOAD_SUCCESS_MESSAGE.to_string())
        );
        assert_eq!(uploads.phase(), UploadPhase::Idle);
        assert!(uploads.can_submit());
    }

    #[tokio::test]
    async fn test_rejection_shows_both_notifications() {
        let backend = MemoryBackend::new();
        backend.fail(
            Operation::Upload,
            Failure::Rejected("Image does not contain an ID card".to_string()),
        );
        let store = RecordStore::new();
        let notifications = NotificationCenter::default();
        let uploads = UploadController::default();
        uploads.select(image(MIB)).expect("select");

        assert!(uploads.submit(&backend, &store, &notifications).await.is_err());
        assert!(store.is_empty());
        assert!(notifications.is_visible(NotificationKind::Error));
        assert_eq!(
            notifications
                .current(NotificationKind::ValidationError)
                .map(|n| n.message),
            Some("Image does not contain an ID card".to_string())
        );
        assert!(!notifications.is_visible(NotificationKind::Success));
        assert_eq!(uploads.phase(), UploadPhase::Idle);
    }

    #[tokio::test]
    async fn test_transport_failure_shows_generic_error_only() {
        let backend = MemoryBackend::new();
        backend.fail(Operation::Upload, Failure::Status(503));
        let notifications = NotificationCenter::default();
        let uploads = UploadController::default();
        uploads.select(image(MIB)).expect("select");

        assert!(uploads
            .submit(&backend, &RecordStore::new(), &notifications)
            .await
            .is_err());
        assert!(notifications.is_visible(NotificationKind::Error));
        assert!(!notifications.is_visible(NotificationKind::ValidationError));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_flight() {
        let backend = MemoryBackend::new();
        backend.set_latency(Operation::Upload, Duration::from_millis(500));
        let store = RecordStore::new();
        let notifications = NotificationCenter::default();
        let uploads = UploadController::default();
        uploads.select(image(MIB)).expect("select");

        let first = tokio::spawn({
            let (backend, store, notifications, uploads) = (
                backend.clone(),
                store.clone(),
                notifications.clone(),
                uploads.clone(),
            );
            async move { uploads.submit(&backend, &store, &notifications).await }
        });
        tokio::task::yield_now().await;
        assert!(uploads.is_uploading());
        assert!(!uploads.can_submit());

        let second = uploads.submit(&backend, &store, &notifications).await;
        assert!(matches!(second, Err(SessionError::UploadInProgress)));

        first.await.expect("join").expect("first upload");
        assert_eq!(backend.calls(Operation::Upload), 1);
        assert_eq!(store.len(), 1);
        assert!(!uploads.is_uploading());
    }
}
