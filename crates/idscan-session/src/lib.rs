//! IDScan Session - client-side record state for the IDScan client.
//!
//! Holds the records loaded from the backend and reconciles local changes
//! with asynchronous backend calls:
//!
//! - [`store`] - the ordered collection of held records
//! - [`upload`] - file selection, the size limit and single-flight upload
//! - [`edit`] - per-record edit mode with optimistic, unbuffered edits
//! - [`search`] - destructive case-insensitive filtering
//! - [`notifications`] - independent, self-expiring operator messages
//! - [`session`] - the [`Session`] facade tying them to one backend
//!
//! # Example
//!
//! ```rust
//! use idscan_client::MemoryBackend;
//! use idscan_core::{ImageFile, RecordField};
//! use idscan_session::Session;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), idscan_session::SessionError> {
//! let session = Session::new(MemoryBackend::new());
//! session.select_file(ImageFile::new("card.jpg", vec![0; 1024]))?;
//! let record = session.upload().await?;
//!
//! session.begin_edit(&record.id);
//! session.edit_field(&record.id, RecordField::LastName, "Jaidee");
//! session.save(&record.id).await?;
//! assert_eq!(session.store().get(&record.id).unwrap().last_name, "Jaidee");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]

pub mod edit;
pub mod error;
pub mod notifications;
pub mod search;
pub mod session;
pub mod store;
pub mod upload;

// Re-export commonly used types
pub use edit::{EditSession, EditState};
pub use error::{Result, SessionError};
pub use notifications::{Notification, NotificationCenter, NotificationKind, NotificationLifetimes};
pub use search::{apply_filter, is_commit_key, COMMIT_KEY};
pub use session::{RecordRow, Session};
pub use store::RecordStore;
pub use upload::{UploadController, UploadPhase, UPLOAD_FAILED_MESSAGE, UPLOAD_SUCCESS_MESSAGE};
