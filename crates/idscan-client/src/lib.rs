//! IDScan Client - access to the remote recognition backend.
//!
//! The backend turns an uploaded identity-document image into a structured
//! [`Record`](idscan_core::Record) and stores it. This crate defines the
//! [`RecordBackend`] contract the session layer is written against,
//! [`HttpBackend`], its REST implementation, and [`MemoryBackend`], an
//! in-process stand-in with failure injection.
//!
//! # Example
//!
//! ```rust,no_run
//! use idscan_client::{HttpBackend, RecordBackend};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = HttpBackend::new("http://localhost:5000")?;
//! for record in backend.list_records().await? {
//!     println!("{} {}", record.id, record.name);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod backend;
pub mod error;
pub mod http;
pub mod memory;

// Re-export commonly used types
pub use backend::RecordBackend;
pub use error::{ClientError, Result};
pub use http::HttpBackend;
pub use memory::{Failure, MemoryBackend, Operation};
