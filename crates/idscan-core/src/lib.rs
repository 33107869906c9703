//! IDScan Core - Foundation crate for the IDScan document-recognition client.
//!
//! This crate provides the record model, the extraction validity rule,
//! error handling and configuration management that the other IDScan crates
//! depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`types`] - Record model (`Record`, `RecordId`, `RecordField`, `ImageFile`)
//! - [`validity`] - Classification of properly extracted records
//!
//! # Example
//!
//! ```rust
//! use idscan_core::{is_properly_extracted, Record, RecordField};
//!
//! let mut record = Record::new("a1");
//! record.set_field(RecordField::IdNumber, "1 2345 67890 12 3");
//! assert!(is_properly_extracted(&record));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod types;
pub mod validity;

// Re-export commonly used types
pub use config::{AppConfig, BackendConfig, NotificationConfig, UploadConfig};
pub use error::{ConfigError, ConfigResult, IdScanError, Result};
pub use types::{ImageFile, Record, RecordField, RecordId};
pub use validity::{is_properly_extracted, ID_NUMBER_LENGTH};
