//! Format detection and path-safe extraction of ZIP, 7z and TAR packages.
//!
//! `intake-core` sniffs archive formats by magic bytes, extracts them with
//! every entry name checked against the destination root ("zip-slip"
//! protection), clips each extracted file at a size cap, strips
//! setuid/setgid/sticky bits from entry modes, and packs directories into
//! ZIP archives. Long-running operations poll a [`CancelToken`].
//!
//! # Examples
//!
//! ```no_run
//! use intake_core::CancelToken;
//! use intake_core::compress_directory_to_zip;
//! use intake_core::extract_archive;
//! use intake_core::is_actual_archive;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cancel = CancelToken::new();
//! let upload = Path::new("incoming/package.zip");
//!
//! if is_actual_archive(upload) {
//!     let root = extract_archive(&cancel, upload, "/srv/ingest")?;
//!     println!("extracted under {}", root.display());
//! }
//!
//! compress_directory_to_zip(&cancel, Path::new("outbox"), Path::new("outbox.zip"))?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod cancel;
pub mod config;
pub mod copy;
pub mod creation;
pub mod error;
pub mod formats;
pub mod report;
pub mod security;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export main API types
pub use api::extract_7z;
pub use api::extract_archive;
pub use api::extract_archive_with;
pub use api::extract_tar;
pub use api::extract_zip;
pub use cancel::CancelToken;
pub use config::CompressionConfig;
pub use config::ExtractionConfig;
pub use creation::compress_directory_to_zip;
pub use creation::compress_directory_to_zip_with;
pub use error::ArchiveError;
pub use error::ErrorKind;
pub use error::IoContext;
pub use error::Result;
pub use formats::ArchiveFormat;
pub use formats::classify;
pub use formats::is_7z;
pub use formats::is_actual_archive;
pub use formats::is_gzip_tar;
pub use formats::is_tar;
pub use formats::is_zip;
pub use report::CompressionReport;
pub use report::ExtractionReport;
pub use report::NoopProgress;
pub use report::ProgressCallback;
