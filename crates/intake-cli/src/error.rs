//! Error conversion utilities for CLI.
//!
//! Converts intake-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use intake_core::ArchiveError;
use std::path::Path;

/// Converts `ArchiveError` to user-friendly anyhow error with context
pub fn convert_archive_error(err: ArchiveError, archive: &Path) -> anyhow::Error {
    match err.root() {
        ArchiveError::PathTraversal { path } => anyhow!(
            "Security violation: Archive '{}' attempted path traversal with '{}'\n\
             HINT: This archive may be malicious. Do not extract from untrusted sources.",
            archive.display(),
            path.display()
        ),
        ArchiveError::UnsupportedFormat { .. } => anyhow!(
            "Archive format not supported: {}\n\
             HINT: Supported formats: zip, 7z, tar, tar.gz",
            archive.display()
        ),
        ArchiveError::Open { format, source, .. } => anyhow!(
            "Invalid {format} archive '{}': {source}\n\
             HINT: The archive may be corrupted or truncated.",
            archive.display()
        ),
        ArchiveError::Cancelled => {
            anyhow!("Operation on '{}' was cancelled", archive.display())
        }
        _ => anyhow::Error::from(err)
            .context(format!("Error processing archive '{}'", archive.display())),
    }
}

/// Adds context to a generic error about archive operations
pub fn add_archive_context<T>(
    result: Result<T, ArchiveError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_archive_error(e, archive))
}
