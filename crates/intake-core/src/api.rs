//! High-level public API for archive extraction.

use std::path::Path;
use std::path::PathBuf;

use tracing::info;

use crate::ArchiveError;
use crate::ArchiveFormat;
use crate::CancelToken;
use crate::ExtractionConfig;
use crate::ExtractionReport;
use crate::NoopProgress;
use crate::ProgressCallback;
use crate::Result;
use crate::formats::TarCompression;
use crate::formats::classify;
use crate::formats::sevenz;
use crate::formats::tar;
use crate::formats::zip;

/// Extracts an archive of any supported format into `dest`.
///
/// Returns `dest` joined with the archive's file name minus its last
/// extension. That path is a naming convention only; nothing checks that
/// the archive produced it.
///
/// # Errors
///
/// Returns [`ArchiveError::UnsupportedFormat`] without touching the
/// filesystem when no signature matches; adapter errors come back wrapped
/// in [`ArchiveError::Format`].
///
/// # Examples
///
/// ```no_run
/// use intake_core::CancelToken;
/// use intake_core::extract_archive;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let root = extract_archive(&CancelToken::new(), "upload.zip", "/srv/ingest")?;
/// println!("extracted under {}", root.display());
/// # Ok(())
/// # }
/// ```
pub fn extract_archive<P: AsRef<Path>, Q: AsRef<Path>>(
    cancel: &CancelToken,
    src: P,
    dest: Q,
) -> Result<PathBuf> {
    extract_archive_with(
        cancel,
        src,
        dest,
        &ExtractionConfig::default(),
        &mut NoopProgress,
    )
    .map(|report| report.extracted_root)
}

/// Extracts an archive of any supported format with explicit settings.
///
/// Detection order is 7z, tar, gzip-wrapped tar, ZIP; the first match
/// picks the adapter.
///
/// # Errors
///
/// Same as [`extract_archive`]. An adapter that succeeds without an
/// extraction root yields [`ArchiveError::Internal`].
pub fn extract_archive_with<P: AsRef<Path>, Q: AsRef<Path>>(
    cancel: &CancelToken,
    src: P,
    dest: Q,
    config: &ExtractionConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    let Some(format) = classify(src) else {
        return Err(ArchiveError::UnsupportedFormat {
            path: src.to_path_buf(),
        });
    };

    info!(
        %format,
        src = %src.display(),
        dest = %dest.display(),
        "extracting archive"
    );

    let report = match format {
        ArchiveFormat::SevenZip => sevenz::extract(cancel, src, dest, config, progress),
        ArchiveFormat::Tar => tar::extract_with_compression(
            cancel,
            src,
            dest,
            TarCompression::None,
            config,
            progress,
        ),
        ArchiveFormat::TarGz => tar::extract_with_compression(
            cancel,
            src,
            dest,
            TarCompression::Gzip,
            config,
            progress,
        ),
        ArchiveFormat::Zip => zip::extract(cancel, src, dest, config, progress),
    }
    .map_err(|source| ArchiveError::Format {
        format,
        source: Box::new(source),
    })?;

    if report.extracted_root.as_os_str().is_empty() {
        return Err(ArchiveError::Internal(format!(
            "{format} adapter returned an empty extraction root for {}",
            src.display()
        )));
    }

    info!(
        %format,
        files = report.files_extracted,
        directories = report.directories_created,
        truncated = report.files_truncated,
        bytes = report.bytes_written,
        "archive extracted"
    );
    Ok(report)
}

/// Extracts a ZIP archive with default settings.
///
/// # Errors
///
/// See [`zip::extract`].
pub fn extract_zip(cancel: &CancelToken, src: &Path, dest: &Path) -> Result<PathBuf> {
    zip::extract(
        cancel,
        src,
        dest,
        &ExtractionConfig::default(),
        &mut NoopProgress,
    )
    .map(|report| report.extracted_root)
}

/// Extracts a 7z archive with default settings.
///
/// # Errors
///
/// See [`sevenz::extract`].
pub fn extract_7z(cancel: &CancelToken, src: &Path, dest: &Path) -> Result<PathBuf> {
    sevenz::extract(
        cancel,
        src,
        dest,
        &ExtractionConfig::default(),
        &mut NoopProgress,
    )
    .map(|report| report.extracted_root)
}

/// Extracts a tar archive with default settings, detecting gzip by suffix.
///
/// # Errors
///
/// See [`tar::extract`].
pub fn extract_tar(cancel: &CancelToken, src: &Path, dest: &Path) -> Result<PathBuf> {
    tar::extract(
        cancel,
        src,
        dest,
        &ExtractionConfig::default(),
        &mut NoopProgress,
    )
    .map(|report| report.extracted_root)
}
