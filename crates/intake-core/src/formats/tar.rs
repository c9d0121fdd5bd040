//! TAR and gzip-compressed TAR extraction adapter.

use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use flate2::read::GzDecoder;

use super::ArchiveFormat;
use super::common;
use super::traits::ArchiveEntry;
use super::traits::EntryKind;
use super::traits::EntrySource;
use crate::ArchiveError;
use crate::CancelToken;
use crate::ExtractionConfig;
use crate::ExtractionReport;
use crate::ProgressCallback;
use crate::Result;

/// Outer compression of a tar stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TarCompression {
    /// Plain tar.
    None,
    /// Gzip-wrapped tar.
    Gzip,
}

impl TarCompression {
    /// Picks the compression from the file name: `.gz` and `.tgz` (any case)
    /// mean gzip, anything else plain tar.
    ///
    /// # Examples
    ///
    /// ```
    /// use intake_core::formats::TarCompression;
    /// use std::path::Path;
    ///
    /// assert_eq!(TarCompression::from_path(Path::new("a.tar.gz")), TarCompression::Gzip);
    /// assert_eq!(TarCompression::from_path(Path::new("a.TGZ")), TarCompression::Gzip);
    /// assert_eq!(TarCompression::from_path(Path::new("a.tar")), TarCompression::None);
    /// ```
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let is_gzip = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("gz") || e.eq_ignore_ascii_case("tgz"));
        if is_gzip { Self::Gzip } else { Self::None }
    }

    /// Format reported for archives with this compression.
    #[must_use]
    pub const fn format(self) -> ArchiveFormat {
        match self {
            Self::None => ArchiveFormat::Tar,
            Self::Gzip => ArchiveFormat::TarGz,
        }
    }
}

/// Sequential tar reader.
///
/// Only directory and regular-file records are extracted; symlinks,
/// hardlinks, devices, FIFOs and PAX global headers come through as
/// [`EntryKind::Other`].
pub struct TarSource<R: Read> {
    archive: tar::Archive<R>,
    format: ArchiveFormat,
    path: PathBuf,
}

impl TarSource<Box<dyn Read>> {
    /// Opens the tar archive at `path`, decompressing it per `compression`.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Open`] if the file cannot be opened or, for
    /// gzip, if the gzip header is invalid.
    pub fn open(path: &Path, compression: TarCompression) -> Result<Self> {
        let format = compression.format();
        let file = File::open(path).map_err(|e| ArchiveError::open(format, path, e))?;
        let reader = BufReader::new(file);

        let stream: Box<dyn Read> = match compression {
            TarCompression::None => Box::new(reader),
            TarCompression::Gzip => {
                let decoder = GzDecoder::new(reader);
                if decoder.header().is_none() {
                    return Err(ArchiveError::open(format, path, "invalid gzip header"));
                }
                Box::new(decoder)
            }
        };

        Ok(Self::new(stream, format, path))
    }
}

impl<R: Read> TarSource<R> {
    /// Wraps an already decompressed tar stream. `path` is only used in
    /// errors.
    pub fn new(reader: R, format: ArchiveFormat, path: &Path) -> Self {
        Self {
            archive: tar::Archive::new(reader),
            format,
            path: path.to_path_buf(),
        }
    }
}

impl<R: Read> EntrySource for TarSource<R> {
    fn format(&self) -> ArchiveFormat {
        self.format
    }

    fn for_each_entry(
        &mut self,
        visit: &mut dyn FnMut(ArchiveEntry<'_>) -> Result<()>,
    ) -> Result<()> {
        let format = self.format;
        let path = &self.path;
        let entries = self
            .archive
            .entries()
            .map_err(|e| ArchiveError::open(format, path, e))?;

        // A bad first header means the stream is not tar at all.
        let mut seen_entry = false;
        for entry in entries {
            let mut entry = match entry {
                Ok(entry) => entry,
                Err(e) if !seen_entry => return Err(ArchiveError::open(format, path, e)),
                Err(e) => {
                    return Err(ArchiveError::io(
                        format!("reading {format} archive {}", path.display()),
                        e,
                    ));
                }
            };
            seen_entry = true;

            let header = entry.header();
            let entry_type = header.entry_type();
            let kind = if entry_type.is_dir() {
                EntryKind::Directory
            } else if entry_type.is_file() || entry_type.is_contiguous() {
                EntryKind::File
            } else {
                EntryKind::Other
            };
            let mode = header.mode().ok();
            let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
            let size = entry.size();

            visit(ArchiveEntry {
                name,
                kind,
                mode,
                size,
                reader: &mut entry,
            })?;
        }
        Ok(())
    }
}

/// Extracts a tar archive, choosing gzip by the `.gz`/`.tgz` suffix.
///
/// # Errors
///
/// Same as [`extract_with_compression`].
pub fn extract(
    cancel: &CancelToken,
    src: &Path,
    dest: &Path,
    config: &ExtractionConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    extract_with_compression(
        cancel,
        src,
        dest,
        TarCompression::from_path(src),
        config,
        progress,
    )
}

/// Extracts a tar archive with an explicit outer compression.
///
/// A plain tar stream is opened lazily, so a file that turns out not to be
/// tar fails with [`ArchiveError::Open`] after `dest` has been created.
///
/// # Errors
///
/// Returns [`ArchiveError::Open`] for unreadable archives,
/// [`ArchiveError::PathTraversal`] for escaping entry names,
/// [`ArchiveError::Cancelled`] when `cancel` fires and
/// [`ArchiveError::Io`] for filesystem failures and truncated streams.
pub fn extract_with_compression(
    cancel: &CancelToken,
    src: &Path,
    dest: &Path,
    compression: TarCompression,
    config: &ExtractionConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let mut source = TarSource::open(src, compression)?;
    common::extract_into(&mut source, src, dest, cancel, config, progress)
}
