//! ZIP extraction adapter.

use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use std::path::PathBuf;

use zip::ZipArchive;

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

/// Random-access ZIP reader yielding entries in central-directory order.
///
/// Symlink entries are reported as [`EntryKind::Other`] and skipped.
#[derive(Debug)]
pub struct ZipSource<R: Read + Seek> {
    archive: ZipArchive<R>,
    path: PathBuf,
}

impl ZipSource<BufReader<File>> {
    /// Opens the ZIP archive at `path` and reads its central directory.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Open`] if the file cannot be opened or is
    /// not a readable ZIP archive.
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).map_err(|e| ArchiveError::open(ArchiveFormat::Zip, path, e))?;
        Self::new(BufReader::new(file), path)
    }
}

impl<R: Read + Seek> ZipSource<R> {
    /// Wraps an already opened reader. `path` is only used in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Open`] if the central directory is invalid.
    pub fn new(reader: R, path: &Path) -> Result<Self> {
        let archive =
            ZipArchive::new(reader).map_err(|e| ArchiveError::open(ArchiveFormat::Zip, path, e))?;
        Ok(Self {
            archive,
            path: path.to_path_buf(),
        })
    }
}

impl<R: Read + Seek> EntrySource for ZipSource<R> {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }

    fn for_each_entry(
        &mut self,
        visit: &mut dyn FnMut(ArchiveEntry<'_>) -> Result<()>,
    ) -> Result<()> {
        for index in 0..self.archive.len() {
            let mut file = self.archive.by_index(index).map_err(|e| {
                ArchiveError::io(
                    format!("reading entry #{index} of {}", self.path.display()),
                    io::Error::other(e),
                )
            })?;

            let kind = if file.is_dir() {
                EntryKind::Directory
            } else if file.is_symlink() {
                EntryKind::Other
            } else {
                EntryKind::File
            };

            visit(ArchiveEntry {
                name: file.name().to_string(),
                kind,
                mode: file.unix_mode(),
                size: file.size(),
                reader: &mut file,
            })?;
        }
        Ok(())
    }
}

/// Extracts the ZIP archive at `src` into `dest`.
///
/// The destination is created only once the archive has been opened.
///
/// # Errors
///
/// Returns [`ArchiveError::Open`] for unreadable archives,
/// [`ArchiveError::PathTraversal`] for escaping entry names,
/// [`ArchiveError::Cancelled`] when `cancel` fires and
/// [`ArchiveError::Io`] for filesystem failures.
pub fn extract(
    cancel: &CancelToken,
    src: &Path,
    dest: &Path,
    config: &ExtractionConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let mut source = ZipSource::open(src)?;
    common::extract_into(&mut source, src, dest, cancel, config, progress)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::NoopProgress;
    use crate::test_utils;
    use tempfile::TempDir;

    fn write_zip(dir: &TempDir, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join("bundle.zip");
        std::fs::write(&path, bytes).expect("failed to write zip");
        path
    }

    #[test]
    fn test_extract_files_and_dirs() {
        let temp = TempDir::new().unwrap();
        let src = write_zip(
            &temp,
            &test_utils::create_test_zip(&[("docs/", b""), ("docs/readme.txt", b"read me")]),
        );
        let dest = temp.path().join("out");

        let report = extract(
            &CancelToken::new(),
            &src,
            &dest,
            &ExtractionConfig::default(),
            &mut NoopProgress,
        )
        .unwrap();

        assert_eq!(report.format, Some(ArchiveFormat::Zip));
        assert_eq!(report.files_extracted, 1);
        assert_eq!(report.directories_created, 1);
        assert!(report.extracted_root.ends_with("out/bundle"));
        assert_eq!(
            std::fs::read_to_string(dest.join("docs/readme.txt")).unwrap(),
            "read me"
        );
    }

    #[test]
    fn test_open_invalid_zip() {
        let temp = TempDir::new().unwrap();
        let src = write_zip(&temp, b"PK\x03\x04 but not really a zip");
        let dest = temp.path().join("out");

        let err = extract(
            &CancelToken::new(),
            &src,
            &dest,
            &ExtractionConfig::default(),
            &mut NoopProgress,
        )
        .unwrap_err();

        assert!(matches!(err, ArchiveError::Open { format: ArchiveFormat::Zip, .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn test_open_missing_file() {
        let result = ZipSource::open(Path::new("/nonexistent/intake.zip"));
        assert!(matches!(result, Err(ArchiveError::Open { .. })));
    }

    #[test]
    fn test_traversal_rejected() {
        let temp = TempDir::new().unwrap();
        let src = write_zip(
            &temp,
            &test_utils::create_test_zip(&[("../../evil.txt", b"evil")]),
        );
        let dest = temp.path().join("out");

        let err = extract(
            &CancelToken::new(),
            &src,
            &dest,
            &ExtractionConfig::default(),
            &mut NoopProgress,
        )
        .unwrap_err();

        assert!(err.is_security_violation());
        assert!(!temp.path().join("evil.txt").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_mode_applied() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let src = write_zip(
            &temp,
            &test_utils::create_test_zip_with_modes(&[("run.sh", b"#!/bin/sh", 0o750)]),
        );
        let dest = temp.path().join("out");

        extract(
            &CancelToken::new(),
            &src,
            &dest,
            &ExtractionConfig::default(),
            &mut NoopProgress,
        )
        .unwrap();

        let mode = std::fs::metadata(dest.join("run.sh"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o750);
    }

    #[test]
    fn test_source_yields_central_directory_order() {
        let bytes = test_utils::create_test_zip(&[("b", b"2"), ("a/", b""), ("a/c", b"3")]);
        let mut source =
            ZipSource::new(std::io::Cursor::new(bytes), Path::new("mem.zip")).unwrap();

        let mut seen = Vec::new();
        source
            .for_each_entry(&mut |entry| {
                seen.push((entry.name, entry.kind));
                Ok(())
            })
            .unwrap();

        assert_eq!(
            seen,
            vec![
                ("b".to_string(), EntryKind::File),
                ("a/".to_string(), EntryKind::Directory),
                ("a/c".to_string(), EntryKind::File),
            ]
        );
    }
}
