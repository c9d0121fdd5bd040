//! 7-Zip extraction adapter.
//!
//! The codec drives iteration through a callback, so errors raised while
//! writing an entry are parked in the adapter and the codec is stopped
//! with a placeholder error. The parked error is what the caller sees.

use std::fs::File;
use std::io;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use std::path::PathBuf;

use sevenz_rust2::ArchiveReader;
use sevenz_rust2::Password;

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

/// Set by p7zip-compatible writers when the high 16 bits hold `st_mode`.
const FILE_ATTRIBUTE_UNIX_EXTENSION: u32 = 0x8000;

/// Windows symlinks and junctions.
const FILE_ATTRIBUTE_REPARSE_POINT: u32 = 0x0400;

const S_IFMT: u32 = 0o170_000;
const S_IFLNK: u32 = 0o120_000;

/// Sequential 7z reader.
///
/// Encrypted archives fail to open, since no password is ever supplied.
pub struct SevenZipSource<R: Read + Seek> {
    reader: ArchiveReader<R>,
    path: PathBuf,
}

impl SevenZipSource<BufReader<File>> {
    /// Opens the 7z archive at `path` and parses its header.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Open`] if the file cannot be opened, is not a
    /// 7z archive or needs a password.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| ArchiveError::open(ArchiveFormat::SevenZip, path, e))?;
        Self::new(BufReader::new(file), path)
    }
}

impl<R: Read + Seek> SevenZipSource<R> {
    /// Wraps an already opened reader. `path` is only used in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Open`] if the header cannot be parsed.
    pub fn new(reader: R, path: &Path) -> Result<Self> {
        let reader = ArchiveReader::new(reader, Password::empty())
            .map_err(|e| ArchiveError::open(ArchiveFormat::SevenZip, path, e.to_string()))?;
        Ok(Self {
            reader,
            path: path.to_path_buf(),
        })
    }
}

impl<R: Read + Seek> EntrySource for SevenZipSource<R> {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::SevenZip
    }

    fn for_each_entry(
        &mut self,
        visit: &mut dyn FnMut(ArchiveEntry<'_>) -> Result<()>,
    ) -> Result<()> {
        let mut parked: Option<ArchiveError> = None;

        let result = self.reader.for_each_entries(|entry, reader| {
            let mode = unix_mode(entry);
            let visited = visit(ArchiveEntry {
                name: entry.name.clone(),
                kind: entry_kind(entry, mode),
                mode,
                size: entry.size,
                reader,
            });

            match visited {
                Ok(()) => Ok(true),
                Err(e) => {
                    parked = Some(e);
                    Err(sevenz_rust2::Error::Other("extraction aborted".into()))
                }
            }
        });

        if let Some(e) = parked {
            return Err(e);
        }
        result.map_err(|e| {
            ArchiveError::io(
                format!("reading 7z archive {}", self.path.display()),
                io::Error::other(e.to_string()),
            )
        })
    }
}

/// Extracts the 7z archive at `src` into `dest`.
///
/// # Errors
///
/// Same as [`zip::extract`](super::zip::extract).
pub fn extract(
    cancel: &CancelToken,
    src: &Path,
    dest: &Path,
    config: &ExtractionConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let mut source = SevenZipSource::open(src)?;
    common::extract_into(&mut source, src, dest, cancel, config, progress)
}

fn unix_mode(entry: &sevenz_rust2::ArchiveEntry) -> Option<u32> {
    let attributes = entry.windows_attributes;
    (entry.has_windows_attributes && attributes & FILE_ATTRIBUTE_UNIX_EXTENSION != 0)
        .then_some(attributes >> 16)
}

fn entry_kind(entry: &sevenz_rust2::ArchiveEntry, mode: Option<u32>) -> EntryKind {
    let reparse_point =
        entry.has_windows_attributes && entry.windows_attributes & FILE_ATTRIBUTE_REPARSE_POINT != 0;
    let unix_symlink = mode.is_some_and(|m| m & S_IFMT == S_IFLNK);

    if reparse_point || unix_symlink {
        EntryKind::Other
    } else if entry.is_directory() {
        EntryKind::Directory
    } else {
        EntryKind::File
    }
}
