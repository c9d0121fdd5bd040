//! Common traits for archive format adapters.

use std::fmt;
use std::io::Read;

use super::ArchiveFormat;
use crate::Result;

/// What an archive entry represents on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Directory marker.
    Directory,
    /// Regular file with content.
    File,
    /// Symlinks, hardlinks, devices, FIFOs and format-specific records.
    /// These are skipped.
    Other,
}

/// One archive entry as yielded by an [`EntrySource`].
///
/// `name` is the raw, untrusted name stored in the archive. `reader` yields
/// the entry's uncompressed bytes and is only meaningful for files.
pub struct ArchiveEntry<'a> {
    /// Entry name as stored in the archive.
    pub name: String,
    /// Entry kind.
    pub kind: EntryKind,
    /// Raw permission bits, if the format stores them.
    pub mode: Option<u32>,
    /// Declared uncompressed size.
    pub size: u64,
    /// Content stream.
    pub reader: &'a mut dyn Read,
}

impl fmt::Debug for ArchiveEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveEntry")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("mode", &self.mode.map(|m| format!("{m:#o}")))
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// A codec that can stream its entries in archive order.
///
/// Adapters translate codec entries into [`ArchiveEntry`] values and hand
/// each one to `visit`. An error returned by `visit` must stop iteration
/// and be returned unchanged, so cancellation and traversal errors reach
/// the caller with their original kind.
pub trait EntrySource {
    /// Format this source decodes.
    fn format(&self) -> ArchiveFormat;

    /// Streams every entry through `visit`.
    ///
    /// # Errors
    ///
    /// Returns the first error from `visit`, or a codec error.
    fn for_each_entry(
        &mut self,
        visit: &mut dyn FnMut(ArchiveEntry<'_>) -> Result<()>,
    ) -> Result<()>;
}
