//! Operation reports and progress callbacks.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use crate::formats::ArchiveFormat;

/// Report of an archive extraction.
///
/// `extracted_root` follows the naming convention "destination joined with
/// the archive's base name"; nothing guarantees the archive actually produced
/// a directory of that name.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Format the archive was extracted as.
    pub format: Option<ArchiveFormat>,

    /// Destination root joined with the source base name (extension stripped).
    pub extracted_root: PathBuf,

    /// Number of files written.
    pub files_extracted: usize,

    /// Number of directory entries created.
    pub directories_created: usize,

    /// Entries that were neither files nor directories, or that named the
    /// destination root itself.
    pub entries_skipped: usize,

    /// Files clipped at the per-file size cap.
    pub files_truncated: usize,

    /// Total bytes written to disk.
    pub bytes_written: u64,

    /// Duration of the extraction.
    pub duration: Duration,

    /// Warnings generated during extraction.
    pub warnings: Vec<String>,
}

impl ExtractionReport {
    /// Creates a new empty extraction report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// Returns total number of entries written.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.files_extracted + self.directories_created
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Report of packing a directory into a ZIP archive.
#[derive(Debug, Clone, Default)]
pub struct CompressionReport {
    /// Number of file entries written.
    pub files_added: usize,

    /// Number of directory entries written.
    pub directories_added: usize,

    /// Entries that were not archived (symlinks and special files).
    pub entries_skipped: usize,

    /// Uncompressed bytes read from the source tree.
    pub bytes_read: u64,

    /// Duration of the operation.
    pub duration: Duration,

    /// Warnings generated while walking.
    pub warnings: Vec<String>,
}

impl CompressionReport {
    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, message: String) {
        self.warnings.push(message);
    }
}

/// Callback trait for progress reporting during extraction.
///
/// Callbacks run synchronously on the extracting thread between entries.
/// Triggering a [`CancelToken`](crate::CancelToken) from a callback takes
/// effect at the next entry boundary.
///
/// # Examples
///
/// ```
/// use intake_core::ProgressCallback;
/// use std::path::Path;
///
/// struct Printer;
///
/// impl ProgressCallback for Printer {
///     fn on_entry_start(&mut self, path: &Path, index: usize) {
///         println!("[{index}] {}", path.display());
///     }
///
///     fn on_entry_complete(&mut self, _path: &Path) {}
///
///     fn on_complete(&mut self) {
///         println!("done");
///     }
/// }
/// ```
pub trait ProgressCallback {
    /// Called before an entry is written.
    ///
    /// # Arguments
    ///
    /// * `path` - Entry name as stored in the archive
    /// * `index` - Position of the entry in archive order (1-indexed)
    fn on_entry_start(&mut self, path: &Path, index: usize);

    /// Called after an entry was written or skipped.
    fn on_entry_complete(&mut self, path: &Path);

    /// Called once after the last entry.
    fn on_complete(&mut self);
}

/// No-op implementation of `ProgressCallback`.
#[derive(Debug, Default)]
pub struct NoopProgress;

impl ProgressCallback for NoopProgress {
    fn on_entry_start(&mut self, _path: &Path, _index: usize) {}

    fn on_entry_complete(&mut self, _path: &Path) {}

    fn on_complete(&mut self) {}
}
