//! Configuration for extraction and compression.

/// Per-file ceiling applied to every extracted file: 5 GiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 << 30;

/// Mode for directories created without an archive-provided mode.
pub const DEFAULT_DIR_MODE: u32 = 0o750;

/// Mode for files whose entry carries no mode.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Extraction settings.
///
/// Content beyond `max_file_size` is dropped silently (the file is kept,
/// truncated), so the cap bounds disk use per entry without rejecting the
/// archive.
///
/// # Examples
///
/// ```
/// use intake_core::ExtractionConfig;
///
/// let config = ExtractionConfig::default();
/// assert_eq!(config.max_file_size, 5 * 1024 * 1024 * 1024);
///
/// let small = ExtractionConfig::default().with_max_file_size(1024);
/// assert_eq!(small.max_file_size, 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Maximum number of bytes written for a single file entry.
    pub max_file_size: u64,

    /// Mode for the destination root and for directories without a mode.
    pub dir_mode: u32,

    /// Mode for files whose entry carries no mode.
    pub default_file_mode: u32,
}

impl Default for ExtractionConfig {
    /// Default values:
    /// - `max_file_size`: 5 GiB
    /// - `dir_mode`: `0o750`
    /// - `default_file_mode`: `0o644`
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            dir_mode: DEFAULT_DIR_MODE,
            default_file_mode: DEFAULT_FILE_MODE,
        }
    }
}

impl ExtractionConfig {
    /// Sets the per-file size cap.
    #[must_use]
    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Sets the mode used for created directories.
    #[must_use]
    pub fn with_dir_mode(mut self, mode: u32) -> Self {
        self.dir_mode = mode;
        self
    }

    /// Sets the mode used for files without an entry mode.
    #[must_use]
    pub fn with_default_file_mode(mut self, mode: u32) -> Self {
        self.default_file_mode = mode;
        self
    }
}

/// Settings for packing a directory into a ZIP archive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompressionConfig {
    /// Deflate level; `None` uses the codec default.
    pub compression_level: Option<i64>,
}

impl CompressionConfig {
    /// Sets the deflate level.
    #[must_use]
    pub fn with_compression_level(mut self, level: Option<i64>) -> Self {
        self.compression_level = level;
        self
    }
}
