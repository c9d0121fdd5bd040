//! Archive format detection and per-format extraction adapters.

pub(crate) mod common;
pub mod detect;
pub mod sevenz;
pub mod tar;
pub mod traits;
pub mod zip;

use std::fmt;

pub use detect::classify;
pub use detect::is_7z;
pub use detect::is_actual_archive;
pub use detect::is_gzip_tar;
pub use detect::is_tar;
pub use detect::is_zip;
pub use tar::TarCompression;
pub use traits::ArchiveEntry;
pub use traits::EntryKind;
pub use traits::EntrySource;

/// Archive formats the dispatcher can route to an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveFormat {
    /// ZIP archive.
    Zip,
    /// 7-Zip archive.
    SevenZip,
    /// Uncompressed POSIX tar archive.
    Tar,
    /// Gzip-compressed tar archive.
    TarGz,
}

impl ArchiveFormat {
    /// Short lowercase name, as used in messages and CLI output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::SevenZip => "7z",
            Self::Tar => "tar",
            Self::TarGz => "tar.gz",
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
