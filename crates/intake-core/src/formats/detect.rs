//! Archive format detection.
//!
//! Classification is by magic bytes only and never fails: an unreadable or
//! short file simply matches nothing. [`is_actual_archive`] is a separate
//! extension-based policy check and is not consulted by [`classify`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;

use super::ArchiveFormat;

/// ZIP local file header signature.
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// 7z signature: "7z" followed by format version bytes.
const SEVENZ_MAGIC: [u8; 6] = [0x37, 0x7A, 0xBC, 0xAF, 0x27, 0x1C];

/// Gzip member header.
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// POSIX tar magic and its offset inside the first header block.
const TAR_MAGIC: &[u8; 5] = b"ustar";
const TAR_MAGIC_OFFSET: usize = 257;

/// Bytes needed to see the tar magic field (offset 257, six bytes long).
const TAR_HEADER_PREFIX: usize = TAR_MAGIC_OFFSET + 6;

/// Extensions of ZIP-based document containers that are not extracted.
const CONTAINER_EXTENSIONS: &[&str] = &[
    "docx", "xlsx", "pptx", "docm", "xlsm", "pptm", // Office Open XML
    "odt", "ods", "odp", "odg", "odf", // OpenDocument
    "jar",
];

/// Returns `true` if the file starts with the ZIP local header signature.
#[must_use]
pub fn is_zip(path: &Path) -> bool {
    read_prefix::<4>(path).is_some_and(|head| head == ZIP_MAGIC)
}

/// Returns `true` if the file starts with the 7z signature.
#[must_use]
pub fn is_7z(path: &Path) -> bool {
    read_prefix::<6>(path).is_some_and(|head| head == SEVENZ_MAGIC)
}

/// Returns `true` if the file carries `ustar` at offset 257.
///
/// Files shorter than the magic field are not tar.
#[must_use]
pub fn is_tar(path: &Path) -> bool {
    read_prefix::<TAR_HEADER_PREFIX>(path).is_some_and(|head| has_tar_magic(&head))
}

/// Returns `true` if the file is gzip and its decompressed stream starts
/// with a tar header.
#[must_use]
pub fn is_gzip_tar(path: &Path) -> bool {
    if !read_prefix::<2>(path).is_some_and(|head| head == GZIP_MAGIC) {
        return false;
    }

    let Ok(file) = File::open(path) else {
        return false;
    };
    let mut head = [0u8; TAR_HEADER_PREFIX];
    GzDecoder::new(file).read_exact(&mut head).is_ok() && has_tar_magic(&head)
}

/// Classifies a file by signature.
///
/// Checks run in the order 7z, tar, gzip-wrapped tar, ZIP. The signatures
/// are mutually exclusive, so the order only matters for cost.
///
/// # Examples
///
/// ```no_run
/// use intake_core::ArchiveFormat;
/// use intake_core::formats::classify;
/// use std::path::Path;
///
/// match classify(Path::new("upload.bin")) {
///     Some(ArchiveFormat::Zip) => println!("zip"),
///     Some(other) => println!("{other}"),
///     None => println!("not an archive"),
/// }
/// ```
#[must_use]
pub fn classify(path: &Path) -> Option<ArchiveFormat> {
    if is_7z(path) {
        Some(ArchiveFormat::SevenZip)
    } else if is_tar(path) {
        Some(ArchiveFormat::Tar)
    } else if is_gzip_tar(path) {
        Some(ArchiveFormat::TarGz)
    } else if is_zip(path) {
        Some(ArchiveFormat::Zip)
    } else {
        None
    }
}

/// Returns `false` for document containers that happen to be ZIP files
/// (Office Open XML, OpenDocument, Java archives), `true` otherwise.
///
/// Only the lowercased suffix after the last `.` of the file name is
/// inspected, so a bare `.docx` is a document as well. The file is never
/// opened.
///
/// # Examples
///
/// ```
/// use intake_core::formats::is_actual_archive;
/// use std::path::Path;
///
/// assert!(is_actual_archive(Path::new("payload.zip")));
/// assert!(!is_actual_archive(Path::new("report.XLSX")));
/// assert!(!is_actual_archive(Path::new("lib/app.jar")));
/// ```
#[must_use]
pub fn is_actual_archive(path: &Path) -> bool {
    // Suffix after the last dot of the file name, so `.docx` counts too.
    let Some((_, extension)) = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.rsplit_once('.'))
    else {
        return true;
    };
    let extension = extension.to_ascii_lowercase();
    !CONTAINER_EXTENSIONS.contains(&extension.as_str())
}

fn has_tar_magic(head: &[u8]) -> bool {
    head.get(TAR_MAGIC_OFFSET..TAR_MAGIC_OFFSET + TAR_MAGIC.len()) == Some(TAR_MAGIC.as_slice())
}

fn read_prefix<const N: usize>(path: &Path) -> Option<[u8; N]> {
    let mut file = File::open(path).ok()?;
    let mut head = [0u8; N];
    file.read_exact(&mut head).ok()?;
    Some(head)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::test_utils;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).expect("failed to write fixture");
        path
    }

    #[test]
    fn test_detect_zip() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.bin", &test_utils::create_test_zip(&[("a.txt", b"a")]));

        assert!(is_zip(&path));
        assert!(!is_7z(&path));
        assert!(!is_tar(&path));
        assert_eq!(classify(&path), Some(ArchiveFormat::Zip));
    }

    #[test]
    fn test_detect_tar() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.bin", &test_utils::create_test_tar(&[("a.txt", b"a")]));

        assert!(is_tar(&path));
        assert!(!is_zip(&path));
        assert_eq!(classify(&path), Some(ArchiveFormat::Tar));
    }

    #[test]
    fn test_detect_gzip_tar() {
        let dir = TempDir::new().unwrap();
        let tar = test_utils::create_test_tar(&[("a.txt", b"a")]);
        let path = write(&dir, "a.bin", &test_utils::gzip(&tar));

        assert!(!is_tar(&path));
        assert!(is_gzip_tar(&path));
        assert_eq!(classify(&path), Some(ArchiveFormat::TarGz));
    }

    #[test]
    fn test_gzip_of_non_tar_is_unknown() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "notes.gz", &test_utils::gzip(b"plain text"));

        assert!(!is_gzip_tar(&path));
        assert_eq!(classify(&path), None);
    }

    #[test]
    fn test_detect_7z() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.bin", &test_utils::create_test_7z(&[("a.txt", b"a")]));

        assert!(is_7z(&path));
        assert!(!is_zip(&path));
        assert_eq!(classify(&path), Some(ArchiveFormat::SevenZip));
    }

    #[test]
    fn test_magic_only_headers() {
        let dir = TempDir::new().unwrap();
        let zip = write(&dir, "z", &[0x50, 0x4B, 0x03, 0x04]);
        let sevenz = write(&dir, "s", &SEVENZ_MAGIC);

        assert!(is_zip(&zip));
        assert!(is_7z(&sevenz));
    }

    #[test]
    fn test_short_files_are_unknown() {
        let dir = TempDir::new().unwrap();
        let empty = write(&dir, "empty", b"");
        let short_zip = write(&dir, "short", &[0x50, 0x4B, 0x03]);
        let mut almost_tar = vec![0u8; 262];
        almost_tar[257..262].copy_from_slice(b"ustar");
        let almost_tar = write(&dir, "almost", &almost_tar);

        assert_eq!(classify(&empty), None);
        assert!(!is_zip(&short_zip));
        assert!(!is_tar(&almost_tar));
    }

    #[test]
    fn test_missing_file_is_unknown() {
        let path = Path::new("/nonexistent/intake/archive.zip");
        assert!(!is_zip(path));
        assert!(!is_7z(path));
        assert!(!is_tar(path));
        assert!(!is_gzip_tar(path));
        assert_eq!(classify(path), None);
    }

    #[test]
    fn test_text_is_unknown() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "notes.txt", &[b'x'; 1024]);
        assert_eq!(classify(&path), None);
    }

    #[test]
    fn test_is_actual_archive() {
        for name in ["report.xlsx", "archive.jar", "doc.odt", "Slides.PPTX", "macro.docm"] {
            assert!(!is_actual_archive(Path::new(name)), "{name}");
        }
        for name in ["payload.zip", "data.tar.gz", "bundle.7z", "README", "odt"] {
            assert!(is_actual_archive(Path::new(name)), "{name}");
        }
    }

    #[test]
    fn test_is_actual_archive_bare_dotted_name() {
        assert!(!is_actual_archive(Path::new(".docx")));
        assert!(!is_actual_archive(Path::new("uploads/.JAR")));
        assert!(is_actual_archive(Path::new(".zip")));
        assert!(is_actual_archive(Path::new("trailing.")));
    }
}
