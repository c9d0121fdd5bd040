//! Destination directory of an extraction.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use crate::IoContext;
use crate::Result;
use crate::security::path::clean_path;
use crate::security::path::safe_join;

/// The directory all extracted paths must resolve under.
///
/// Construction creates the directory if it is missing (only the directory
/// itself, never its ancestors) with a restrictive mode, reuses an existing
/// directory as-is without clearing it, and stores the canonical path so
/// later containment checks compare against a symlink-free absolute root.
/// The path as the caller spelled it is kept for reporting.
///
/// # Examples
///
/// ```no_run
/// use intake_core::types::DestRoot;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dest = DestRoot::prepare(Path::new("/tmp/ingest"), 0o750)?;
/// let out = dest.join_entry("pkg/data.csv")?;
/// assert!(out.starts_with(dest.as_path()));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestRoot {
    canonical: PathBuf,
    requested: PathBuf,
}

impl DestRoot {
    /// Ensures `path` exists as a directory and returns its canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::Io`](crate::ArchiveError::Io) if the directory
    /// cannot be created (including a missing parent), if `path` exists but
    /// is not a directory, or if it cannot be canonicalized.
    pub fn prepare(path: &Path, mode: u32) -> Result<Self> {
        match create_dir(path, mode) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(e).io_context(|| {
                    format!("creating destination directory {}", path.display())
                });
            }
        }

        if !path.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "path exists and is not a directory",
            ))
            .io_context(|| format!("preparing destination {}", path.display()));
        }

        let canonical = path
            .canonicalize()
            .io_context(|| format!("resolving destination {}", path.display()))?;

        Ok(Self {
            canonical,
            requested: clean_path(path),
        })
    }

    /// Returns the canonical destination path.
    #[inline]
    #[must_use]
    pub fn as_path(&self) -> &Path {
        &self.canonical
    }

    /// Joins an untrusted entry name, rejecting anything that escapes.
    ///
    /// # Errors
    ///
    /// Returns [`ArchiveError::PathTraversal`](crate::ArchiveError::PathTraversal)
    /// if the entry does not resolve strictly below this root.
    pub fn join_entry(&self, entry_name: &str) -> Result<PathBuf> {
        safe_join(&self.canonical, entry_name)
    }

    /// Returns the conventional extraction root for `source`: the
    /// destination as the caller passed it (cleaned, not canonicalized)
    /// joined with the source file name minus its last extension.
    ///
    /// Returns an empty path when `source` has no file name, which the
    /// dispatcher reports as an internal error.
    #[must_use]
    pub fn extracted_root(&self, source: &Path) -> PathBuf {
        match source.file_stem() {
            Some(stem) => self.requested.join(stem),
            None => PathBuf::new(),
        }
    }
}

#[cfg(unix)]
fn create_dir(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().mode(mode).create(path)
}

#[cfg(not(unix))]
fn create_dir(path: &Path, _mode: u32) -> io::Result<()> {
    fs::DirBuilder::new().create(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ArchiveError;
    use tempfile::TempDir;

    #[test]
    fn test_prepare_existing() {
        let temp = TempDir::new().expect("failed to create temp dir");
        std::fs::write(temp.path().join("keep.txt"), "x").unwrap();

        let dest = DestRoot::prepare(temp.path(), 0o750).unwrap();
        assert_eq!(dest.as_path(), temp.path().canonicalize().unwrap());
        assert!(temp.path().join("keep.txt").exists());
    }

    #[test]
    fn test_prepare_creates_missing() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let target = temp.path().join("out");

        let dest = DestRoot::prepare(&target, 0o750).unwrap();
        assert!(target.is_dir());
        assert!(dest.as_path().ends_with("out"));
    }

    #[cfg(unix)]
    #[test]
    fn test_prepare_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().expect("failed to create temp dir");
        let target = temp.path().join("restricted");
        DestRoot::prepare(&target, 0o700).unwrap();

        let mode = std::fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[test]
    fn test_prepare_does_not_create_ancestors() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let target = temp.path().join("missing").join("out");

        let err = DestRoot::prepare(&target, 0o750).unwrap_err();
        assert!(matches!(err, ArchiveError::Io { .. }));
        assert!(!temp.path().join("missing").exists());
    }

    #[test]
    fn test_prepare_rejects_file() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let file = temp.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();

        assert!(matches!(
            DestRoot::prepare(&file, 0o750),
            Err(ArchiveError::Io { .. })
        ));
    }

    #[test]
    fn test_join_entry() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestRoot::prepare(temp.path(), 0o750).unwrap();

        let joined = dest.join_entry("a/b.txt").unwrap();
        assert_eq!(joined, dest.as_path().join("a/b.txt"));
        assert!(dest.join_entry("../b.txt").is_err());
    }

    #[test]
    fn test_extracted_root_strips_last_extension() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let dest = DestRoot::prepare(temp.path(), 0o750).unwrap();

        assert_eq!(
            dest.extracted_root(Path::new("/in/package.zip")),
            temp.path().join("package")
        );
        assert_eq!(
            dest.extracted_root(Path::new("bundle.tar.gz")),
            temp.path().join("bundle.tar")
        );
        assert_eq!(dest.extracted_root(Path::new("/")), PathBuf::new());
    }

    #[test]
    fn test_extracted_root_keeps_requested_spelling() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let target = temp.path().join("out");
        std::fs::create_dir(&target).unwrap();
        let dest = DestRoot::prepare(&target.join("."), 0o750).unwrap();

        assert_eq!(dest.extracted_root(Path::new("pkg.zip")), target.join("pkg"));
    }

    #[cfg(unix)]
    #[test]
    fn test_extracted_root_does_not_resolve_symlinks() {
        let temp = TempDir::new().expect("failed to create temp dir");
        let real = temp.path().join("real");
        std::fs::create_dir(&real).unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let dest = DestRoot::prepare(&link, 0o750).unwrap();

        assert_eq!(dest.as_path(), real.canonicalize().unwrap());
        assert_eq!(dest.extracted_root(Path::new("pkg.zip")), link.join("pkg"));
    }
}
