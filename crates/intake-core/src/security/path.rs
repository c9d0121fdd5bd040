//! Path containment ("zip-slip") validation.
//!
//! Every adapter computes output paths through [`safe_join`]; nothing else
//! in the crate joins an entry name onto a destination.

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::ArchiveError;
use crate::Result;

/// Lexically normalizes a path without touching the filesystem.
///
/// - `.` components are dropped
/// - `..` removes the preceding normal component
/// - `..` directly under the root is dropped (`/..` is `/`)
/// - leading `..` of a relative path is kept
/// - an empty result becomes `.`
///
/// # Examples
///
/// ```
/// use intake_core::security::path::clean_path;
/// use std::path::Path;
///
/// assert_eq!(clean_path(Path::new("/out/a/../b/./c")), Path::new("/out/b/c"));
/// assert_eq!(clean_path(Path::new("../x/..")), Path::new(".."));
/// assert_eq!(clean_path(Path::new("a/..")), Path::new("."));
/// ```
#[must_use]
pub fn clean_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        PathBuf::from(".")
    } else {
        parts.iter().collect()
    }
}

/// Checks that `target` resolves strictly below `dest_root`.
///
/// Both paths are cleaned first; the comparison is component-wise, so
/// `/out2/x` is not inside `/out`. The root itself does not count as inside.
///
/// # Errors
///
/// Returns [`ArchiveError::PathTraversal`] carrying `target` when the
/// cleaned target is not a descendant of the cleaned root.
pub fn validate_containment(target: &Path, dest_root: &Path) -> Result<()> {
    let root = clean_path(dest_root);
    let cleaned = clean_path(target);

    match cleaned.strip_prefix(&root) {
        Ok(rest) if !rest.as_os_str().is_empty() => Ok(()),
        _ => Err(ArchiveError::PathTraversal {
            path: target.to_path_buf(),
        }),
    }
}

/// Joins an untrusted entry name onto `dest_root` and validates the result.
///
/// The returned path is cleaned. Absolute entry names replace the root when
/// joined and are therefore rejected, as are names whose `..` segments climb
/// out of the root.
///
/// # Errors
///
/// Returns [`ArchiveError::PathTraversal`] if the joined path escapes.
///
/// # Examples
///
/// ```
/// use intake_core::security::path::safe_join;
/// use std::path::Path;
///
/// let root = Path::new("/srv/ingest");
/// assert_eq!(
///     safe_join(root, "pkg/data/file.txt").unwrap(),
///     Path::new("/srv/ingest/pkg/data/file.txt")
/// );
/// assert!(safe_join(root, "../../etc/passwd").is_err());
/// assert!(safe_join(root, "/etc/passwd").is_err());
/// ```
pub fn safe_join(dest_root: &Path, entry_name: &str) -> Result<PathBuf> {
    let root = clean_path(dest_root);
    let joined = root.join(entry_name);
    validate_containment(&joined, &root)?;
    Ok(clean_path(&joined))
}
