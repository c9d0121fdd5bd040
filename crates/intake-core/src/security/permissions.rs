//! Sanitizing untrusted permission bits from archive entries.

use tracing::warn;

/// Replacement for modes outside `0..=0o777`.
pub const FALLBACK_MODE: u32 = 0o755;

/// Largest accepted mode: plain `rwxrwxrwx`, no setuid/setgid/sticky.
pub const MAX_MODE: u32 = 0o777;

/// File-type bits (`S_IFMT`) that some codecs leave in the mode field.
const FILE_TYPE_BITS: u32 = 0o170_000;

/// Returns a mode that is safe to pass to the filesystem.
///
/// File-type bits are stripped first, since ZIP and some TAR writers store a
/// full `st_mode` (`0o100644`). Whatever remains must lie in `0..=0o777`;
/// anything else (setuid, setgid, sticky, garbage high bits) is replaced by
/// [`FALLBACK_MODE`] and a warning is logged.
///
/// # Examples
///
/// ```
/// use intake_core::security::permissions::sanitize_mode;
///
/// assert_eq!(sanitize_mode(0o644, "a.txt"), 0o644);
/// assert_eq!(sanitize_mode(0o100_640, "b.txt"), 0o640);
/// assert_eq!(sanitize_mode(0o4755, "setuid"), 0o755);
/// assert_eq!(sanitize_mode(u32::MAX, "garbage"), 0o755);
/// ```
pub fn sanitize_mode(raw: u32, entry_name: &str) -> u32 {
    let mode = raw & !FILE_TYPE_BITS;
    if mode > MAX_MODE {
        warn!(
            entry = entry_name,
            mode = %format!("{raw:#o}"),
            "invalid file mode, using default {FALLBACK_MODE:#o}"
        );
        FALLBACK_MODE
    } else {
        mode
    }
}

/// Returns `true` if [`sanitize_mode`] would replace `raw`.
#[must_use]
pub fn is_out_of_range(raw: u32) -> bool {
    raw & !FILE_TYPE_BITS > MAX_MODE
}
