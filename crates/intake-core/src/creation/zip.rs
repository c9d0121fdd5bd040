//! Packing a directory tree into a ZIP archive.

use std::fs;
use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::io::Seek;
use std::io::Write;
use std::path::Component;
use std::path::Path;
use std::time::Instant;

use tracing::debug;
use tracing::error;
use tracing::warn;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;

use crate::ArchiveError;
use crate::CancelToken;
use crate::CompressionConfig;
use crate::CompressionReport;
use crate::IoContext;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::copy_with_buffer;

/// Packs `src_dir` into a new ZIP file at `dest_zip`.
///
/// Convenience wrapper around [`compress_directory_to_zip_with`] using the
/// default compression level.
///
/// # Errors
///
/// See [`compress_directory_to_zip_with`].
pub fn compress_directory_to_zip(
    cancel: &CancelToken,
    src_dir: &Path,
    dest_zip: &Path,
) -> Result<()> {
    compress_directory_to_zip_with(cancel, src_dir, dest_zip, &CompressionConfig::default())
        .map(|_| ())
}

/// Packs `src_dir` into a new ZIP file at `dest_zip`.
///
/// Entries are named by their path relative to `src_dir` with `/`
/// separators, in lexical depth-first order. Directories get an entry with
/// a trailing `/` and no content; files are deflated. Symlinks and special
/// files are skipped with a warning. The root directory itself is not
/// stored.
///
/// Cancellation is polled before each walked entry and again right before a
/// file's bytes are copied. On failure the partially written archive is
/// left on disk.
///
/// # Errors
///
/// Returns [`ArchiveError::Cancelled`] when `cancel` fires, or
/// [`ArchiveError::Io`] if `src_dir` is not a readable directory, if the
/// archive cannot be created or if any walk, header or copy step fails.
///
/// # Examples
///
/// ```no_run
/// use intake_core::CancelToken;
/// use intake_core::CompressionConfig;
/// use intake_core::compress_directory_to_zip_with;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let report = compress_directory_to_zip_with(
///     &CancelToken::new(),
///     Path::new("/srv/outbox/package"),
///     Path::new("/srv/outbox/package.zip"),
///     &CompressionConfig::default().with_compression_level(Some(9)),
/// )?;
/// println!("packed {} files", report.files_added);
/// # Ok(())
/// # }
/// ```
pub fn compress_directory_to_zip_with(
    cancel: &CancelToken,
    src_dir: &Path,
    dest_zip: &Path,
    config: &CompressionConfig,
) -> Result<CompressionReport> {
    let start = Instant::now();

    let metadata =
        fs::metadata(src_dir).io_context(|| format!("reading source {}", src_dir.display()))?;
    if !metadata.is_dir() {
        return Err(ArchiveError::io(
            format!("reading source {}", src_dir.display()),
            io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
        ));
    }

    let file = File::create(dest_zip)
        .io_context(|| format!("creating archive {}", dest_zip.display()))?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let mut report = CompressionReport::default();

    if let Err(e) = add_tree(&mut zip, cancel, src_dir, config, &mut report) {
        // Finish what was written so the handle is released; the walk
        // error is what the caller needs to see.
        if let Err(close) = zip.finish() {
            error!(archive = %dest_zip.display(), error = %close, "failed to close partial archive");
        }
        return Err(e);
    }

    let mut writer = zip
        .finish()
        .map_err(|e| zip_error(format!("finishing archive {}", dest_zip.display()), e))?;
    writer
        .flush()
        .io_context(|| format!("flushing archive {}", dest_zip.display()))?;

    report.duration = start.elapsed();
    debug!(
        files = report.files_added,
        directories = report.directories_added,
        skipped = report.entries_skipped,
        bytes = report.bytes_read,
        "compression finished"
    );
    Ok(report)
}

fn add_tree<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    cancel: &CancelToken,
    src_dir: &Path,
    config: &CompressionConfig,
    report: &mut CompressionReport,
) -> Result<()> {
    let file_options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(config.compression_level);
    let mut buffer = CopyBuffer::new();

    for entry in WalkDir::new(src_dir).sort_by_file_name() {
        cancel.check()?;

        let entry =
            entry.map_err(|e| ArchiveError::io(format!("walking {}", src_dir.display()), e.into()))?;
        if entry.depth() == 0 {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(src_dir).map_err(|_| {
            ArchiveError::Internal(format!(
                "walked path {} is outside {}",
                path.display(),
                src_dir.display()
            ))
        })?;
        let name = archive_name(relative)?;
        let file_type = entry.file_type();

        if file_type.is_dir() {
            let options = with_permissions(SimpleFileOptions::default(), path)?;
            zip.add_directory(format!("{name}/"), options)
                .map_err(|e| zip_error(format!("adding directory {name}/"), e))?;
            report.directories_added += 1;
            debug!(entry = %name, "added directory");
        } else if file_type.is_file() {
            let options = with_permissions(file_options, path)?;
            let copied = add_file(zip, cancel, path, &name, options, &mut buffer)?;
            report.files_added += 1;
            report.bytes_read = report.bytes_read.saturating_add(copied);
            debug!(entry = %name, bytes = copied, "added file");
        } else {
            warn!(path = %path.display(), "skipping symlink or special file");
            report.entries_skipped += 1;
            report.add_warning(format!("skipped {}", path.display()));
        }
    }

    Ok(())
}

/// Writes one file entry. Cancellation is polled after the header and
/// before any bytes are copied.
fn add_file<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    cancel: &CancelToken,
    path: &Path,
    name: &str,
    options: SimpleFileOptions,
    buffer: &mut CopyBuffer,
) -> Result<u64> {
    let mut file = File::open(path).io_context(|| format!("opening {}", path.display()))?;
    zip.start_file(name, options)
        .map_err(|e| zip_error(format!("adding file {name}"), e))?;

    cancel.check()?;

    copy_with_buffer(&mut file, zip, buffer)
        .io_context(|| format!("compressing {}", path.display()))
}

/// Joins the normal components of `relative` with `/`.
fn archive_name(relative: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            let part = part.to_str().ok_or_else(|| {
                ArchiveError::io(
                    format!("naming entry {}", relative.display()),
                    io::Error::new(io::ErrorKind::InvalidData, "path is not valid UTF-8"),
                )
            })?;
            parts.push(part);
        }
    }
    Ok(parts.join("/"))
}

#[cfg(unix)]
fn with_permissions(options: SimpleFileOptions, path: &Path) -> Result<SimpleFileOptions> {
    use std::os::unix::fs::PermissionsExt;

    let metadata =
        fs::symlink_metadata(path).io_context(|| format!("reading metadata {}", path.display()))?;
    Ok(options.unix_permissions(metadata.permissions().mode() & 0o777))
}

#[cfg(not(unix))]
fn with_permissions(options: SimpleFileOptions, _path: &Path) -> Result<SimpleFileOptions> {
    Ok(options)
}

fn zip_error(context: String, e: ZipError) -> ArchiveError {
    ArchiveError::io(context, io::Error::other(e))
}
