//! Extraction loop shared by every format adapter.
//!
//! Adapters only decode; this module owns everything that touches the
//! destination: containment checks, directory and file creation, mode
//! sanitization, the per-file size cap, cancellation polling and progress
//! reporting.

use std::fs;
use std::fs::File;
use std::fs::OpenOptions;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

use tracing::debug;
use tracing::warn;

use super::traits::ArchiveEntry;
use super::traits::EntryKind;
use super::traits::EntrySource;
use crate::CancelToken;
use crate::ExtractionConfig;
use crate::ExtractionReport;
use crate::IoContext;
use crate::ProgressCallback;
use crate::Result;
use crate::copy::CopyBuffer;
use crate::copy::copy_capped;
use crate::security::path::clean_path;
use crate::security::permissions::FALLBACK_MODE;
use crate::security::permissions::is_out_of_range;
use crate::security::permissions::sanitize_mode;
use crate::types::DestRoot;

/// Prepares `dest`, runs `source` into it and fills in `extracted_root`.
///
/// Adapters call this only after their codec opened successfully, so a
/// source that cannot be parsed never creates the destination.
pub(crate) fn extract_into(
    source: &mut dyn EntrySource,
    src: &Path,
    dest: &Path,
    cancel: &CancelToken,
    config: &ExtractionConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let dest = DestRoot::prepare(dest, config.dir_mode)?;
    debug!(
        format = %source.format(),
        src = %src.display(),
        dest = %dest.as_path().display(),
        "starting extraction"
    );

    let mut report = extract_entries(source, &dest, cancel, config, progress)?;
    report.extracted_root = dest.extracted_root(src);

    debug!(
        files = report.files_extracted,
        directories = report.directories_created,
        skipped = report.entries_skipped,
        bytes = report.bytes_written,
        "extraction finished"
    );
    Ok(report)
}

/// Runs `source` to completion against `dest`.
///
/// The report's `extracted_root` is left empty; adapters fill it in.
///
/// # Errors
///
/// Stops at the first error. Entries written before it stay on disk.
pub(crate) fn extract_entries(
    source: &mut dyn EntrySource,
    dest: &DestRoot,
    cancel: &CancelToken,
    config: &ExtractionConfig,
    progress: &mut dyn ProgressCallback,
) -> Result<ExtractionReport> {
    let start = Instant::now();
    let mut session = Session {
        cancel,
        config,
        progress,
        dest,
        report: ExtractionReport::new(),
        buffer: CopyBuffer::new(),
        index: 0,
    };
    session.report.format = Some(source.format());

    source.for_each_entry(&mut |entry| session.visit(entry))?;

    session.progress.on_complete();
    let mut report = session.report;
    report.duration = start.elapsed();
    Ok(report)
}

struct Session<'a> {
    cancel: &'a CancelToken,
    config: &'a ExtractionConfig,
    progress: &'a mut dyn ProgressCallback,
    dest: &'a DestRoot,
    report: ExtractionReport,
    buffer: CopyBuffer,
    index: usize,
}

impl Session<'_> {
    fn visit(&mut self, entry: ArchiveEntry<'_>) -> Result<()> {
        self.cancel.check()?;

        self.index += 1;
        let name = entry.name.clone();
        self.progress.on_entry_start(Path::new(&name), self.index);
        debug!(entry = %name, kind = ?entry.kind, size = entry.size, "extracting entry");

        match entry.kind {
            EntryKind::Directory => self.create_directory(&entry)?,
            EntryKind::File => self.write_file(entry)?,
            EntryKind::Other => {
                warn!(entry = %name, "skipping entry that is neither file nor directory");
                self.report.entries_skipped += 1;
            }
        }

        self.progress.on_entry_complete(Path::new(&name));
        Ok(())
    }

    fn create_directory(&mut self, entry: &ArchiveEntry<'_>) -> Result<()> {
        if names_dest_root(self.dest, &entry.name) {
            debug!(entry = %entry.name, "skipping directory entry for the destination root");
            self.report.entries_skipped += 1;
            return Ok(());
        }

        let target = self.dest.join_entry(&entry.name)?;
        let mode = self.entry_mode(entry).unwrap_or(self.config.dir_mode);

        create_dir_all_with_mode(&target, mode)
            .io_context(|| format!("creating directory {}", target.display()))?;
        self.report.directories_created += 1;
        Ok(())
    }

    /// Sanitized entry mode; a replaced mode is recorded in the report.
    fn entry_mode(&mut self, entry: &ArchiveEntry<'_>) -> Option<u32> {
        let raw = entry.mode?;
        if is_out_of_range(raw) {
            self.report.add_warning(format!(
                "invalid mode {raw:#o} on {}, using {FALLBACK_MODE:#o}",
                entry.name
            ));
        }
        Some(sanitize_mode(raw, &entry.name))
    }

    fn write_file(&mut self, entry: ArchiveEntry<'_>) -> Result<()> {
        let target = self.dest.join_entry(&entry.name)?;

        if let Some(parent) = target.parent() {
            create_dir_all_with_mode(parent, self.config.dir_mode)
                .io_context(|| format!("creating directory {}", parent.display()))?;
        }

        // Checked before the truncating open so an existing file survives.
        self.cancel.check()?;

        let mode = self.entry_mode(&entry);
        let file = create_file(&target, mode.unwrap_or(self.config.default_file_mode))
            .io_context(|| format!("creating file {}", target.display()))?;

        let mut writer = BufWriter::new(file);
        let copied = copy_capped(
            entry.reader,
            &mut writer,
            self.config.max_file_size,
            &mut self.buffer,
        )
        .io_context(|| format!("writing {} from entry {}", target.display(), entry.name))?;
        writer
            .flush()
            .io_context(|| format!("flushing {}", target.display()))?;
        drop(writer);

        // An explicit mode is applied after the write so that read-only
        // entries can still be filled and the process umask does not apply.
        #[cfg(unix)]
        if let Some(mode) = mode {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&target, fs::Permissions::from_mode(mode))
                .io_context(|| format!("setting permissions on {}", target.display()))?;
        }

        if copied.truncated {
            warn!(
                entry = %entry.name,
                limit = self.config.max_file_size,
                "file exceeds size limit, truncated"
            );
            self.report.files_truncated += 1;
            self.report.add_warning(format!(
                "truncated {} at {} bytes",
                entry.name, self.config.max_file_size
            ));
        }

        self.report.files_extracted += 1;
        self.report.bytes_written = self.report.bytes_written.saturating_add(copied.written);
        Ok(())
    }
}

/// Returns `true` for names like `.` or `./` that denote the root itself.
fn names_dest_root(dest: &DestRoot, name: &str) -> bool {
    clean_path(&dest.as_path().join(name)) == dest.as_path()
}

#[cfg(unix)]
fn create_dir_all_with_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(mode).create(path)
}

#[cfg(not(unix))]
fn create_dir_all_with_mode(path: &Path, _mode: u32) -> std::io::Result<()> {
    fs::create_dir_all(path)
}

#[cfg(unix)]
fn create_file(path: &Path, mode: u32) -> std::io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)
}

#[cfg(not(unix))]
fn create_file(path: &Path, _mode: u32) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
