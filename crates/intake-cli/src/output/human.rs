//! Human-readable output formatter with colors and styling.

use super::formatter::Detection;
use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use intake_core::CompressionReport;
use intake_core::ExtractionReport;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn headline(&self, text: &str) {
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {text}", style("✓").green().bold()));
        } else {
            let _ = self.term.write_line(text);
        }
    }

    fn warnings(&self, warnings: &[String]) {
        if warnings.is_empty() {
            return;
        }

        let _ = self.term.write_line("");
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{}", style("Warnings:").yellow().bold()));
        } else {
            let _ = self.term.write_line("Warnings:");
        }
        for warning in warnings {
            let _ = self.term.write_line(&format!("  - {warning}"));
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.headline("Extraction complete");

        if let Some(format) = report.format {
            let _ = self.term.write_line(&format!("  Format: {format}"));
        }
        let _ = self.term.write_line(&format!(
            "  Extracted to: {}",
            report.extracted_root.display()
        ));
        let _ = self
            .term
            .write_line(&format!("  Files extracted: {}", report.files_extracted));
        let _ = self
            .term
            .write_line(&format!("  Directories: {}", report.directories_created));
        let _ = self.term.write_line(&format!(
            "  Total size: {}",
            Self::format_size(report.bytes_written)
        ));

        if report.files_truncated > 0 {
            let _ = self
                .term
                .write_line(&format!("  Files truncated: {}", report.files_truncated));
        }

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Entries written: {}", report.total_items()));
            let _ = self
                .term
                .write_line(&format!("  Entries skipped: {}", report.entries_skipped));
            let _ = self
                .term
                .write_line(&format!("  Duration: {:?}", report.duration));
        }

        if report.has_warnings() {
            self.warnings(&report.warnings);
        }

        Ok(())
    }

    fn format_compression_result(
        &self,
        output_path: &Path,
        report: &CompressionReport,
    ) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.headline(&format!("Archive created: {}", output_path.display()));

        let _ = self
            .term
            .write_line(&format!("  Files added: {}", report.files_added));
        let _ = self
            .term
            .write_line(&format!("  Directories: {}", report.directories_added));
        let _ = self.term.write_line(&format!(
            "  Total size: {}",
            Self::format_size(report.bytes_read)
        ));

        if report.entries_skipped > 0 {
            let _ = self
                .term
                .write_line(&format!("  Entries skipped: {}", report.entries_skipped));
        }

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Duration: {:?}", report.duration));
        }

        self.warnings(&report.warnings);

        Ok(())
    }

    fn format_detections(&self, detections: &[Detection]) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for detection in detections {
            let format = detection.format.map_or("unknown", |f| f.name());
            let verdict = match (detection.format, detection.actual_archive) {
                (None, _) => "not an archive",
                (Some(_), true) => "archive",
                (Some(_), false) => "document",
            };
            let _ = self.term.write_line(&format!(
                "{}: {format} ({verdict})",
                detection.path.display()
            ));
        }

        Ok(())
    }

    fn format_error(&self, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = term.write_line(&format!("ERROR: {error:?}"));
        }
    }
}
