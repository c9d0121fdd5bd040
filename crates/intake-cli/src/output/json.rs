//! JSON output formatter for machine-readable results.

use super::formatter::Detection;
use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use intake_core::CompressionReport;
use intake_core::ExtractionReport;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

#[derive(Serialize)]
struct ExtractionOutput {
    format: Option<&'static str>,
    extracted_root: String,
    files_extracted: usize,
    directories_created: usize,
    entries_skipped: usize,
    files_truncated: usize,
    bytes_written: u64,
    duration_ms: u128,
    warnings: Vec<String>,
}

impl From<&ExtractionReport> for ExtractionOutput {
    fn from(report: &ExtractionReport) -> Self {
        Self {
            format: report.format.map(|f| f.name()),
            extracted_root: report.extracted_root.display().to_string(),
            files_extracted: report.files_extracted,
            directories_created: report.directories_created,
            entries_skipped: report.entries_skipped,
            files_truncated: report.files_truncated,
            bytes_written: report.bytes_written,
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        }
    }
}

#[derive(Serialize)]
struct DetectionOutput {
    path: String,
    format: Option<&'static str>,
    actual_archive: bool,
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()> {
        let output = JsonOutput::success("extract", ExtractionOutput::from(report));
        Self::output(&output)
    }

    fn format_compression_result(
        &self,
        output_path: &Path,
        report: &CompressionReport,
    ) -> Result<()> {
        #[derive(Serialize)]
        struct CompressionOutput {
            output_path: String,
            files_added: usize,
            directories_added: usize,
            entries_skipped: usize,
            bytes_read: u64,
            duration_ms: u128,
            warnings: Vec<String>,
        }

        let data = CompressionOutput {
            output_path: output_path.display().to_string(),
            files_added: report.files_added,
            directories_added: report.directories_added,
            entries_skipped: report.entries_skipped,
            bytes_read: report.bytes_read,
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        };

        let output = JsonOutput::success("compress", data);
        Self::output(&output)
    }

    fn format_detections(&self, detections: &[Detection]) -> Result<()> {
        let data: Vec<DetectionOutput> = detections
            .iter()
            .map(|d| DetectionOutput {
                path: d.path.display().to_string(),
                format: d.format.map(|f| f.name()),
                actual_archive: d.actual_archive,
            })
            .collect();

        Self::output(&JsonOutput::success("detect", data))
    }

    fn format_error(&self, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error("error", format!("{error:#}"));
        let _ = Self::output(&output);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use intake_core::ArchiveFormat;

    #[test]
    fn test_extraction_output_fields() {
        let report = ExtractionReport {
            format: Some(ArchiveFormat::TarGz),
            files_extracted: 2,
            files_truncated: 1,
            ..ExtractionReport::default()
        };

        let json =
            serde_json::to_string(&JsonOutput::success("extract", ExtractionOutput::from(&report)))
                .unwrap();
        assert!(json.contains("\"status\":\"success\""));
        assert!(json.contains("\"format\":\"tar.gz\""));
        assert!(json.contains("\"files_truncated\":1"));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_error_output_omits_data() {
        let json = serde_json::to_string(&JsonOutput::<()>::error("error", "boom")).unwrap();
        assert!(json.contains("\"status\":\"error\""));
        assert!(json.contains("\"boom\""));
        assert!(!json.contains("\"data\""));
    }
}
