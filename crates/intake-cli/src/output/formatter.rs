//! Output formatter trait for CLI results.

use anyhow::Result;
use intake_core::ArchiveFormat;
use intake_core::CompressionReport;
use intake_core::ExtractionReport;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;

/// Classification of a single file by `intake detect`.
#[derive(Debug, Clone)]
pub struct Detection {
    pub path: PathBuf,
    pub format: Option<ArchiveFormat>,
    pub actual_archive: bool,
}

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format extraction result
    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()>;

    /// Format compression result
    fn format_compression_result(&self, output_path: &Path, report: &CompressionReport)
    -> Result<()>;

    /// Format detection results
    fn format_detections(&self, detections: &[Detection]) -> Result<()>;

    /// Format error message
    fn format_error(&self, error: &anyhow::Error);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }
}

impl JsonOutput<()> {
    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}
