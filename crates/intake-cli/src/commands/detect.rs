//! Detect command implementation.

use crate::cli::DetectArgs;
use crate::output::Detection;
use crate::output::OutputFormatter;
use anyhow::Result;
use intake_core::classify;
use intake_core::is_actual_archive;

pub fn execute(args: &DetectArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let detections: Vec<Detection> = args
        .files
        .iter()
        .map(|path| {
            let format = classify(path);
            Detection {
                path: path.clone(),
                format,
                actual_archive: format.is_some() && is_actual_archive(path),
            }
        })
        .collect();

    formatter.format_detections(&detections)
}
