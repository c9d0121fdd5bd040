//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use intake_core::CancelToken;
use intake_core::ExtractionConfig;
use intake_core::NoopProgress;
use intake_core::extract_archive_with;
use intake_core::is_actual_archive;
use std::env;

pub fn execute(args: &ExtractArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    if !args.allow_documents && !is_actual_archive(&args.archive) {
        bail!(
            "'{}' looks like a document packaged as ZIP, not an archive\n\
             HINT: Use --allow-documents to extract it anyway.",
            args.archive.display()
        );
    }

    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("failed to get current directory")?,
    };

    let mut config = ExtractionConfig::default();
    if let Some(limit) = args.max_file_size {
        config = config.with_max_file_size(limit);
    }

    let cancel = CancelToken::new();
    let report = add_archive_context(
        extract_archive_with(
            &cancel,
            &args.archive,
            &output_dir,
            &config,
            &mut NoopProgress,
        ),
        &args.archive,
    )?;

    formatter.format_extraction_result(&report)?;

    Ok(())
}
