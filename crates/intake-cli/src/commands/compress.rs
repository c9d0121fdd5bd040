//! Compress command implementation.

use crate::cli::CompressArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use intake_core::CancelToken;
use intake_core::CompressionConfig;
use intake_core::compress_directory_to_zip_with;

pub fn execute(args: &CompressArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let config = CompressionConfig::default().with_compression_level(args.level);

    let report = add_archive_context(
        compress_directory_to_zip_with(
            &CancelToken::new(),
            &args.source_dir,
            &args.output,
            &config,
        ),
        &args.output,
    )?;

    formatter.format_compression_result(&args.output, &report)?;

    Ok(())
}
