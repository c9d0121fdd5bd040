//! Intake CLI - Command-line utility for detecting, extracting and packing
//! submission archives.

mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

fn main() {
    let cli = cli::Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("parsed CLI arguments: {cli:?}");

    let formatter = output::create_formatter(cli.json, cli.verbose > 0, cli.quiet);

    let result = match &cli.command {
        cli::Commands::Extract(args) => commands::extract::execute(args, &*formatter),
        cli::Commands::Compress(args) => commands::compress::execute(args, &*formatter),
        cli::Commands::Detect(args) => commands::detect::execute(args, &*formatter),
    };

    if let Err(e) = result {
        tracing::debug!("command failed: {e:?}");
        formatter.format_error(&e);
        std::process::exit(1);
    }
}
