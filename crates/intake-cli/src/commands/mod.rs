//! Subcommand implementations.

pub mod compress;
pub mod detect;
pub mod extract;
