//! Subcommand implementations

pub mod ballot;
pub mod config;
pub mod proposal;
pub mod simulate;
