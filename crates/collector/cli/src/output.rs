//! Output formatting for CLI

use crate::error::CliResult;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Print `value` as JSON/YAML, or hand off to `table` for text output
pub fn emit<T: Serialize>(format: OutputFormat, value: &T, table: impl FnOnce(&T)) -> CliResult<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        OutputFormat::Table => table(value),
    }
    Ok(())
}

/// Print a bold section heading with an underline
pub fn heading(title: &str) {
    println!("{}", title.bold().cyan());
    println!("{}", "=".repeat(60));
}

/// Print one aligned `label: value` row
pub fn row(label: &str, value: impl std::fmt::Display) {
    println!("  {:<18} {}", format!("{}:", label).dimmed(), value);
}
