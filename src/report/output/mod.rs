//! Report formatters.
//!
//! This module provides formatters for writing a [`Report`] in different
//! formats (human-readable, JSON).

pub mod human;
pub mod json;

use crate::report::Report;
use std::io::Write;
use std::path::Path;

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// Trait for formatting a report.
pub trait ReportFormatter {
    /// Format the report to the given writer.
    fn format<W: Write>(&self, report: &Report, writer: &mut W) -> std::io::Result<()>;
}

/// Render `path` relative to `base` when it lies under it.
///
/// `base` itself renders as `.`; anything outside is shown as-is.
pub fn display_path(path: &Path, base: &Path) -> String {
    match path.strip_prefix(base) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => rel.display().to_string(),
        Err(_) => path.display().to_string(),
    }
}

pub use human::{should_use_colors, HumanFormatter};
pub use json::JsonFormatter;
