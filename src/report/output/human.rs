//! Human-readable output formatter.
//!
//! Formats a report for terminal display with optional color support.

use super::{display_path, ReportFormatter};
use crate::report::{Diagnostic, Report};
use console::Style;
use std::io::Write;
use std::path::PathBuf;

/// Summary line for a report with diagnostics.
pub const FAILURE_SUMMARY: &str = "Your node_modules are messed up.";

/// Line printed for a clean report.
pub const SUCCESS_SUMMARY: &str = "Your node_modules look good.";

/// Formats reports for human consumption.
pub struct HumanFormatter {
    /// Whether to use colors (ANSI escape codes).
    pub use_color: bool,
    /// Paths under this directory are shown relative to it.
    pub base_dir: PathBuf,
}

impl HumanFormatter {
    /// Create a new human formatter.
    pub fn new(use_color: bool, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            use_color,
            base_dir: base_dir.into(),
        }
    }

    fn style(&self, style: Style) -> Style {
        if self.use_color {
            style.force_styling(true)
        } else {
            Style::new()
        }
    }

    /// The two lines describing one diagnostic.
    pub fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let name = self.style(Style::new().cyan().bright());
        let good = self.style(Style::new().green());
        let bad = self.style(Style::new().red());

        let consumer = display_name(diagnostic.consumer_name());
        let headline = match diagnostic {
            Diagnostic::Missing {
                dependency_name, ..
            } => format!(
                "{} is missing {}",
                name.apply_to(consumer),
                bad.apply_to(dependency_name)
            ),
            Diagnostic::Mismatch {
                dependency_name,
                declared_range,
                found_version,
                ..
            } => format!(
                "{} asked for {} {} but got {}",
                name.apply_to(consumer),
                name.apply_to(dependency_name),
                good.apply_to(declared_range),
                bad.apply_to(display_version(found_version))
            ),
        };

        format!(
            "{}\n  - in {} at {}",
            headline,
            diagnostic.section(),
            display_path(diagnostic.consumer_path(), &self.base_dir)
        )
    }
}

impl ReportFormatter for HumanFormatter {
    fn format<W: Write>(&self, report: &Report, writer: &mut W) -> std::io::Result<()> {
        if report.is_clean() {
            let success = self.style(Style::new().green());
            writeln!(writer, "{}", success.apply_to(SUCCESS_SUMMARY))?;
            return Ok(());
        }

        for diagnostic in report {
            writeln!(writer, "{}", self.format_diagnostic(diagnostic))?;
        }

        let error = self.style(Style::new().red());
        writeln!(writer, "{}", error.apply_to(FAILURE_SUMMARY))?;
        Ok(())
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // Check NO_COLOR env var (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    // Check if stdout is a TTY
    console::Term::stdout().is_term()
}

fn display_name(name: &str) -> &str {
    if name.is_empty() {
        "(unnamed package)"
    } else {
        name
    }
}

fn display_version(version: &str) -> &str {
    if version.is_empty() {
        "(no version)"
    } else {
        version
    }
}
