//! JSON output formatter.
//!
//! Formats a report as machine-readable JSON for CI tooling.

use super::{display_path, ReportFormatter};
use crate::manifest::Section;
use crate::report::{Diagnostic, Report};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

/// Formats reports as JSON.
pub struct JsonFormatter {
    /// Paths under this directory are shown relative to it.
    pub base_dir: PathBuf,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    ok: bool,
    visited: usize,
    diagnostics: Vec<JsonDiagnostic<'a>>,
    summary: JsonSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonDiagnostic<'a> {
    kind: &'static str,
    consumer_name: &'a str,
    consumer_path: String,
    dependency_name: &'a str,
    section: Section,
    #[serde(skip_serializing_if = "Option::is_none")]
    declared_range: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    found_version: Option<&'a str>,
}

#[derive(Serialize)]
struct JsonSummary {
    total: usize,
    missing: usize,
    mismatched: usize,
}

impl JsonFormatter {
    /// Create a new JSON formatter.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn to_json<'a>(&self, diagnostic: &'a Diagnostic) -> JsonDiagnostic<'a> {
        let (kind, declared_range, found_version) = match diagnostic {
            Diagnostic::Missing { .. } => ("missing", None, None),
            Diagnostic::Mismatch {
                declared_range,
                found_version,
                ..
            } => (
                "mismatch",
                Some(declared_range.as_str()),
                Some(found_version.as_str()),
            ),
        };
        JsonDiagnostic {
            kind,
            consumer_name: diagnostic.consumer_name(),
            consumer_path: display_path(diagnostic.consumer_path(), &self.base_dir),
            dependency_name: diagnostic.dependency_name(),
            section: diagnostic.section(),
            declared_range,
            found_version,
        }
    }
}

impl ReportFormatter for JsonFormatter {
    fn format<W: Write>(&self, report: &Report, writer: &mut W) -> std::io::Result<()> {
        let output = JsonOutput {
            ok: report.is_clean(),
            visited: report.visited(),
            diagnostics: report.iter().map(|d| self.to_json(d)).collect(),
            summary: JsonSummary {
                total: report.len(),
                missing: report.missing_count(),
                mismatched: report.mismatch_count(),
            },
        };

        let json = serde_json::to_string_pretty(&output)?;
        writeln!(writer, "{}", json)
    }
}
