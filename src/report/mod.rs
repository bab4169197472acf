//! Diagnostics collected by the walker.
//!
//! A [`Report`] is an ordered list of [`Diagnostic`]s. Order is traversal
//! order, so two runs over the same tree produce identical reports.

pub mod output;

use std::path::{Path, PathBuf};

use crate::manifest::Section;

pub use output::{should_use_colors, HumanFormatter, JsonFormatter, OutputFormat, ReportFormatter};

/// A single problem found in the installed tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A declared dependency is not installed anywhere visible.
    Missing {
        consumer_name: String,
        /// Directory of the consumer's manifest.
        consumer_path: PathBuf,
        dependency_name: String,
        section: Section,
    },
    /// A dependency is installed but its version is outside the range.
    Mismatch {
        consumer_name: String,
        consumer_path: PathBuf,
        dependency_name: String,
        section: Section,
        declared_range: String,
        found_version: String,
    },
}

impl Diagnostic {
    pub fn consumer_name(&self) -> &str {
        match self {
            Diagnostic::Missing { consumer_name, .. } | Diagnostic::Mismatch { consumer_name, .. } => {
                consumer_name
            }
        }
    }

    pub fn consumer_path(&self) -> &Path {
        match self {
            Diagnostic::Missing { consumer_path, .. } | Diagnostic::Mismatch { consumer_path, .. } => {
                consumer_path
            }
        }
    }

    pub fn dependency_name(&self) -> &str {
        match self {
            Diagnostic::Missing {
                dependency_name, ..
            }
            | Diagnostic::Mismatch {
                dependency_name, ..
            } => dependency_name,
        }
    }

    pub fn section(&self) -> Section {
        match self {
            Diagnostic::Missing { section, .. } | Diagnostic::Mismatch { section, .. } => *section,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Diagnostic::Missing { .. })
    }
}

/// Ordered diagnostics from one verification run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    diagnostics: Vec<Diagnostic>,
    visited: usize,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// `true` when nothing was found.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Number of distinct manifests read during the run.
    pub fn visited(&self) -> usize {
        self.visited
    }

    pub(crate) fn set_visited(&mut self, visited: usize) {
        self.visited = visited;
    }

    pub fn missing_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_missing()).count()
    }

    pub fn mismatch_count(&self) -> usize {
        self.len() - self.missing_count()
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
