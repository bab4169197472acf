//! The verification command.
//!
//! Preflights the project directory, loads workspace settings, runs the
//! walker from the project's `package.json`, and renders the report.

use anyhow::Context;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cli::args::Cli;
use crate::config::{find_workspace_root, Settings};
use crate::error::{InstallCheckError, Result};
use crate::manifest::MANIFEST_FILE;
use crate::report::{HumanFormatter, JsonFormatter, OutputFormat, ReportFormatter};
use crate::walker::verify;

/// Exit status for a tree with problems or a failed preflight.
pub const FAILURE_EXIT_CODE: i32 = -1;

/// Result of command execution.
#[derive(Debug, PartialEq, Eq)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }

    /// The exit code as a process status byte (`-1` becomes `255`).
    pub fn status_byte(&self) -> u8 {
        self.exit_code as u8
    }
}

/// Options for a verification run.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub format: OutputFormat,
    pub quiet: bool,
    pub use_color: bool,
    pub no_workspace: bool,
}

impl CheckOptions {
    /// Options from parsed arguments.
    pub fn from_cli(cli: &Cli, use_color: bool) -> Self {
        Self {
            format: cli.format,
            quiet: cli.quiet,
            use_color: use_color && !cli.no_color,
            no_workspace: cli.no_workspace,
        }
    }
}

/// The check command implementation.
pub struct CheckCommand {
    project_root: PathBuf,
    invocation_dir: PathBuf,
    options: CheckOptions,
}

impl CheckCommand {
    /// Create a check of `project_root`, rendering paths relative to
    /// `invocation_dir`.
    pub fn new(project_root: &Path, invocation_dir: &Path, options: CheckOptions) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            invocation_dir: invocation_dir.to_path_buf(),
            options,
        }
    }

    /// Run the check, writing the report to `out` and preflight failures
    /// to `err`.
    ///
    /// # Errors
    ///
    /// Unreadable or corrupt manifests and settings abort the run.
    pub fn execute<O: Write, E: Write>(&self, out: &mut O, err: &mut E) -> Result<CommandResult> {
        let manifest = self.project_root.join(MANIFEST_FILE);
        if !manifest.is_file() {
            let preflight = InstallCheckError::NoManifest {
                dir: self.project_root.clone(),
            };
            writeln!(err, "{}", preflight)?;
            return Ok(CommandResult::failure(FAILURE_EXIT_CODE));
        }

        let project_root = fs::canonicalize(&self.project_root).with_context(|| {
            format!("Failed to resolve project directory {}", self.project_root.display())
        })?;
        let settings_root = if self.options.no_workspace {
            project_root.clone()
        } else {
            find_workspace_root(&project_root).dir
        };
        let settings = Settings::load(&settings_root)?;

        let report = verify(&project_root.join(MANIFEST_FILE), &settings)?;
        tracing::info!(
            "Checked {} manifests, found {} problem(s)",
            report.visited(),
            report.len()
        );

        let base = fs::canonicalize(&self.invocation_dir).unwrap_or_else(|_| self.invocation_dir.clone());
        match self.options.format {
            OutputFormat::Json => JsonFormatter::new(base).format(&report, out)?,
            OutputFormat::Human if report.is_clean() && self.options.quiet => {}
            OutputFormat::Human => HumanFormatter::new(self.options.use_color, base).format(&report, out)?,
        }

        if report.is_clean() {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(FAILURE_EXIT_CODE))
        }
    }
}
