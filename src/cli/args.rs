//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::Parser;
use std::path::PathBuf;

use crate::report::OutputFormat;

/// installcheck - Verify an installed node_modules tree.
#[derive(Debug, Clone, Parser)]
#[command(name = "installcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the project to verify (overrides current directory)
    #[arg(short, long)]
    pub project: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Do not print anything when the tree is healthy
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Read settings from the project itself instead of its workspace root
    #[arg(long)]
    pub no_workspace: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_arguments_is_valid() {
        let cli = Cli::try_parse_from(["installcheck"]).unwrap();
        assert!(cli.project.is_none());
        assert_eq!(cli.format, OutputFormat::Human);
        assert!(!cli.quiet);
        assert!(!cli.no_workspace);
    }

    #[test]
    fn parses_all_flags() {
        let cli = Cli::try_parse_from([
            "installcheck",
            "--project",
            "/tmp/app",
            "--format",
            "json",
            "--quiet",
            "--no-color",
            "--no-workspace",
            "--debug",
        ])
        .unwrap();
        assert_eq!(cli.project, Some(PathBuf::from("/tmp/app")));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.quiet && cli.no_color && cli.no_workspace && cli.debug);
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["installcheck", "--format", "sarif"]).is_err());
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
