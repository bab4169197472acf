//! Command-line interface for installcheck.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and the check command that drives a verification run.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`check`] - Preflight, walker invocation, rendering and exit status

pub mod args;
pub mod check;

pub use args::Cli;
pub use check::{CheckCommand, CheckOptions, CommandResult, FAILURE_EXIT_CODE};
