//! Error types for installcheck operations.
//!
//! This module defines [`InstallCheckError`], the fatal error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Missing and mismatched dependencies are never errors; they are
//!   collected into a [`Report`](crate::report::Report)
//! - A manifest that cannot be read or parsed aborts the whole run
//! - Use `anyhow::Error` (via `InstallCheckError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for installcheck operations.
#[derive(Debug, Error)]
pub enum InstallCheckError {
    /// No `package.json` in the directory being verified.
    #[error("You must run this command in a project with a package.json file.")]
    NoManifest { dir: PathBuf },

    /// A manifest exists but could not be read.
    #[error("Failed to read manifest at {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A manifest is not valid JSON or has the wrong shape.
    #[error("Failed to parse manifest at {path}: {message}")]
    ManifestParse { path: PathBuf, message: String },

    /// Workspace settings could not be parsed.
    #[error("Failed to parse workspace settings at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for installcheck operations.
pub type Result<T> = std::result::Result<T, InstallCheckError>;
