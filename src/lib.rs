//! installcheck - Verify an installed node_modules tree.
//!
//! installcheck walks every `package.json` reachable from a project and
//! checks that each declared dependency is installed at a version inside
//! the declared range. It only reads; nothing on disk is changed.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and the check command
//! - [`config`] - Workspace root discovery and verification settings
//! - [`error`] - Error types and result aliases
//! - [`locator`] - Finding installed packages in `node_modules`
//! - [`manifest`] - `package.json` model and loading
//! - [`report`] - Diagnostics and output formatters
//! - [`version`] - npm range satisfaction
//! - [`walker`] - The recursive verifier
//!
//! # Example
//!
//! ```
//! use installcheck::config::Settings;
//! use installcheck::walker::verify;
//! use std::fs;
//! use tempfile::TempDir;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(
//!     temp.path().join("package.json"),
//!     r#"{ "name": "app", "dependencies": { "left-pad": "^2.0.0" } }"#,
//! ).unwrap();
//! let pkg = temp.path().join("node_modules/left-pad");
//! fs::create_dir_all(&pkg).unwrap();
//! fs::write(pkg.join("package.json"), r#"{ "name": "left-pad", "version": "1.3.0" }"#).unwrap();
//!
//! let report = verify(&temp.path().join("package.json"), &Settings::default()).unwrap();
//! assert_eq!(report.len(), 1);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod locator;
pub mod manifest;
pub mod report;
pub mod version;
pub mod walker;

pub use error::{InstallCheckError, Result};
