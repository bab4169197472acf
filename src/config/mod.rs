//! Workspace discovery and verification settings.
//!
//! This module handles:
//! - Locating the workspace root in [`workspace`]
//! - Loading package-manager settings from that root in [`settings`]
//!
//! Settings are built once by the driver and handed to the walker; nothing
//! here is global.
//!
//! # Example
//!
//! ```
//! use installcheck::config::{find_workspace_root, Settings};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(
//!     temp.path().join("package.json"),
//!     r#"{ "pnpm": { "peerDependencyRules": { "ignoreMissing": ["@babel/*"] } } }"#,
//! ).unwrap();
//!
//! let root = find_workspace_root(temp.path());
//! let settings = Settings::load(&root.dir).unwrap();
//! assert!(settings.peer_dependency_rules.ignores_missing("@babel/core"));
//! ```

pub mod settings;
pub mod workspace;

pub use settings::{PeerDependencyRules, Settings, DEFAULT_IGNORE};
pub use workspace::{find_workspace_root, WorkspaceKind, WorkspaceRoot};
