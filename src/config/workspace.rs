//! Workspace root discovery.
//!
//! Walks up from a starting directory looking for the markers that the
//! common Node package managers use to declare a multi-package project.

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::manifest::MANIFEST_FILE;

/// pnpm's workspace declaration file.
pub const PNPM_WORKSPACE_FILE: &str = "pnpm-workspace.yaml";

/// Lerna's configuration file.
pub const LERNA_FILE: &str = "lerna.json";

/// How the workspace root was recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceKind {
    /// `pnpm-workspace.yaml`
    Pnpm,
    /// `workspaces` field in `package.json` (npm, Yarn, Bun)
    Workspaces,
    /// `lerna.json`
    Lerna,
    /// No workspace; the nearest directory with a `package.json`.
    SinglePackage,
    /// Nothing found; the starting directory.
    Unknown,
}

/// A discovered workspace root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceRoot {
    pub dir: PathBuf,
    pub kind: WorkspaceKind,
}

/// Find the workspace root by walking up from `start`.
///
/// Looks for, in each directory from `start` upwards:
/// 1. `pnpm-workspace.yaml`
/// 2. a `package.json` declaring `workspaces`
/// 3. `lerna.json`
///
/// Falls back to the nearest directory containing a `package.json`, and
/// finally to `start` itself.
pub fn find_workspace_root(start: &Path) -> WorkspaceRoot {
    let mut nearest_package: Option<PathBuf> = None;

    for dir in start.ancestors() {
        if dir.join(PNPM_WORKSPACE_FILE).is_file() {
            return found(dir, WorkspaceKind::Pnpm);
        }
        let manifest = dir.join(MANIFEST_FILE);
        if manifest.is_file() {
            if declares_workspaces(&manifest) {
                return found(dir, WorkspaceKind::Workspaces);
            }
            if nearest_package.is_none() {
                nearest_package = Some(dir.to_path_buf());
            }
        }
        if dir.join(LERNA_FILE).is_file() {
            return found(dir, WorkspaceKind::Lerna);
        }
    }

    match nearest_package {
        Some(dir) => found(&dir, WorkspaceKind::SinglePackage),
        None => found(start, WorkspaceKind::Unknown),
    }
}

fn found(dir: &Path, kind: WorkspaceKind) -> WorkspaceRoot {
    tracing::debug!("Workspace root {} ({:?})", dir.display(), kind);
    WorkspaceRoot {
        dir: dir.to_path_buf(),
        kind,
    }
}

/// `workspaces: [...]` or `workspaces: { packages: [...] }`.
fn declares_workspaces(manifest: &Path) -> bool {
    let Ok(content) = fs::read_to_string(manifest) else {
        return false;
    };
    let Ok(value) = serde_json::from_str::<Value>(content.trim_start_matches('\u{feff}')) else {
        tracing::debug!("Skipping unparseable manifest {}", manifest.display());
        return false;
    };
    match value.get("workspaces") {
        Some(Value::Array(_)) => true,
        Some(Value::Object(obj)) => obj.get("packages").is_some_and(Value::is_array),
        _ => false,
    }
}
