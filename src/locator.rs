//! Locating installed packages on disk.
//!
//! [`NodeModulesLocator`] follows Node's lookup: starting at a package's
//! directory, try `<dir>/node_modules/<name>`, then the same for every
//! ancestor, until a `package.json` is found.

use std::fs;
use std::path::{Path, PathBuf};

use crate::manifest::MANIFEST_FILE;

/// Name of the package storage directory.
pub const NODE_MODULES: &str = "node_modules";

/// Finds the installed manifest of a dependency.
pub trait PackageLocator {
    /// Return the manifest path of the copy of `name` visible from
    /// `from_dir`, or `None` if it is not installed.
    fn locate(&self, name: &str, from_dir: &Path) -> Option<PathBuf>;
}

/// Nested `node_modules` lookup.
///
/// Returned paths are canonicalized so that symlinked layouts (pnpm's
/// `.pnpm/<id>/node_modules`) resolve a package's own dependencies from
/// its real location, and so that the same package reached through two
/// links is visited once.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeModulesLocator;

impl PackageLocator for NodeModulesLocator {
    fn locate(&self, name: &str, from_dir: &Path) -> Option<PathBuf> {
        if !is_valid_package_name(name) {
            tracing::debug!("Refusing to resolve malformed package name {:?}", name);
            return None;
        }

        for dir in from_dir.ancestors() {
            if dir.file_name().is_some_and(|n| n == NODE_MODULES) {
                continue;
            }
            let candidate = dir.join(NODE_MODULES).join(name).join(MANIFEST_FILE);
            if candidate.is_file() {
                return Some(fs::canonicalize(&candidate).unwrap_or(candidate));
            }
        }
        None
    }
}

/// `name` or `@scope/name`, with no path traversal.
fn is_valid_package_name(name: &str) -> bool {
    if name.contains('\\') {
        return false;
    }
    let segments: Vec<&str> = name.split('/').collect();
    let well_formed = |s: &&str| !s.is_empty() && *s != "." && *s != "..";
    match segments.as_slice() {
        [single] => well_formed(single) && !single.starts_with('@'),
        [scope, pkg] => scope.starts_with('@') && scope.len() > 1 && well_formed(scope) && well_formed(pkg),
        _ => false,
    }
}
