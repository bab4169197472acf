//! Range satisfaction for installed versions.
//!
//! - [`range`] - npm range syntax desugared over [`semver::Version`]
//! - [`VersionComparator`] - the seam the walker checks versions through

pub mod range;

pub use range::{Range, RangeError};

use semver::Version;

/// Decides whether an installed version satisfies a declared range.
pub trait VersionComparator {
    /// `true` if `version` satisfies `range`. Unparseable input never
    /// satisfies anything.
    fn satisfies(&self, version: &str, range: &str) -> bool;
}

/// npm-compatible comparator.
#[derive(Debug, Clone, Copy)]
pub struct NpmComparator {
    /// Let pre-release versions satisfy ranges that do not mention one.
    pub include_prerelease: bool,
}

impl NpmComparator {
    /// Comparator with pre-release versions eligible.
    pub fn new() -> Self {
        Self {
            include_prerelease: true,
        }
    }
}

impl Default for NpmComparator {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionComparator for NpmComparator {
    fn satisfies(&self, version: &str, range: &str) -> bool {
        let Some(version) = parse_version(version) else {
            tracing::trace!("Installed version {:?} is not valid semver", version);
            return false;
        };
        match Range::parse_with(range, self.include_prerelease) {
            Ok(range) => range.matches(&version),
            Err(e) => {
                tracing::trace!("{}", e);
                false
            }
        }
    }
}

/// Parse an installed version, accepting a leading `v` or `=`.
pub fn parse_version(input: &str) -> Option<Version> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix('=').unwrap_or(trimmed);
    let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(trimmed).ok()
}
