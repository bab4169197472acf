//! Recursive verification of an installed dependency tree.
//!
//! The [`Walker`] starts at one manifest, locates every declared dependency
//! on disk, recurses into it, and checks its version against the declared
//! range. Each manifest path is read at most once per run: the version is
//! cached *before* recursing, so cycles terminate and diamonds are checked
//! once.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::Result;
use crate::locator::{NodeModulesLocator, PackageLocator};
use crate::manifest::{JsonManifestReader, Manifest, ManifestReader, Section};
use crate::report::{Diagnostic, Report};
use crate::version::{NpmComparator, VersionComparator};

/// Range prefix of a workspace-local link.
pub const WORKSPACE_PROTOCOL: &str = "workspace:";

/// Range prefix of a package alias (`npm:<name>@<range>`).
pub const ALIAS_PROTOCOL: &str = "npm:";

/// Sections always checked, in order.
const ALWAYS_CHECKED: [Section; 2] = [Section::Dependencies, Section::PeerDependencies];

/// Walks an installed tree and collects diagnostics.
pub struct Walker<'a> {
    settings: &'a Settings,
    reader: &'a dyn ManifestReader,
    locator: &'a dyn PackageLocator,
    comparator: &'a dyn VersionComparator,
    seen: HashMap<PathBuf, String>,
    report: Report,
}

impl<'a> Walker<'a> {
    /// Create a walker over the given collaborators.
    pub fn new(
        settings: &'a Settings,
        reader: &'a dyn ManifestReader,
        locator: &'a dyn PackageLocator,
        comparator: &'a dyn VersionComparator,
    ) -> Self {
        Self {
            settings,
            reader,
            locator,
            comparator,
            seen: HashMap::new(),
            report: Report::new(),
        }
    }

    /// Verify the manifest at `manifest_path` and everything it reaches.
    ///
    /// Returns the manifest's version. `check_dev_dependencies` should only
    /// be set for the root of a run; it is never propagated.
    ///
    /// # Errors
    ///
    /// Fails if any reachable manifest cannot be read or parsed. Missing
    /// and mismatched dependencies are recorded in the report instead.
    pub fn traverse(&mut self, manifest_path: &Path, check_dev_dependencies: bool) -> Result<String> {
        if let Some(version) = self.seen.get(manifest_path) {
            tracing::trace!("Already visited {}", manifest_path.display());
            return Ok(version.clone());
        }

        let manifest = self.reader.load(manifest_path)?;
        tracing::debug!(
            "Visiting {}@{} at {}",
            manifest.name,
            manifest.version,
            manifest_path.display()
        );
        // Must happen before recursing so that cycles hit the cache.
        self.seen
            .insert(manifest_path.to_path_buf(), manifest.version.clone());

        let package_root = manifest_path.parent().unwrap_or_else(|| Path::new(""));
        for section in ALWAYS_CHECKED {
            self.check_section(section, &manifest, package_root)?;
        }
        if check_dev_dependencies {
            self.check_section(Section::DevDependencies, &manifest, package_root)?;
        }

        Ok(manifest.version)
    }

    fn check_section(&mut self, section: Section, manifest: &Manifest, package_root: &Path) -> Result<()> {
        for (name, declared) in manifest.section(section).iter() {
            if declared.starts_with(WORKSPACE_PROTOCOL) {
                tracing::trace!("Skipping workspace link {} in {}", name, section);
                continue;
            }
            let range = unwrap_alias(declared);

            let Some(resolved) = self.locator.locate(name, package_root) else {
                if self.may_be_missing(section, manifest, name) {
                    tracing::trace!("{} may be missing from {}", name, manifest.name);
                } else {
                    self.report.push(Diagnostic::Missing {
                        consumer_name: manifest.name.clone(),
                        consumer_path: package_root.to_path_buf(),
                        dependency_name: name.to_string(),
                        section,
                    });
                }
                continue;
            };

            let found = self.traverse(&resolved, false)?;
            if !self.accepts(section, manifest, name, range, &found) {
                self.report.push(Diagnostic::Mismatch {
                    consumer_name: manifest.name.clone(),
                    consumer_path: package_root.to_path_buf(),
                    dependency_name: name.to_string(),
                    section,
                    declared_range: range.to_string(),
                    found_version: found,
                });
            }
        }
        Ok(())
    }

    fn may_be_missing(&self, section: Section, manifest: &Manifest, name: &str) -> bool {
        if self.settings.is_ignored(name) {
            return true;
        }
        section == Section::PeerDependencies
            && (manifest.is_optional_peer(name)
                || self.settings.peer_dependency_rules.ignores_missing(name))
    }

    fn accepts(&self, section: Section, consumer: &Manifest, name: &str, range: &str, found: &str) -> bool {
        if self.comparator.satisfies(found, range) {
            return true;
        }
        if section != Section::PeerDependencies {
            return false;
        }
        let rules = &self.settings.peer_dependency_rules;
        rules.allows_any(name)
            || rules
                .allowed_versions_for(&consumer.name, &consumer.version, name, self.comparator)
                .any(|allowed| self.comparator.satisfies(found, allowed))
    }

    /// Finish the run and hand over the report.
    pub fn finish(mut self) -> Report {
        self.report.set_visited(self.seen.len());
        self.report
    }
}

/// `npm:<name>@<range>` -> `<range>`; anything else is returned unchanged.
///
/// A bare alias (`npm:<name>`) accepts any version.
pub fn unwrap_alias(range: &str) -> &str {
    let Some(target) = range.strip_prefix(ALIAS_PROTOCOL) else {
        return range;
    };
    // Skip the first character so a scope's `@` is not taken as the separator.
    match target.get(1..).and_then(|rest| rest.find('@')) {
        Some(i) => &target[i + 2..],
        None => "*",
    }
}

/// Verify the tree rooted at `manifest_path` using the on-disk collaborators.
///
/// Development dependencies of the root manifest are checked.
pub fn verify(manifest_path: &Path, settings: &Settings) -> Result<Report> {
    let reader = JsonManifestReader;
    let locator = NodeModulesLocator;
    let comparator = NpmComparator::new();

    let mut walker = Walker::new(settings, &reader, &locator, &comparator);
    walker.traverse(manifest_path, true)?;
    Ok(walker.finish())
}
