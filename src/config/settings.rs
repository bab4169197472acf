//! Verification settings read from the workspace root.
//!
//! pnpm lets a workspace relax peer dependency checks through
//! `peerDependencyRules`, either under the `pnpm` field of the root
//! `package.json` or at the top level of `pnpm-workspace.yaml`. Both are
//! honored and merged.

use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use super::workspace::PNPM_WORKSPACE_FILE;
use crate::error::{InstallCheckError, Result};
use crate::manifest::{Dependencies, MANIFEST_FILE};
use crate::version::VersionComparator;

/// Packages that are never reported as missing.
///
/// These are build tools commonly declared as peers by plugins and
/// provided by the surrounding toolchain rather than `node_modules`.
pub const DEFAULT_IGNORE: &[&str] = &["webpack"];

/// Settings for one verification run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Names skipped when they cannot be resolved, in any section.
    pub ignore: Vec<String>,
    /// pnpm `peerDependencyRules`.
    pub peer_dependency_rules: PeerDependencyRules,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ignore: DEFAULT_IGNORE.iter().map(|s| s.to_string()).collect(),
            peer_dependency_rules: PeerDependencyRules::default(),
        }
    }
}

impl Settings {
    /// Load settings from the workspace root at `root`.
    ///
    /// Missing files yield defaults; malformed ones are errors.
    pub fn load(root: &Path) -> Result<Self> {
        let mut settings = Settings::default();

        let manifest_path = root.join(MANIFEST_FILE);
        if manifest_path.is_file() {
            let content = fs::read_to_string(&manifest_path)
                .with_context(|| format!("Failed to read {}", manifest_path.display()))?;
            let manifest: RootManifest =
                serde_json::from_str(content.trim_start_matches('\u{feff}')).map_err(|e| {
                    InstallCheckError::ConfigParse {
                        path: manifest_path.clone(),
                        message: e.to_string(),
                    }
                })?;
            if let Some(rules) = manifest.pnpm.and_then(|p| p.peer_dependency_rules) {
                settings.peer_dependency_rules.merge(rules);
            }
        }

        let workspace_path = root.join(PNPM_WORKSPACE_FILE);
        if workspace_path.is_file() {
            let content = fs::read_to_string(&workspace_path)
                .with_context(|| format!("Failed to read {}", workspace_path.display()))?;
            if !content.trim().is_empty() {
                let workspace: Option<PnpmSettings> = serde_yaml::from_str(&content).map_err(|e| {
                    InstallCheckError::ConfigParse {
                        path: workspace_path.clone(),
                        message: e.to_string(),
                    }
                })?;
                if let Some(rules) = workspace.and_then(|w| w.peer_dependency_rules) {
                    settings.peer_dependency_rules.merge(rules);
                }
            }
        }

        tracing::debug!("Loaded settings: {:?}", settings);
        Ok(settings)
    }

    /// Whether an unresolved `name` should be skipped silently.
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignore.iter().any(|i| i == name)
    }
}

/// pnpm `peerDependencyRules`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerDependencyRules {
    /// Peers that may be missing. Entries may contain `*` wildcards.
    #[serde(default)]
    pub ignore_missing: Vec<String>,

    /// Peers whose installed version is accepted whatever it is.
    #[serde(default)]
    pub allow_any: Vec<String>,

    /// Extra accepted ranges, keyed by `name` or `consumer>name`.
    #[serde(default)]
    pub allowed_versions: Dependencies,
}

impl PeerDependencyRules {
    /// Append another rule set to this one.
    pub fn merge(&mut self, other: PeerDependencyRules) {
        self.ignore_missing.extend(other.ignore_missing);
        self.allow_any.extend(other.allow_any);
        self.allowed_versions = self
            .allowed_versions
            .iter()
            .chain(other.allowed_versions.iter())
            .collect();
    }

    pub fn ignores_missing(&self, name: &str) -> bool {
        self.ignore_missing.iter().any(|p| name_matches(p, name))
    }

    pub fn allows_any(&self, name: &str) -> bool {
        self.allow_any.iter().any(|p| name_matches(p, name))
    }

    /// Ranges accepted for `name` when required by `consumer` at
    /// `consumer_version`.
    ///
    /// Keys are `name` or `parent>name`, where `parent` may carry a range
    /// (`button@2>react`) that the consumer's version must satisfy.
    pub fn allowed_versions_for<'a>(
        &'a self,
        consumer: &'a str,
        consumer_version: &'a str,
        name: &'a str,
        comparator: &'a dyn VersionComparator,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.allowed_versions
            .iter()
            .filter(move |&(key, _)| match key.split_once('>') {
                Some((parent, dep)) => {
                    dep == name && parent_matches(parent, consumer, consumer_version, comparator)
                }
                None => key == name,
            })
            .map(|(_, range)| range)
    }
}

#[derive(Debug, Default, Deserialize)]
struct RootManifest {
    #[serde(default)]
    pnpm: Option<PnpmSettings>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PnpmSettings {
    #[serde(default)]
    peer_dependency_rules: Option<PeerDependencyRules>,
}

fn name_matches(pattern: &str, name: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == name;
    }
    match glob::Pattern::new(pattern) {
        Ok(p) => p.matches(name),
        Err(e) => {
            tracing::warn!("Ignoring invalid pattern '{}': {}", pattern, e);
            false
        }
    }
}

fn parent_matches(
    selector: &str,
    consumer: &str,
    consumer_version: &str,
    comparator: &dyn VersionComparator,
) -> bool {
    let (parent, range) = split_selector(selector);
    if parent != consumer {
        return false;
    }
    match range {
        Some(range) => comparator.satisfies(consumer_version, range),
        None => true,
    }
}

/// `button@2` -> (`button`, `2`), `@scope/x` -> (`@scope/x`, none).
fn split_selector(selector: &str) -> (&str, Option<&str>) {
    match selector.get(1..).and_then(|rest| rest.find('@')) {
        Some(i) => (&selector[..i + 1], Some(&selector[i + 2..])),
        None => (selector, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::NpmComparator;
    use tempfile::TempDir;

    #[test]
    fn defaults_ignore_webpack() {
        let settings = Settings::default();
        assert!(settings.is_ignored("webpack"));
        assert!(!settings.is_ignored("react"));
        assert_eq!(settings.peer_dependency_rules, PeerDependencyRules::default());
    }

    #[test]
    fn load_without_files_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let settings = Settings::load(temp.path()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn load_reads_package_json_pnpm_field() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(MANIFEST_FILE),
            r#"{
                "name": "root",
                "pnpm": {
                    "peerDependencyRules": {
                        "ignoreMissing": ["eslint"],
                        "allowAny": ["react"],
                        "allowedVersions": { "vue": "3" }
                    }
                }
            }"#,
        )
        .unwrap();

        let settings = Settings::load(temp.path()).unwrap();
        let rules = &settings.peer_dependency_rules;
        assert!(rules.ignores_missing("eslint"));
        assert!(rules.allows_any("react"));
        let cmp = NpmComparator::new();
        assert_eq!(
            rules.allowed_versions_for("x", "1.0.0", "vue", &cmp).collect::<Vec<_>>(),
            vec!["3"]
        );
    }

    #[test]
    fn load_merges_pnpm_workspace_yaml() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(MANIFEST_FILE),
            r#"{ "pnpm": { "peerDependencyRules": { "ignoreMissing": ["a"] } } }"#,
        )
        .unwrap();
        fs::write(
            temp.path().join(PNPM_WORKSPACE_FILE),
            "packages:\n  - 'packages/*'\npeerDependencyRules:\n  ignoreMissing:\n    - b\n",
        )
        .unwrap();

        let settings = Settings::load(temp.path()).unwrap();
        assert_eq!(settings.peer_dependency_rules.ignore_missing, vec!["a", "b"]);
    }

    #[test]
    fn empty_workspace_yaml_is_fine() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(PNPM_WORKSPACE_FILE), "").unwrap();
        assert!(Settings::load(temp.path()).is_ok());
    }

    #[test]
    fn malformed_settings_are_config_errors() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(MANIFEST_FILE),
            r#"{ "pnpm": { "peerDependencyRules": { "ignoreMissing": "eslint" } } }"#,
        )
        .unwrap();

        let err = Settings::load(temp.path()).unwrap_err();
        assert!(matches!(err, InstallCheckError::ConfigParse { .. }));
    }

    #[test]
    fn ignore_missing_supports_wildcards() {
        let rules = PeerDependencyRules {
            ignore_missing: vec!["@babel/*".into()],
            ..Default::default()
        };
        assert!(rules.ignores_missing("@babel/core"));
        assert!(!rules.ignores_missing("@types/node"));
    }

    #[test]
    fn allowed_versions_scoped_to_consumer() {
        let rules = PeerDependencyRules {
            allowed_versions: [("button@2>react", "17"), ("@scope/ui>react", "16")]
                .into_iter()
                .collect(),
            ..Default::default()
        };
        let cmp = NpmComparator::new();
        assert_eq!(
            rules
                .allowed_versions_for("button", "2.1.0", "react", &cmp)
                .collect::<Vec<_>>(),
            vec!["17"]
        );
        assert_eq!(
            rules
                .allowed_versions_for("@scope/ui", "0.1.0", "react", &cmp)
                .collect::<Vec<_>>(),
            vec!["16"]
        );
        assert_eq!(rules.allowed_versions_for("other", "2.0.0", "react", &cmp).count(), 0);
    }

    #[test]
    fn allowed_versions_parent_range_checks_consumer_version() {
        let rules = PeerDependencyRules {
            allowed_versions: [("button@2>react", "17")].into_iter().collect(),
            ..Default::default()
        };
        let cmp = NpmComparator::new();
        assert_eq!(rules.allowed_versions_for("button", "1.4.0", "react", &cmp).count(), 0);
        assert_eq!(rules.allowed_versions_for("button", "", "react", &cmp).count(), 0);
    }

    #[test]
    fn split_selector_handles_scopes() {
        assert_eq!(split_selector("button@2"), ("button", Some("2")));
        assert_eq!(split_selector("@scope/x@^1.2"), ("@scope/x", Some("^1.2")));
        assert_eq!(split_selector("@scope/x"), ("@scope/x", None));
        assert_eq!(split_selector("plain"), ("plain", None));
    }

    #[test]
    fn unreadable_settings_file_reports_path() {
        let temp = TempDir::new().unwrap();
        let workspace = temp.path().join(PNPM_WORKSPACE_FILE);
        fs::write(&workspace, [0xff, 0xfe, 0x00, 0x80]).unwrap();

        let err = Settings::load(temp.path()).unwrap_err();
        assert!(matches!(err, InstallCheckError::Other(_)));
        assert!(err.to_string().contains(PNPM_WORKSPACE_FILE));
    }
}
