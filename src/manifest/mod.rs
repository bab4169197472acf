//! Package manifest (`package.json`) model.
//!
//! Only the fields the walker needs are modeled. Every dependency section
//! keeps the order in which entries were declared in the file, which is
//! what makes the walker's report deterministic.

pub mod reader;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

pub use reader::{JsonManifestReader, ManifestReader};

/// File name of a package manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// A dependency section of a manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Section {
    #[serde(rename = "dependencies")]
    Dependencies,
    #[serde(rename = "peerDependencies")]
    PeerDependencies,
    #[serde(rename = "devDependencies")]
    DevDependencies,
}

impl Section {
    /// The key this section uses in `package.json`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Dependencies => "dependencies",
            Section::PeerDependencies => "peerDependencies",
            Section::DevDependencies => "devDependencies",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata attached to a peer dependency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeerDependencyMeta {
    /// The peer may be absent without being an error.
    pub optional: bool,
}

/// A parsed `package.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Package name; empty for unnamed (usually private root) manifests.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,

    /// Package version; empty when not declared.
    #[serde(default, deserialize_with = "lenient_string")]
    pub version: String,

    #[serde(default)]
    pub dependencies: Dependencies,

    #[serde(default)]
    pub dev_dependencies: Dependencies,

    #[serde(default)]
    pub peer_dependencies: Dependencies,

    #[serde(default, deserialize_with = "lenient_peer_meta")]
    pub peer_dependencies_meta: HashMap<String, PeerDependencyMeta>,
}

impl Manifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content.trim_start_matches('\u{feff}'))
    }

    /// The declarations for one section.
    pub fn section(&self, section: Section) -> &Dependencies {
        match section {
            Section::Dependencies => &self.dependencies,
            Section::PeerDependencies => &self.peer_dependencies,
            Section::DevDependencies => &self.dev_dependencies,
        }
    }

    /// Whether `peerDependenciesMeta` marks `name` as optional.
    pub fn is_optional_peer(&self, name: &str) -> bool {
        self.peer_dependencies_meta
            .get(name)
            .is_some_and(|meta| meta.optional)
    }
}

/// Ordered `name -> range` declarations of one section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependencies(Vec<(String, String)>);

impl Dependencies {
    /// Iterate declarations in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(name, range)| (name.as_str(), range.as_str()))
    }

    /// Range declared for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, range)| range.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn insert(&mut self, name: String, range: String) {
        // A repeated key keeps its first position and its last value.
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = range,
            None => self.0.push((name, range)),
        }
    }
}

impl<N: Into<String>, R: Into<String>> FromIterator<(N, R)> for Dependencies {
    fn from_iter<I: IntoIterator<Item = (N, R)>>(iter: I) -> Self {
        let mut deps = Dependencies::default();
        for (name, range) in iter {
            deps.insert(name.into(), range.into());
        }
        deps
    }
}

impl<'de> Deserialize<'de> for Dependencies {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DependenciesVisitor)
    }
}

struct DependenciesVisitor;

impl<'de> Visitor<'de> for DependenciesVisitor {
    type Value = Dependencies;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of package names to version ranges")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut deps = Dependencies::default();
        while let Some((name, value)) = map.next_entry::<String, Value>()? {
            // Non-string ranges cannot be checked.
            if let Value::String(range) = value {
                deps.insert(name, range);
            }
        }
        Ok(deps)
    }

    // Some very old packages declare dependencies as an array.
    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<de::IgnoredAny>()?.is_some() {}
        Ok(Dependencies::default())
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Dependencies::default())
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Dependencies::default())
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}

fn lenient_peer_meta<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<HashMap<String, PeerDependencyMeta>, D::Error> {
    let Value::Object(entries) = Value::deserialize(deserializer)? else {
        return Ok(HashMap::new());
    };
    Ok(entries
        .into_iter()
        .map(|(name, meta)| {
            let optional = meta
                .get("optional")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            (name, PeerDependencyMeta { optional })
        })
        .collect())
}
