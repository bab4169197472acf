//! Loading manifests from disk.

use std::fs;
use std::path::Path;

use super::Manifest;
use crate::error::{InstallCheckError, Result};

/// Source of parsed manifests.
///
/// The walker only ever talks to this trait, which lets tests feed it
/// in-memory trees.
pub trait ManifestReader {
    /// Load the manifest at `path`.
    fn load(&self, path: &Path) -> Result<Manifest>;
}

/// Reads `package.json` files from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonManifestReader;

impl ManifestReader for JsonManifestReader {
    fn load(&self, path: &Path) -> Result<Manifest> {
        let content = fs::read_to_string(path).map_err(|source| InstallCheckError::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;

        Manifest::from_json(&content).map_err(|e| InstallCheckError::ManifestParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
