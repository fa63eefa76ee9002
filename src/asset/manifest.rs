//! `rev-manifest.json`: original path → hashed path.
//!
//! ```json
//! {
//!   "css/app.css": "css/app-5f1e2a9c0b.css",
//!   "js/app.js": "js/app-1a2b3c4d5e.js"
//! }
//! ```
//!
//! Keys and values are relative to the public root and the build directory
//! respectively, `/`-separated, without a leading slash. Keys are written
//! sorted so the file diffs cleanly between runs.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use super::error::{IoPathExt, VersionError};
use crate::utils::fs::write_file;

/// Manifest file name, placed directly under the build directory.
pub const MANIFEST_NAME: &str = "rev-manifest.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(BTreeMap<String, String>);

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a manifest, or `None` if the file does not exist.
    ///
    /// Unparseable content is an error; nothing gets deleted on a guess.
    pub fn load(path: &Path) -> Result<Option<Self>, VersionError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(VersionError::io(path, e)),
        };

        Self::parse(&content)
            .map(Some)
            .map_err(|source| VersionError::ManifestParse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Parse manifest JSON.
    pub fn parse(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Write the manifest as pretty JSON, overwriting any previous file.
    pub fn save(&self, path: &Path) -> Result<(), VersionError> {
        let mut json = serde_json::to_string_pretty(self).map_err(|e| {
            VersionError::io(path, io::Error::new(io::ErrorKind::InvalidData, e))
        })?;
        json.push('\n');
        write_file(path, json).at(path)
    }

    pub fn insert(&mut self, original: String, hashed: String) -> Option<String> {
        self.0.insert(original, hashed)
    }

    pub fn get(&self, original: &str) -> Option<&str> {
        self.0.get(original).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Whether a manifest value stays inside the build directory when joined.
///
/// Rejects absolute paths, drive prefixes and `..` components.
pub fn is_contained(value: &str) -> bool {
    !value.is_empty()
        && Path::new(value)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing() {
        let dir = TempDir::new().unwrap();
        let loaded = Manifest::load(&dir.path().join(MANIFEST_NAME)).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_save_sorted_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("build").join(MANIFEST_NAME);

        let mut manifest = Manifest::new();
        manifest.insert("js/app.js".into(), "js/app-bbb.js".into());
        manifest.insert("css/app.css".into(), "css/app-aaa.css".into());
        manifest.save(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.ends_with('\n'));
        let css = content.find("css/app.css").unwrap();
        let js = content.find("js/app.js").unwrap();
        assert!(css < js, "keys should be sorted: {content}");

        let loaded = Manifest::load(&path).unwrap().unwrap();
        assert_eq!(loaded, manifest);
        assert_eq!(loaded.get("js/app.js"), Some("js/app-bbb.js"));
    }

    #[test]
    fn test_load_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(MANIFEST_NAME);

        fs::write(&path, "{ not json").unwrap();
        let err = Manifest::load(&path).unwrap_err();
        assert!(matches!(err, VersionError::ManifestParse { .. }));

        // Valid JSON but not a flat string map
        fs::write(&path, r#"{"app.js": {"nested": true}}"#).unwrap();
        let err = Manifest::load(&path).unwrap_err();
        assert!(matches!(err, VersionError::ManifestParse { .. }));
    }

    #[test]
    fn test_is_contained() {
        assert!(is_contained("app-abc.js"));
        assert!(is_contained("js/app-abc.js"));
        assert!(!is_contained(""));
        assert!(!is_contained("../secrets.txt"));
        assert!(!is_contained("js/../../etc/passwd"));
        assert!(!is_contained("/etc/passwd"));
    }
}
