//! Asset route: source → build directory mapping.
//!
//! Paths are remapped by stripping the public root and joining the
//! remainder onto the build directory, so a `public` segment appearing
//! deeper in a path is left alone.
//!
//! ```text
//! public/js/app.js      → relative "js/app.js"
//!                       → output   public/build/js/app.js
//!                       → hashed   public/build/js/app-1a2b3c4d5e.js
//! public/js/app.js.map  → public/build/js/app.js.map
//! ```

use std::path::{Path, PathBuf};

use crate::utils::path::{absolutize, to_posix};

use super::error::VersionError;

/// Route information for a single versioned asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRoute {
    /// Source file path (absolute)
    pub source: PathBuf,
    /// Path under the public root, `/`-separated (manifest key)
    pub relative: String,
    /// Unhashed copy inside the build directory (absolute)
    pub output: PathBuf,
    /// Build directory the route was computed against (absolute)
    build_dir: PathBuf,
}

impl AssetRoute {
    /// Map `source` from `public_dir` into `build_dir`.
    ///
    /// Fails if `source` is not strictly inside `public_dir`, or if its
    /// relative path is not valid UTF-8.
    pub fn new(source: &Path, public_dir: &Path, build_dir: &Path) -> Result<Self, VersionError> {
        let source = absolutize(source);
        let public_dir = absolutize(public_dir);
        let build_dir = absolutize(build_dir);

        let rel = source
            .strip_prefix(&public_dir)
            .ok()
            .filter(|rel| !rel.as_os_str().is_empty())
            .ok_or_else(|| VersionError::OutsideRoot {
                path: source.clone(),
                root: public_dir.clone(),
            })?;

        let relative = to_posix(rel).ok_or_else(|| VersionError::NonUtf8Path {
            path: source.clone(),
        })?;
        let output = build_dir.join(rel);

        Ok(Self {
            source,
            relative,
            output,
            build_dir,
        })
    }

    /// Manifest value for a given fingerprint.
    pub fn hashed_relative(&self, hash: &str) -> String {
        hashed_name(&self.relative, hash)
    }

    /// Hashed copy inside the build directory.
    pub fn hashed_output(&self, hash: &str) -> PathBuf {
        self.build_dir.join(self.hashed_relative(hash))
    }

    /// Companion source map next to the source file.
    pub fn map_source(&self) -> PathBuf {
        with_map_suffix(&self.source)
    }

    /// Where the companion source map lands in the build directory.
    pub fn map_output(&self) -> PathBuf {
        with_map_suffix(&self.output)
    }
}

/// Insert `-<hash>` before the last extension of a `/`-separated path.
///
/// `js/app.js` → `js/app-<hash>.js`, `app.min.js` → `app.min-<hash>.js`,
/// `LICENSE` → `LICENSE-<hash>`. Dotfiles like `.htaccess` have no extension.
pub fn hashed_name(relative: &str, hash: &str) -> String {
    let (dir, file) = match relative.rfind('/') {
        Some(i) => relative.split_at(i + 1),
        None => ("", relative),
    };

    match file.rfind('.') {
        Some(i) if i > 0 => {
            let (stem, ext) = file.split_at(i);
            format!("{dir}{stem}-{hash}{ext}")
        }
        _ => format!("{dir}{file}-{hash}"),
    }
}

fn with_map_suffix(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_os_string();
    os.push(".map");
    PathBuf::from(os)
}
