//! Asset versioning for cache busting.
//!
//! Copies assets into the build directory under content-hashed names and
//! records the mapping in `rev-manifest.json`.
//!
//! Pipeline (each stage consumes the previous stage's output):
//!
//! ```text
//! resolve build dir
//!   → prune     delete files named by the previous manifest
//!   → copy      public/<rel> → build/<rel>
//!   → hash      build/<rel> → build/<stem>-<hash><ext>   (parallel)
//!   → manifest  write build/rev-manifest.json            (after all hashes)
//!   → maps      public/<rel>.map → build/<rel>.map
//!   → clean     delete public/<rel> and build/<rel>
//! ```
//!
//! The build directory is assumed to be owned by one run at a time.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rustc_hash::FxHashSet;

use super::error::{IoPathExt, VersionError};
use super::manifest::{MANIFEST_NAME, Manifest, is_contained};
use super::route::AssetRoute;
use crate::utils::fs::{copy_file, remove_file_force};
use crate::utils::hash;
use crate::utils::path::absolutize;
use crate::{debug, log};

/// Default build directory name under the public root.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Inputs that stay fixed across runs (watch mode reuses them).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionOptions {
    /// Public assets root that sources live under.
    pub public_dir: PathBuf,
    /// Build directory; `None` or empty means `<public_dir>/build`.
    pub build_dir: Option<PathBuf>,
    /// Fingerprint length in hex chars.
    pub hash_length: usize,
}

impl VersionOptions {
    pub fn new(public_dir: impl Into<PathBuf>) -> Self {
        Self {
            public_dir: public_dir.into(),
            build_dir: None,
            hash_length: hash::DEFAULT_LEN,
        }
    }

    pub fn with_build_dir(mut self, build_dir: impl Into<PathBuf>) -> Self {
        self.build_dir = Some(build_dir.into());
        self
    }

    pub fn with_hash_length(mut self, len: usize) -> Self {
        self.hash_length = len;
        self
    }

    /// Resolve the build directory, applying the default.
    pub fn resolve_build_dir(&self) -> PathBuf {
        match &self.build_dir {
            Some(dir) if !dir.as_os_str().is_empty() => dir.clone(),
            _ => self.public_dir.join(DEFAULT_BUILD_DIR),
        }
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default)]
pub struct VersionReport {
    /// Manifest as written.
    pub manifest: Manifest,
    /// Hashed files from the previous generation that were deleted.
    pub pruned: usize,
    /// Source maps moved into the build directory.
    pub maps: usize,
    /// Original and duplicate files deleted after versioning.
    pub cleaned: usize,
}

/// Versions a set of assets into a build directory.
#[derive(Debug, Clone)]
pub struct Versioner {
    public_dir: PathBuf,
    build_dir: PathBuf,
    hash_length: usize,
}

impl Versioner {
    pub fn new(options: &VersionOptions) -> Result<Self, VersionError> {
        let len = options.hash_length;
        if !(hash::MIN_LEN..=hash::MAX_LEN).contains(&len) {
            return Err(VersionError::InvalidHashLength(len));
        }

        Ok(Self {
            public_dir: absolutize(&options.public_dir),
            build_dir: absolutize(&options.resolve_build_dir()),
            hash_length: len,
        })
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.build_dir.join(MANIFEST_NAME)
    }

    /// Run the full pipeline over `sources`.
    ///
    /// Side effects of completed stages are not rolled back on failure.
    pub fn run(&self, sources: &[PathBuf]) -> Result<VersionReport, VersionError> {
        let routes = self.routes(sources)?;

        let pruned = self.prune_previous()?;
        self.materialize(&routes)?;
        let manifest = self.fingerprint(&routes)?;
        manifest.save(&self.manifest_path())?;

        // Only after the manifest is on disk
        let maps = self.propagate_maps(&routes)?;
        let cleaned = self.clean_originals(&routes, &manifest)?;

        Ok(VersionReport {
            manifest,
            pruned,
            maps,
            cleaned,
        })
    }

    /// Map and check every source before anything is touched.
    fn routes(&self, sources: &[PathBuf]) -> Result<Vec<AssetRoute>, VersionError> {
        if sources.is_empty() {
            return Err(VersionError::EmptySources);
        }

        let mut seen = FxHashSet::default();
        let mut routes = Vec::with_capacity(sources.len());
        for source in sources {
            let route = AssetRoute::new(source, &self.public_dir, &self.build_dir)?;
            if !seen.insert(route.relative.clone()) {
                continue;
            }

            let meta = fs::metadata(&route.source).at(&route.source)?;
            if !meta.is_file() {
                return Err(VersionError::io(
                    &route.source,
                    io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
                ));
            }
            routes.push(route);
        }
        Ok(routes)
    }

    /// Delete every hashed file listed in the previous manifest.
    fn prune_previous(&self) -> Result<usize, VersionError> {
        let Some(previous) = Manifest::load(&self.manifest_path())? else {
            return Ok(0);
        };

        let mut pruned = 0;
        for value in previous.values() {
            if !is_contained(value) {
                log!("warning"; "skipping manifest entry outside build dir: {}", value);
                continue;
            }

            let path = self.build_dir.join(value);
            if remove_file_force(&path).at(&path)? {
                debug!("version"; "pruned {}", value);
                pruned += 1;
            }
        }
        Ok(pruned)
    }

    /// Copy each source to the same relative path under the build directory.
    fn materialize(&self, routes: &[AssetRoute]) -> Result<(), VersionError> {
        for route in routes {
            if route.output == route.source {
                continue;
            }
            copy_file(&route.source, &route.output)
                .map_err(|e| VersionError::copy(&route.source, &route.output, e))?;
        }
        Ok(())
    }

    /// Hash each copy and write its hashed twin; returns the new manifest.
    ///
    /// Every file is processed; the first failure in source order is returned.
    fn fingerprint(&self, routes: &[AssetRoute]) -> Result<Manifest, VersionError> {
        let results: Vec<Result<(String, String), VersionError>> = routes
            .par_iter()
            .map(|route| {
                let file = File::open(&route.output).at(&route.output)?;
                let fp = hash::fingerprint_reader(BufReader::new(file), self.hash_length)
                    .at(&route.output)?;

                let hashed = route.hashed_output(&fp);
                copy_file(&route.output, &hashed)
                    .map_err(|e| VersionError::copy(&route.output, &hashed, e))?;

                let value = route.hashed_relative(&fp);
                debug!("version"; "{} -> {}", route.relative, value);
                Ok((route.relative.clone(), value))
            })
            .collect();

        results.into_iter().collect()
    }

    /// Move companion `.map` files into the build directory.
    fn propagate_maps(&self, routes: &[AssetRoute]) -> Result<usize, VersionError> {
        let mut moved = 0;
        for route in routes {
            let source = route.map_source();
            if !source.is_file() {
                continue;
            }

            let output = route.map_output();
            if output == source {
                continue;
            }

            copy_file(&source, &output).map_err(|e| VersionError::copy(&source, &output, e))?;
            remove_file_force(&source).at(&source)?;
            debug!("version"; "map {}.map", route.relative);
            moved += 1;
        }
        Ok(moved)
    }

    /// Delete originals and the unhashed copies left in the build directory.
    fn clean_originals(
        &self,
        routes: &[AssetRoute],
        manifest: &Manifest,
    ) -> Result<usize, VersionError> {
        let hashed: FxHashSet<PathBuf> = manifest
            .values()
            .map(|value| self.build_dir.join(value))
            .collect();

        let mut cleaned = 0;
        for route in routes {
            if !hashed.contains(&route.source)
                && remove_file_force(&route.source).at(&route.source)?
            {
                cleaned += 1;
            }

            if route.output != route.source
                && !hashed.contains(&route.output)
                && remove_file_force(&route.output).at(&route.output)?
            {
                cleaned += 1;
            }
        }
        Ok(cleaned)
    }
}
