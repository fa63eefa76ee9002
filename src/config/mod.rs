//! Configuration management for `assetrev.toml`.
//!
//! The config file is optional; without one, everything comes from CLI
//! arguments and defaults.
//!
//! ```toml
//! [version]
//! public = "public"                     # public assets root
//! build = "public/build"                # build directory (default: <public>/build)
//! hash_length = 10                      # content hash length in filenames
//! sources = ["css/app.css", "js/*.js"]  # relative to `public`, globs allowed
//! ```
//!
//! Paths in the file are relative to the file's directory. Paths given on
//! the command line are relative to the current directory, except sources,
//! which (like in the file) are taken relative to `public` unless they
//! already point inside it.

mod error;
mod util;

pub use error::ConfigError;

use util::find_config_file;

use crate::asset::VersionOptions;
use crate::cli::{Cli, VersionArgs};
use crate::log;
use crate::utils::hash;
use crate::utils::path::absolutize;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name, matches the `--config` default.
pub const CONFIG_NAME: &str = "assetrev.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing assetrev.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RevConfig {
    /// Absolute path to the config file, if one was found (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Directory relative paths resolve against (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Absolute source patterns after prefixing (internal use only)
    #[serde(skip)]
    pub patterns: Vec<PathBuf>,

    /// `[version]` section
    pub version: VersionSection,
}

/// `[version]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionSection {
    /// Public assets root that sources live under.
    pub public: PathBuf,

    /// Build directory. Empty or unset means `<public>/build`.
    pub build: Option<PathBuf>,

    /// Content hash length in filenames.
    pub hash_length: usize,

    /// Files or glob patterns, relative to `public`.
    pub sources: Vec<PathBuf>,
}

impl Default for VersionSection {
    fn default() -> Self {
        Self {
            public: PathBuf::from("public"),
            build: None,
            hash_length: hash::DEFAULT_LEN,
            sources: Vec::new(),
        }
    }
}

impl RevConfig {
    /// Load configuration: file (if any), then CLI overrides, then validation.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config, &cwd) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path
                    .parent()
                    .map_or_else(|| cwd.clone(), Path::to_path_buf);
                config.config_path = Some(path);
                config
            }
            None if cli.config != Path::new(CONFIG_NAME) => {
                bail!("Config file '{}' not found", cli.config.display());
            }
            None => Self {
                root: cwd.clone(),
                ..Self::default()
            },
        };

        config.finalize(cli.version_args(), &cwd);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("in {}", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Resolve paths and apply CLI overrides.
    fn finalize(&mut self, args: &VersionArgs, cwd: &Path) {
        let version = &mut self.version;

        version.public = absolutize(&self.root.join(&version.public));
        version.build = version
            .build
            .take()
            .filter(|b| !b.as_os_str().is_empty())
            .map(|b| absolutize(&self.root.join(b)));

        if let Some(public) = &args.public {
            version.public = absolutize(&cwd.join(public));
        }
        if let Some(build) = &args.build {
            version.build = Some(absolutize(&cwd.join(build)));
        }
        if let Some(len) = args.hash_length {
            version.hash_length = len;
        }

        self.patterns = if args.sources.is_empty() {
            version
                .sources
                .iter()
                .map(|s| prefix_public(s, &self.root, &version.public))
                .collect()
        } else {
            args.sources
                .iter()
                .map(|s| prefix_public(s, cwd, &version.public))
                .collect()
        };
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let len = self.version.hash_length;
        if !(hash::MIN_LEN..=hash::MAX_LEN).contains(&len) {
            return Err(ConfigError::Validation(format!(
                "`version.hash_length` must be between {} and {}, got {}",
                hash::MIN_LEN,
                hash::MAX_LEN,
                len
            )));
        }

        if self.patterns.is_empty() {
            return Err(ConfigError::Validation(
                "no sources: pass SOURCE arguments or set `version.sources`".to_string(),
            ));
        }

        Ok(())
    }

    /// Versioner options derived from this config.
    pub fn options(&self) -> VersionOptions {
        let options =
            VersionOptions::new(&self.version.public).with_hash_length(self.version.hash_length);
        match &self.version.build {
            Some(build) => options.with_build_dir(build),
            None => options,
        }
    }
}

/// Root a source pattern under the public directory.
///
/// `js/app.js` and `public/js/app.js` (relative to `base`) both become
/// `<public>/js/app.js`. Absolute patterns are kept.
fn prefix_public(source: &Path, base: &Path, public: &Path) -> PathBuf {
    if source.is_absolute() {
        return absolutize(source);
    }

    let from_base = absolutize(&base.join(source));
    if from_base.starts_with(public) {
        return from_base;
    }

    absolutize(&public.join(source))
}

// ============================================================================
// tests
// ============================================================================
