//! `version` command: one versioning run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::sources;
use crate::asset::{VersionReport, Versioner};
use crate::config::RevConfig;
use crate::logger::log_task;
use crate::utils::plural_count;
use crate::{debug, log};

/// Expand sources and run the versioner once.
pub fn run_version(config: &RevConfig) -> Result<VersionReport> {
    let versioner = Versioner::new(&config.options())?;
    let sources = sources::expand(&config.patterns, versioner.build_dir())?;
    version_sources(&versioner, &sources, &config.root)
}

/// Run an already-configured versioner over expanded sources.
pub fn version_sources(
    versioner: &Versioner,
    sources: &[PathBuf],
    root: &Path,
) -> Result<VersionReport> {
    let display: Vec<&Path> = sources
        .iter()
        .map(|s| s.strip_prefix(root).unwrap_or(s.as_path()))
        .collect();
    log_task("Versioning", &display);

    let report = versioner
        .run(sources)
        .with_context(|| format!("versioning into {} failed", versioner.build_dir().display()))?;

    debug!(
        "version";
        "pruned {}, cleaned {}",
        plural_count(report.pruned, "stale file"),
        plural_count(report.cleaned, "file")
    );

    let manifest = versioner.manifest_path();
    log!(
        "version";
        "{} versioned, {} moved, manifest: {}",
        plural_count(report.manifest.len(), "file"),
        plural_count(report.maps, "source map"),
        manifest.strip_prefix(root).unwrap_or(manifest.as_path()).display()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::VersionOptions;
    use crate::asset::manifest::MANIFEST_NAME;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_run_version_with_globs() {
        let dir = TempDir::new().unwrap();
        let public = dir.path().join("public");
        fs::create_dir_all(public.join("js")).unwrap();
        fs::write(public.join("js/a.js"), "a").unwrap();
        fs::write(public.join("js/b.js"), "b").unwrap();

        let config = RevConfig {
            root: dir.path().to_path_buf(),
            patterns: vec![public.join("js/*.js")],
            version: crate::config::VersionSection {
                public: public.clone(),
                ..Default::default()
            },
            ..Default::default()
        };

        let report = run_version(&config).unwrap();
        assert_eq!(report.manifest.len(), 2);
        assert!(public.join("build").join(MANIFEST_NAME).is_file());
        assert!(!public.join("js/a.js").exists());
    }

    #[test]
    fn test_version_sources_error_context() {
        let dir = TempDir::new().unwrap();
        let public = dir.path().join("public");
        let versioner = Versioner::new(&VersionOptions::new(&public)).unwrap();

        let err = version_sources(&versioner, &[public.join("missing.js")], dir.path())
            .unwrap_err();
        assert!(format!("{err:#}").contains("missing.js"));
    }
}
