//! Source pattern expansion.
//!
//! Patterns are absolute paths that may contain glob syntax. A literal
//! path that doesn't exist is kept, so the run fails with a clear
//! not-found error instead of silently versioning nothing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};

use crate::log;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Whether a pattern contains glob metacharacters.
pub fn is_glob(pattern: &Path) -> bool {
    pattern
        .to_string_lossy()
        .chars()
        .any(|c| matches!(c, '*' | '?' | '['))
}

/// Expand patterns into a sorted, de-duplicated list of files.
///
/// Source maps are never sources themselves; they travel with their asset.
/// Glob matches under `build_dir` are skipped so earlier output is never
/// versioned again.
pub fn expand(patterns: &[PathBuf], build_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        if !is_glob(pattern) {
            files.push(pattern.clone());
            continue;
        }

        let text = pattern.to_string_lossy();
        let before = files.len();
        for entry in glob::glob_with(&text, MATCH_OPTIONS)
            .with_context(|| format!("invalid glob pattern `{text}`"))?
        {
            let path = entry.with_context(|| format!("failed to expand `{text}`"))?;
            if path.is_file() && !is_source_map(&path) && !path.starts_with(build_dir) {
                files.push(path);
            }
        }

        if files.len() == before {
            log!("warning"; "no files match `{}`", text);
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn is_source_map(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "map")
}

/// Compiled patterns for matching watcher events against sources.
pub struct SourceMatcher {
    globs: Vec<Pattern>,
    literals: Vec<PathBuf>,
}

impl SourceMatcher {
    pub fn new(patterns: &[PathBuf]) -> Result<Self> {
        let mut globs = Vec::new();
        let mut literals = Vec::new();

        for pattern in patterns {
            if is_glob(pattern) {
                let text = pattern.to_string_lossy();
                globs.push(
                    Pattern::new(&text)
                        .with_context(|| format!("invalid glob pattern `{text}`"))?,
                );
            } else {
                literals.push(pattern.clone());
            }
        }

        Ok(Self { globs, literals })
    }

    pub fn matches(&self, path: &Path) -> bool {
        if is_source_map(path) {
            return false;
        }
        self.literals.iter().any(|l| l == path)
            || self
                .globs
                .iter()
                .any(|g| g.matches_path_with(path, MATCH_OPTIONS))
    }
}

/// Nearest existing directory above each pattern, for the watcher.
///
/// `/site/public/js/**/*.js` → `/site/public/js`. Nested roots collapse
/// into their parent since watches are recursive.
pub fn watch_roots(patterns: &[PathBuf]) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = patterns
        .iter()
        .filter_map(|pattern| {
            let literal: PathBuf = pattern
                .components()
                .take_while(|c| !is_glob(Path::new(c.as_os_str())))
                .collect();

            let mut dir = if is_glob(pattern) {
                literal
            } else {
                literal.parent()?.to_path_buf()
            };
            while !dir.is_dir() {
                dir = dir.parent()?.to_path_buf();
            }
            Some(dir)
        })
        .collect();

    roots.sort();
    roots.dedup();

    let mut collapsed: Vec<PathBuf> = Vec::with_capacity(roots.len());
    for root in roots {
        if !collapsed.iter().any(|kept| root.starts_with(kept)) {
            collapsed.push(root);
        }
    }
    collapsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, rel: &str) -> PathBuf {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "x").unwrap();
        path
    }

    #[test]
    fn test_is_glob() {
        assert!(is_glob(Path::new("/p/js/*.js")));
        assert!(is_glob(Path::new("/p/js/app?.js")));
        assert!(is_glob(Path::new("/p/[ab].js")));
        assert!(!is_glob(Path::new("/p/js/app.js")));
    }

    #[test]
    fn test_expand_globs_sorted_dedup() {
        let dir = TempDir::new().unwrap();
        let public = dir.path().join("public");
        let b = touch(&public, "js/b.js");
        let a = touch(&public, "js/a.js");
        touch(&public, "js/a.js.map");
        touch(&public, "js/nested/c.js");

        let files = expand(
            &[public.join("js/*.js"), public.join("js/a.js")],
            &public.join("build"),
        )
        .unwrap();
        assert_eq!(files, vec![a, b]);
    }

    #[test]
    fn test_expand_recursive() {
        let dir = TempDir::new().unwrap();
        let c = touch(dir.path(), "js/nested/c.js");
        let files = expand(&[dir.path().join("js/**/*.js")], &dir.path().join("build")).unwrap();
        assert_eq!(files, vec![c]);
    }

    #[test]
    fn test_expand_keeps_missing_literal() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.js");
        let files = expand(&[missing.clone()], &dir.path().join("build")).unwrap();
        assert_eq!(files, vec![missing]);
    }

    #[test]
    fn test_expand_skips_build_dir() {
        let dir = TempDir::new().unwrap();
        let app = touch(dir.path(), "js/app.js");
        touch(dir.path(), "build/js/app-0123456789.js");

        let files = expand(&[dir.path().join("**/*.js")], &dir.path().join("build")).unwrap();
        assert_eq!(files, vec![app]);
    }

    #[test]
    fn test_matcher() {
        let matcher = SourceMatcher::new(&[
            PathBuf::from("/site/public/js/*.js"),
            PathBuf::from("/site/public/css/app.css"),
        ])
        .unwrap();

        assert!(matcher.matches(Path::new("/site/public/js/app.js")));
        assert!(matcher.matches(Path::new("/site/public/css/app.css")));
        assert!(!matcher.matches(Path::new("/site/public/js/app.js.map")));
        assert!(!matcher.matches(Path::new("/site/public/js/deep/app.js")));
        assert!(!matcher.matches(Path::new("/site/public/css/other.css")));
    }

    #[test]
    fn test_watch_roots() {
        let dir = TempDir::new().unwrap();
        let public = dir.path().join("public");
        touch(&public, "js/app.js");
        touch(&public, "css/app.css");

        let roots = watch_roots(&[
            public.join("js/**/*.js"),
            public.join("css/app.css"),
            public.join("css/missing/deep.css"),
        ]);
        assert_eq!(roots, vec![public.join("css"), public.join("js")]);

        let roots = watch_roots(&[public.join("*.js"), public.join("js/app.js")]);
        assert_eq!(roots, vec![public.clone()]);
    }
}
