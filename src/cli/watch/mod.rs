//! `watch` command: version once, then re-run whenever a source changes.
//!
//! ```text
//! Watcher → Debouncer (pure timing) → filter (sources only) → version run
//! ```
//!
//! The watcher starts before the initial run so no edit made during it is
//! lost. Runs delete their own sources and write into the build directory;
//! removals and anything under the build directory never trigger a run.

mod debouncer;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use notify::{RecursiveMode, Watcher};
use rustc_hash::FxHashMap;

use self::debouncer::{ChangeKind, Debouncer};
use super::sources::{self, SourceMatcher};
use super::version::version_sources;
use crate::asset::Versioner;
use crate::config::RevConfig;
use crate::logger::{status_detach, status_error, status_success};
use crate::utils::plural_count;
use crate::{debug, log};

/// Upper bound on a single wait, so Ctrl+C is noticed promptly.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

pub fn watch(config: &RevConfig) -> Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        ctrlc::set_handler(move || shutdown.store(true, Ordering::SeqCst))
            .map_err(|e| anyhow!("failed to set Ctrl+C handler: {}", e))?;
    }

    let versioner = Versioner::new(&config.options())?;
    let matcher = SourceMatcher::new(&config.patterns)?;

    let roots = sources::watch_roots(&config.patterns);
    if roots.is_empty() {
        return Err(anyhow!("nothing to watch: no source directory exists"));
    }

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        let _ = tx.send(res);
    })
    .context("failed to create file watcher")?;

    for root in &roots {
        watcher
            .watch(root, RecursiveMode::Recursive)
            .with_context(|| format!("failed to watch {}", root.display()))?;
        debug!("watch"; "watching {}", root.display());
    }

    let mut debouncer = Debouncer::new();
    run_once(&versioner, config);
    debouncer.mark_run();

    log!(
        "watch";
        "watching {} for changes (Ctrl+C to stop)",
        plural_count(roots.len(), "directory")
    );

    while !shutdown.load(Ordering::SeqCst) {
        match rx.recv_timeout(debouncer.sleep_duration().min(POLL_INTERVAL)) {
            Ok(Ok(event)) => debouncer.add_event(&event),
            Ok(Err(e)) => log!("watch"; "notify error: {}", e),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        let Some(changes) = debouncer.take_if_ready() else {
            continue;
        };

        let triggers = source_changes(changes, &matcher, versioner.build_dir());
        if triggers.is_empty() {
            continue;
        }

        for path in &triggers {
            debug!("watch"; "changed: {}", path.display());
        }
        status_detach();
        run_once(&versioner, config);
        debouncer.mark_run();
    }

    log!("watch"; "stopped");
    Ok(())
}

/// Expand sources and run, reporting the outcome without aborting the watch.
fn run_once(versioner: &Versioner, config: &RevConfig) {
    let result = sources::expand(&config.patterns, versioner.build_dir())
        .and_then(|sources| version_sources(versioner, &sources, &config.root));

    match result {
        Ok(report) => status_success(&format!(
            "versioned {}",
            plural_count(report.manifest.len(), "file")
        )),
        Err(e) => status_error("version failed", &format!("{e:#}")),
    }
}

/// Created/modified source files, excluding build output.
fn source_changes(
    changes: FxHashMap<PathBuf, ChangeKind>,
    matcher: &SourceMatcher,
    build_dir: &Path,
) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = changes
        .into_iter()
        .filter(|(_, kind)| *kind != ChangeKind::Removed)
        .map(|(path, _)| path)
        .filter(|path| !path.starts_with(build_dir) && matcher.matches(path))
        .collect();
    paths.sort();
    paths
}
