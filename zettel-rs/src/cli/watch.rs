//! Watch the vault and keep the task index current.

use crate::cache::{SnapshotSummary, TaskIndex};
use crate::cli::args::WatchArgs;
use crate::cli::output::Output;
use crate::error::{ExitCode, Result, ZettelError};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;
use tracing::{debug, warn};

/// A recursive file system watcher over a vault root.
pub struct VaultWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<Vec<PathBuf>>,
}

impl VaultWatcher {
    /// Start watching `root` recursively.
    pub fn start(root: &Path) -> Result<Self> {
        let (tx, rx) = mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |result: std::result::Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(e) => {
                        warn!(error = %e, "watch error");
                        return;
                    }
                };
                let paths = changed_paths(event);
                if !paths.is_empty() {
                    let _ = tx.send(paths);
                }
            },
            Config::default(),
        )?;

        watcher.watch(root, RecursiveMode::Recursive)?;
        Ok(VaultWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Block until something changes, then keep collecting until the
    /// vault has been quiet for `debounce`. `None` once the watcher stops.
    pub fn next_batch(&self, debounce: Duration) -> Option<Vec<PathBuf>> {
        let first = self.rx.recv().ok()?;
        let mut paths: BTreeSet<PathBuf> = first.into_iter().collect();
        while let Ok(more) = self.rx.recv_timeout(debounce) {
            paths.extend(more);
        }
        Some(paths.into_iter().collect())
    }
}

/// Paths touched by a create, modify or remove event.
///
/// Directories are kept: the index rebuilds when one is queued.
pub fn changed_paths(event: Event) -> Vec<PathBuf> {
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => event.paths,
        _ => Vec::new(),
    }
}

/// One line of watch output.
#[derive(Debug, Serialize)]
pub struct WatchUpdate {
    pub changed: usize,
    #[serde(flatten)]
    pub summary: SnapshotSummary,
}

/// Print a summary now and after every batch of changes. Runs until the
/// watcher stops or the index is closed.
pub fn watch(index: &TaskIndex, args: &WatchArgs, output: &Output) -> Result<ExitCode> {
    let watcher = VaultWatcher::start(index.vault().root())?;
    let debounce = Duration::from_millis(args.debounce_ms);

    let snapshot = index.acquire_snapshot()?;
    output.print(&WatchUpdate {
        changed: 0,
        summary: snapshot.summary(),
    })?;
    output.info(&format!(
        "Watching {} (Ctrl-C to stop)",
        index.vault().root().display()
    ));

    follow(index, std::iter::from_fn(|| watcher.next_batch(debounce)), output)
}

/// Feed batches of changed paths into the index, printing a summary after
/// each. A closed index ends cleanly; running out of batches means the
/// watcher died and is reported as a failure.
pub fn follow(
    index: &TaskIndex,
    batches: impl IntoIterator<Item = Vec<PathBuf>>,
    output: &Output,
) -> Result<ExitCode> {
    for paths in batches {
        debug!(count = paths.len(), "changes detected");
        for path in &paths {
            index.queue_update(path);
        }

        match index.acquire_snapshot() {
            Ok(snapshot) => output.print(&WatchUpdate {
                changed: paths.len(),
                summary: snapshot.summary(),
            })?,
            Err(ZettelError::Closed) => return Ok(ExitCode::Success),
            // Paths stay queued; the next batch retries them
            Err(e) => output.warn(&e.to_string()),
        }
    }

    output.warn("file watcher stopped");
    Ok(ExitCode::GeneralError)
}
