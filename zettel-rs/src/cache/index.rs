//! The task index service.

use super::types::{IndexState, IndexStatus, Snapshot, TaskCache};
use crate::config::IndexConfig;
use crate::error::{Ceiling, Result, ZettelError};
use crate::parser::Parser;
use crate::sys::{FileKind, FileSystem};
use crate::types::Task;
use crate::vault::{has_hidden_component, is_markdown, Vault};
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// In-memory index of every task in a vault.
///
/// Built lazily by the first [`TaskIndex::acquire_snapshot`], then patched
/// from paths queued with [`TaskIndex::queue_update`]. Safe to share across
/// threads behind an `Arc`.
pub struct TaskIndex {
    vault: Vault,
    parser: Parser,
    fs: Arc<dyn FileSystem>,
    limits: IndexConfig,
    /// Serializes rebuilds and merges. Held without `inner` while parsing.
    refresh: Mutex<()>,
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    cache: Option<TaskCache>,
    /// Vault-relative paths awaiting re-examination.
    pending: BTreeSet<PathBuf>,
    closed: bool,
    generation: u64,
}

/// What a queued path turned out to need.
enum Change {
    Update(Vec<Task>),
    Remove,
    Rebuild,
}

impl std::fmt::Debug for TaskIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskIndex")
            .field("vault", &self.vault)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl TaskIndex {
    /// Index over `vault`, reading files through the parser's file system.
    pub fn new(vault: Vault, parser: Parser, limits: IndexConfig) -> Self {
        let fs = parser.file_system().clone();
        Self {
            vault,
            parser,
            fs,
            limits,
            refresh: Mutex::new(()),
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Index over the vault at `root` with the real file system and clock.
    pub fn open(root: impl Into<PathBuf>, limits: IndexConfig) -> Result<Self> {
        Ok(Self::new(Vault::new(root)?, Parser::new(), limits))
    }

    pub fn vault(&self) -> &Vault {
        &self.vault
    }

    pub fn limits(&self) -> IndexConfig {
        self.limits
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bring the index up to date and return a copy of it.
    ///
    /// Builds the index on first use and applies queued updates otherwise.
    /// On failure nothing is committed and the previous state stays intact.
    pub fn acquire_snapshot(&self) -> Result<Snapshot> {
        {
            let _refresh = self.refresh.lock().unwrap_or_else(PoisonError::into_inner);
            self.ensure_fresh()?;
        }

        let inner = self.read();
        if inner.closed {
            return Err(ZettelError::Closed);
        }
        let cache = inner.cache.as_ref().ok_or(ZettelError::Unavailable)?;
        Ok(cache.snapshot(self.vault.root(), inner.generation))
    }

    /// Mark a path as changed. It is re-examined by the next snapshot.
    ///
    /// Takes vault-relative paths, or absolute paths inside the vault. Empty
    /// paths, paths outside the vault and hidden paths are ignored, as is
    /// everything once the index is closed.
    pub fn queue_update(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let path = path.to_str().map_or(path, |s| Path::new(s.trim()));
        if path.as_os_str().is_empty() {
            return;
        }

        let Some(relative) = self.vault.relativize(path) else {
            debug!(path = %path.display(), "ignoring update outside vault");
            return;
        };
        if has_hidden_component(&relative) {
            return;
        }
        let relative = if relative.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            relative
        };

        let mut inner = self.write();
        if !inner.closed {
            inner.pending.insert(relative);
        }
    }

    /// Drop the index and everything queued. Further snapshots fail with
    /// [`ZettelError::Closed`]. Calling it again is harmless.
    pub fn close(&self) -> Result<()> {
        let mut inner = self.write();
        if !inner.closed {
            inner.closed = true;
            inner.cache = None;
            inner.pending.clear();
            info!(vault = %self.vault.root().display(), "closed task index");
        }
        Ok(())
    }

    /// Forget the current index so the next snapshot rebuilds from disk.
    pub fn invalidate(&self) -> Result<()> {
        let _refresh = self.refresh.lock().unwrap_or_else(PoisonError::into_inner);
        let mut inner = self.write();
        if inner.closed {
            return Err(ZettelError::Closed);
        }
        inner.cache = None;
        inner.pending.clear();
        Ok(())
    }

    pub fn status(&self) -> IndexStatus {
        let inner = self.read();
        let state = if inner.closed {
            IndexState::Closed
        } else if inner.cache.is_none() {
            IndexState::Uninitialized
        } else if !inner.pending.is_empty() {
            IndexState::Dirty
        } else {
            IndexState::Fresh
        };

        IndexStatus {
            vault: self.vault.root().to_path_buf(),
            state,
            tasks: inner.cache.as_ref().map_or(0, TaskCache::task_count),
            notes: inner.cache.as_ref().map_or(0, TaskCache::note_count),
            pending: inner.pending.len(),
            max_tasks: self.limits.max_tasks,
            max_notes: self.limits.max_notes,
        }
    }

    /// Caller holds `refresh`.
    fn ensure_fresh(&self) -> Result<()> {
        let (batch, needs_rebuild) = {
            let mut inner = self.write();
            if inner.closed {
                return Err(ZettelError::Closed);
            }
            (std::mem::take(&mut inner.pending), inner.cache.is_none())
        };

        // A rebuild reads every note, so the drained batch is covered.
        if needs_rebuild {
            return self.rebuild();
        }
        if batch.is_empty() {
            return Ok(());
        }

        self.apply_pending(&batch).inspect_err(|_| self.requeue(batch))
    }

    fn requeue(&self, batch: BTreeSet<PathBuf>) {
        let mut inner = self.write();
        if !inner.closed {
            inner.pending.extend(batch);
        }
    }

    fn rebuild(&self) -> Result<()> {
        let output = self.parser.walk_tree(self.vault.root())?;
        let cache = TaskCache::from_tasks(output.tasks);
        self.check_limits(cache.task_count(), cache.note_count())?;

        let mut inner = self.write();
        if inner.closed {
            return Err(ZettelError::Closed);
        }
        info!(
            vault = %self.vault.root().display(),
            tasks = cache.task_count(),
            notes = cache.note_count(),
            "rebuilt task index"
        );
        inner.cache = Some(cache);
        inner.generation += 1;
        Ok(())
    }

    fn apply_pending(&self, batch: &BTreeSet<PathBuf>) -> Result<()> {
        let mut changes: BTreeMap<PathBuf, Vec<Task>> = BTreeMap::new();

        for relative in batch {
            let path = self.vault.resolve(relative);
            match self.examine(&path)? {
                Change::Rebuild => {
                    debug!(path = %path.display(), "directory queued, rebuilding");
                    return self.rebuild();
                }
                Change::Remove => {
                    // A directory moved out of the vault shows up as one
                    // missing path; drop every note cached beneath it.
                    for stale in self.cached_notes_under(&path) {
                        changes.insert(stale, Vec::new());
                    }
                    changes.insert(path, Vec::new());
                }
                Change::Update(tasks) => {
                    changes.insert(path, tasks);
                }
            }
        }

        let mut guard = self.write();
        let inner = &mut *guard;
        if inner.closed {
            return Err(ZettelError::Closed);
        }
        let cache = inner.cache.as_mut().ok_or(ZettelError::Unavailable)?;

        let (tasks, notes) = cache.project(&changes);
        self.check_limits(tasks, notes)?;

        let paths = changes.len();
        cache.apply(changes);
        inner.generation += 1;
        info!(paths, tasks, notes, "merged queued updates");
        Ok(())
    }

    fn cached_notes_under(&self, dir: &Path) -> Vec<PathBuf> {
        self.read()
            .cache
            .as_ref()
            .map(|cache| cache.notes_under(dir))
            .unwrap_or_default()
    }

    fn examine(&self, path: &Path) -> Result<Change> {
        let kind = match self.fs.stat(path) {
            Ok(kind) => kind,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Change::Remove),
            Err(e) => return Err(ZettelError::io(path, e)),
        };

        match kind {
            FileKind::Dir => Ok(Change::Rebuild),
            FileKind::File if is_markdown(path) => match self.parser.parse(path) {
                Ok(output) => Ok(Change::Update(output.tasks)),
                Err(ZettelError::NotFound(_)) => Ok(Change::Remove),
                Err(e) => Err(e),
            },
            _ => Ok(Change::Remove),
        }
    }

    fn check_limits(&self, tasks: usize, notes: usize) -> Result<()> {
        if tasks > self.limits.max_tasks {
            return Err(ZettelError::CapacityExceeded {
                what: Ceiling::Tasks,
                limit: self.limits.max_tasks,
                actual: tasks,
            });
        }
        if notes > self.limits.max_notes {
            return Err(ZettelError::CapacityExceeded {
                what: Ceiling::Notes,
                limit: self.limits.max_notes,
                actual: notes,
            });
        }
        Ok(())
    }
}

/// Snapshot from an index handle that may never have been constructed.
pub fn snapshot_of(index: Option<&TaskIndex>) -> Result<Snapshot> {
    index.ok_or(ZettelError::Unavailable)?.acquire_snapshot()
}
