//! Task index data structures.

use crate::types::{Task, TaskCounts};
use crate::vault::clean_path;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Lifecycle state of the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexState {
    /// No snapshot taken yet, or invalidated.
    Uninitialized,
    Fresh,
    /// Updates are queued.
    Dirty,
    Closed,
}

impl std::fmt::Display for IndexState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IndexState::Uninitialized => "uninitialized",
            IndexState::Fresh => "fresh",
            IndexState::Dirty => "dirty",
            IndexState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Index status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStatus {
    pub vault: PathBuf,
    pub state: IndexState,
    /// Tasks held by the cache.
    pub tasks: usize,
    /// Notes with at least one task.
    pub notes: usize,
    /// Queued paths not yet applied.
    pub pending: usize,
    pub max_tasks: usize,
    pub max_notes: usize,
}

/// Per-note task lists with running totals.
#[derive(Debug, Clone, Default)]
pub(crate) struct TaskCache {
    /// Only notes with at least one task. Each list is in snapshot order.
    by_path: HashMap<PathBuf, Vec<Task>>,
    total_tasks: usize,
}

impl TaskCache {
    /// Bucket parsed tasks by note.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut by_path: HashMap<PathBuf, Vec<Task>> = HashMap::new();
        let total_tasks = tasks.len();
        for task in tasks {
            by_path.entry(task.path.clone()).or_default().push(task);
        }
        for list in by_path.values_mut() {
            list.sort_by(Task::snapshot_cmp);
        }
        Self {
            by_path,
            total_tasks,
        }
    }

    pub fn task_count(&self) -> usize {
        self.total_tasks
    }

    pub fn note_count(&self) -> usize {
        self.by_path.len()
    }

    /// Cached notes strictly inside directory `dir`.
    pub fn notes_under(&self, dir: &Path) -> Vec<PathBuf> {
        self.by_path
            .keys()
            .filter(|path| *path != dir && path.starts_with(dir))
            .cloned()
            .collect()
    }

    fn tasks_in(&self, path: &Path) -> usize {
        self.by_path.get(path).map_or(0, Vec::len)
    }

    /// Task and note totals `changes` would produce, without applying them.
    /// An empty list means the note is removed.
    pub fn project(&self, changes: &BTreeMap<PathBuf, Vec<Task>>) -> (usize, usize) {
        let mut tasks = self.total_tasks;
        let mut notes = self.by_path.len();
        for (path, new) in changes {
            let old = self.tasks_in(path);
            tasks = tasks.saturating_sub(old) + new.len();
            match (old > 0, !new.is_empty()) {
                (true, false) => notes = notes.saturating_sub(1),
                (false, true) => notes += 1,
                _ => {}
            }
        }
        (tasks, notes)
    }

    /// Replace the task lists of the changed notes.
    pub fn apply(&mut self, changes: BTreeMap<PathBuf, Vec<Task>>) {
        for (path, mut new) in changes {
            let old = self.by_path.remove(&path).map_or(0, |list| list.len());
            self.total_tasks = self.total_tasks.saturating_sub(old) + new.len();
            if !new.is_empty() {
                new.sort_by(Task::snapshot_cmp);
                self.by_path.insert(path, new);
            }
        }
    }

    /// Deep copy into an immutable snapshot.
    pub fn snapshot(&self, root: &Path, generation: u64) -> Snapshot {
        let mut notes: Vec<(PathBuf, Vec<Task>)> = self
            .by_path
            .iter()
            .map(|(path, tasks)| (path.clone(), tasks.clone()))
            .collect();
        notes.sort_by(|a, b| a.0.as_os_str().cmp(b.0.as_os_str()));

        Snapshot {
            root: root.to_path_buf(),
            notes,
            generation,
        }
    }
}

/// Immutable view of the task index at one point in time.
///
/// Owns its data; later updates to the index never show through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    root: PathBuf,
    /// Sorted byte-wise by path.
    notes: Vec<(PathBuf, Vec<Task>)>,
    generation: u64,
}

impl Snapshot {
    /// All tasks: by path, then line, then content.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.notes.iter().flat_map(|(_, tasks)| tasks.iter())
    }

    pub fn into_tasks(self) -> Vec<Task> {
        self.notes.into_iter().flat_map(|(_, tasks)| tasks).collect()
    }

    /// Tasks of one note. Relative paths are taken from the vault root.
    pub fn tasks_for(&self, path: &Path) -> &[Task] {
        let path = clean_path(&self.root.join(path));
        match self
            .notes
            .binary_search_by(|(p, _)| p.as_os_str().cmp(path.as_os_str()))
        {
            Ok(idx) => self.notes[idx].1.as_slice(),
            Err(_) => &[],
        }
    }

    /// Paths of the notes holding tasks, in snapshot order.
    pub fn notes(&self) -> impl Iterator<Item = &Path> {
        self.notes.iter().map(|(path, _)| path.as_path())
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }

    pub fn len(&self) -> usize {
        self.notes.iter().map(|(_, tasks)| tasks.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn counts(&self) -> TaskCounts {
        TaskCounts::tally(self.tasks())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Increases each time the index commits a rebuild or merge.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            generation: self.generation,
            notes: self.note_count(),
            tasks: self.counts(),
        }
    }
}

/// Serializable totals for a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub generation: u64,
    pub notes: usize,
    pub tasks: TaskCounts,
}
