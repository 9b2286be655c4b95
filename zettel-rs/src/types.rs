//! Shared types for zettel.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Checkbox state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Unchecked,
    Checked,
}

impl TaskStatus {
    pub fn is_done(self) -> bool {
        self == TaskStatus::Checked
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Unchecked => f.write_str("open"),
            TaskStatus::Checked => f.write_str("done"),
        }
    }
}

/// Structured annotations parsed from `@key(value)` and `[[Backlink]]` tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<NaiveDate>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled: Option<NaiveDate>,

    /// Lower-cased priority text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Backlink targets, deduplicated and sorted.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<String>,

    /// Every recognized token as written, keyed by lower-cased key.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub raw_tokens: BTreeMap<String, String>,
}

impl TaskMetadata {
    pub fn is_empty(&self) -> bool {
        self == &TaskMetadata::default()
    }

    /// Whether any backlink points at `target` (case-insensitive).
    pub fn references_note(&self, target: &str) -> bool {
        let target = target.trim().trim_end_matches(".md").to_lowercase();
        self.references
            .iter()
            .any(|r| r.trim_end_matches(".md").to_lowercase() == target)
    }
}

/// A checkbox list item extracted from a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Absolute, normalized path of the owning note.
    pub path: PathBuf,

    /// Line where the item begins (1-indexed, 0 if unknown).
    pub line: usize,

    pub status: TaskStatus,

    /// Text with the marker, metadata tokens and backlinks removed.
    pub content: String,

    pub metadata: TaskMetadata,
}

impl Task {
    /// Snapshot order: path, then line, then content.
    pub fn snapshot_cmp(&self, other: &Task) -> Ordering {
        self.path
            .as_os_str()
            .cmp(other.path.as_os_str())
            .then(self.line.cmp(&other.line))
            .then_with(|| self.content.cmp(&other.content))
    }
}

/// Open/done totals for a set of tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCounts {
    pub total: usize,
    pub open: usize,
    pub done: usize,
}

impl TaskCounts {
    pub fn tally<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut counts = TaskCounts::default();
        for task in tasks {
            counts.total += 1;
            if task.status.is_done() {
                counts.done += 1;
            } else {
                counts.open += 1;
            }
        }
        counts
    }
}
