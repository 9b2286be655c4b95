//! Task-related CLI commands.

use crate::cache::TaskIndex;
use crate::cli::args::{StatusFilter, TaskSort, TasksArgs};
use crate::cli::output::Output;
use crate::error::{ExitCode, Result, ZettelError};
use crate::parser::parse_date;
use crate::types::{Task, TaskCounts, TaskStatus};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::Path;

/// Output for the tasks command.
#[derive(Debug, Serialize)]
pub struct TasksOutput {
    pub counts: TaskCounts,
    pub tasks: Vec<Task>,
}

/// Filter options for task queries.
#[derive(Debug, Default)]
pub struct TaskFilter {
    pub status: StatusFilter,
    pub owner: Option<String>,
    pub project: Option<String>,
    pub priority: Option<String>,
    pub due_before: Option<NaiveDate>,
    pub due_after: Option<NaiveDate>,
    pub links_to: Option<String>,
    pub glob: Option<glob::Pattern>,
}

impl TaskFilter {
    /// Build a filter from CLI arguments, resolving relative dates against
    /// `today`.
    pub fn from_args(args: &TasksArgs, today: NaiveDate) -> Result<Self> {
        let date = |value: &Option<String>| -> Result<Option<NaiveDate>> {
            value
                .as_deref()
                .map(|v| parse_date(v, today).ok_or_else(|| ZettelError::InvalidDate(v.to_string())))
                .transpose()
        };

        Ok(Self {
            status: args.status,
            owner: args.owner.clone(),
            project: args.project.clone(),
            priority: args.priority.clone(),
            due_before: date(&args.due_before)?,
            due_after: date(&args.due_after)?,
            links_to: args.links_to.clone(),
            glob: args.glob.as_deref().map(glob::Pattern::new).transpose()?,
        })
    }

    /// Whether `task` passes every filter. `root` is the vault root, used
    /// to match the glob against vault-relative paths.
    pub fn matches(&self, task: &Task, root: &Path) -> bool {
        match self.status {
            StatusFilter::Open if task.status != TaskStatus::Unchecked => return false,
            StatusFilter::Done if task.status != TaskStatus::Checked => return false,
            _ => {}
        }

        let metadata = &task.metadata;
        if !field_matches(&self.owner, &metadata.owner)
            || !field_matches(&self.project, &metadata.project)
            || !field_matches(&self.priority, &metadata.priority)
        {
            return false;
        }

        // Undated tasks never match a date bound
        if let Some(before) = self.due_before {
            if !metadata.due.is_some_and(|due| due < before) {
                return false;
            }
        }
        if let Some(after) = self.due_after {
            if !metadata.due.is_some_and(|due| due > after) {
                return false;
            }
        }

        if let Some(ref target) = self.links_to {
            if !metadata.references_note(target) {
                return false;
            }
        }

        if let Some(ref pattern) = self.glob {
            let relative = task.path.strip_prefix(root).unwrap_or(&task.path);
            if !pattern.matches_path(relative) {
                return false;
            }
        }

        true
    }
}

fn field_matches(wanted: &Option<String>, actual: &Option<String>) -> bool {
    match (wanted, actual) {
        (None, _) => true,
        (Some(w), Some(a)) => w.eq_ignore_ascii_case(a),
        (Some(_), None) => false,
    }
}

/// Sort tasks in place. Ties fall back to snapshot order.
pub fn sort_tasks(tasks: &mut [Task], sort: TaskSort) {
    match sort {
        TaskSort::Path => tasks.sort_by(Task::snapshot_cmp),
        TaskSort::Due => tasks.sort_by(|a, b| {
            let key = |t: &Task| (t.metadata.due.is_none(), t.metadata.due);
            key(a).cmp(&key(b)).then_with(|| a.snapshot_cmp(b))
        }),
        TaskSort::Status => tasks.sort_by(|a, b| a.status.cmp(&b.status).then_with(|| a.snapshot_cmp(b))),
    }
}

/// List tasks from a fresh snapshot.
pub fn get_tasks(index: &TaskIndex, args: &TasksArgs, today: NaiveDate, output: &Output) -> Result<ExitCode> {
    let filter = TaskFilter::from_args(args, today)?;
    let snapshot = index.acquire_snapshot()?;
    let root = snapshot.root().to_path_buf();

    let mut tasks: Vec<Task> = snapshot
        .into_tasks()
        .into_iter()
        .filter(|t| filter.matches(t, &root))
        .collect();
    sort_tasks(&mut tasks, args.sort);

    // Report paths relative to the vault
    for task in &mut tasks {
        if let Ok(relative) = task.path.strip_prefix(&root) {
            task.path = relative.to_path_buf();
        }
    }

    if args.table {
        output.print_table(&["WHERE", "STATUS", "DUE", "TASK"], &table_rows(&tasks));
    } else {
        let result = TasksOutput {
            counts: TaskCounts::tally(&tasks),
            tasks,
        };
        output.print(&result)?;
    }

    Ok(ExitCode::Success)
}

fn table_rows(tasks: &[Task]) -> Vec<Vec<String>> {
    tasks
        .iter()
        .map(|t| {
            vec![
                format!("{}:{}", t.path.display(), t.line),
                t.status.to_string(),
                t.metadata.due.map(|d| d.to_string()).unwrap_or_default(),
                t.content.clone(),
            ]
        })
        .collect()
}
