//! Integration tests for the task index over temporary vaults.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;
use zettel::cache::{snapshot_of, IndexState, TaskIndex};
use zettel::config::IndexConfig;
use zettel::error::{Ceiling, ZettelError};
use zettel::parser::Parser;
use zettel::sys::{FixedClock, OsFileSystem};
use zettel::types::TaskStatus;
use zettel::vault::Vault;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
}

fn open_index(dir: &TempDir, limits: IndexConfig) -> TaskIndex {
    let parser = Parser::with_env(Arc::new(OsFileSystem), Arc::new(FixedClock(today())));
    TaskIndex::new(Vault::new(dir.path()).unwrap(), parser, limits)
}

fn write(dir: &TempDir, relative: &str, content: &str) {
    let path = dir.path().join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn contents(index: &TaskIndex) -> Vec<String> {
    index
        .acquire_snapshot()
        .unwrap()
        .tasks()
        .map(|t| t.content.clone())
        .collect()
}

#[test]
fn unchanged_vault_gives_identical_snapshots() {
    let dir = TempDir::new().unwrap();
    write(&dir, "b.md", "- [ ] beta\n- [x] beta done\n");
    write(&dir, "a.md", "- [ ] alpha @due(tomorrow)\n");
    write(&dir, "nested/c.md", "- [ ] gamma\n");

    let index = open_index(&dir, IndexConfig::default());
    let first = index.acquire_snapshot().unwrap();
    let second = index.acquire_snapshot().unwrap();

    assert_eq!(first.tasks().collect::<Vec<_>>(), second.tasks().collect::<Vec<_>>());
    assert_eq!(first.len(), 4);
    assert_eq!(first.note_count(), 3);
    assert_eq!(first.tasks().next().unwrap().content, "alpha");
}

#[test]
fn parses_metadata_in_notes() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "note.md",
        "- [ ] first task @due(2024-05-20) @owner(Alice) [[Project Hub]]\n\
         - [x] completed task @priority(high)\n\
         - [ ]\n",
    );

    let index = open_index(&dir, IndexConfig::default());
    let snapshot = index.acquire_snapshot().unwrap();
    let tasks: Vec<_> = snapshot.tasks().collect();
    assert_eq!(tasks.len(), 2);

    assert_eq!(tasks[0].status, TaskStatus::Unchecked);
    assert_eq!(tasks[0].content, "first task");
    assert_eq!(tasks[0].metadata.owner.as_deref(), Some("Alice"));
    assert_eq!(tasks[0].metadata.due, Some(today()));
    assert_eq!(tasks[0].metadata.references, vec!["Project Hub"]);

    assert_eq!(tasks[1].status, TaskStatus::Checked);
    assert_eq!(tasks[1].metadata.priority.as_deref(), Some("high"));
}

#[test]
fn queued_edit_is_applied() {
    let dir = TempDir::new().unwrap();
    write(&dir, "file.md", "- [ ] first\n");
    let index = open_index(&dir, IndexConfig::default());
    assert_eq!(contents(&index), vec!["first"]);

    write(&dir, "file.md", "- [x] done\n");
    // Not visible until queued
    assert_eq!(contents(&index), vec!["first"]);

    index.queue_update("file.md");
    let snapshot = index.acquire_snapshot().unwrap();
    let tasks: Vec<_> = snapshot.tasks().collect();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].status, TaskStatus::Checked);
    assert_eq!(tasks[0].content, "done");
}

#[test]
fn deleted_note_is_removed() {
    let dir = TempDir::new().unwrap();
    write(&dir, "keep.md", "- [ ] keep\n");
    write(&dir, "gone.md", "- [ ] one\n- [ ] two\n");
    let index = open_index(&dir, IndexConfig::default());
    assert_eq!(index.acquire_snapshot().unwrap().len(), 3);

    fs::remove_file(dir.path().join("gone.md")).unwrap();
    index.queue_update("gone.md");
    assert_eq!(contents(&index), vec!["keep"]);

    // Removing again never drives totals below zero
    index.queue_update("gone.md");
    index.acquire_snapshot().unwrap();
    let status = index.status();
    assert_eq!((status.tasks, status.notes), (1, 1));
}

#[test]
fn task_ceiling_fails_snapshot() {
    let dir = TempDir::new().unwrap();
    write(&dir, "many.md", "- [ ] a\n- [ ] b\n- [ ] c\n");
    let limits = IndexConfig {
        max_tasks: 2,
        max_notes: 10,
    };
    let index = open_index(&dir, limits);

    let err = index.acquire_snapshot().unwrap_err();
    assert!(matches!(
        err,
        ZettelError::CapacityExceeded {
            what: Ceiling::Tasks,
            limit: 2,
            actual: 3
        }
    ));
}

#[test]
fn queued_directory_triggers_rebuild() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.md", "- [ ] a\n");
    let index = open_index(&dir, IndexConfig::default());
    let before = index.acquire_snapshot().unwrap();

    write(&dir, "projects/new.md", "- [ ] fresh\n");
    write(&dir, "projects/deeper/other.md", "- [ ] deeper\n");
    index.queue_update("projects");

    let after = index.acquire_snapshot().unwrap();
    assert_eq!(after.len(), 3);
    assert_eq!(after.tasks_for(Path::new("projects/deeper/other.md")).len(), 1);
    assert!(after.generation() > before.generation());
    assert_eq!(before.len(), 1);
}

#[test]
fn directory_moved_out_of_vault_drops_its_tasks() {
    let dir = TempDir::new().unwrap();
    let elsewhere = TempDir::new().unwrap();
    write(&dir, "keep.md", "- [ ] keep\n");
    write(&dir, "proj/a.md", "- [ ] stale\n");
    write(&dir, "proj/sub/b.md", "- [ ] stale too\n");
    let index = open_index(&dir, IndexConfig::default());
    assert_eq!(contents(&index), vec!["keep", "stale", "stale too"]);

    fs::rename(dir.path().join("proj"), elsewhere.path().join("proj")).unwrap();
    index.queue_update("proj");
    assert_eq!(contents(&index), vec!["keep"]);

    let status = index.status();
    assert_eq!((status.tasks, status.notes), (1, 1));
}

#[test]
fn concurrent_snapshots_on_fresh_index() {
    let dir = TempDir::new().unwrap();
    for i in 0..4 {
        write(&dir, &format!("n{i}.md"), "- [ ] a\n- [x] b\n");
    }
    let index = Arc::new(open_index(&dir, IndexConfig::default()));
    let first = index.acquire_snapshot().unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let index = Arc::clone(&index);
            thread::spawn(move || index.acquire_snapshot().unwrap())
        })
        .collect();
    for handle in handles {
        let snapshot = handle.join().unwrap();
        assert_eq!(snapshot.generation(), first.generation());
        assert_eq!(snapshot.len(), 8);
    }
}

#[test]
fn merge_over_ceiling_keeps_previous_state() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.md", "- [ ] a\n");
    let limits = IndexConfig {
        max_tasks: 2,
        max_notes: 10,
    };
    let index = open_index(&dir, limits);
    assert_eq!(contents(&index), vec!["a"]);

    write(&dir, "b.md", "- [ ] b1\n- [ ] b2\n");
    index.queue_update("b.md");
    let err = index.acquire_snapshot().unwrap_err();
    assert!(matches!(err, ZettelError::CapacityExceeded { .. }));

    let status = index.status();
    assert_eq!(status.state, IndexState::Dirty);
    assert_eq!(status.pending, 1);
    assert_eq!(status.tasks, 1);

    // Shrink the note; the still-queued path now fits
    write(&dir, "b.md", "- [ ] b1\n");
    assert_eq!(contents(&index), vec!["a", "b1"]);
    assert_eq!(index.status().state, IndexState::Fresh);
}

#[test]
fn close_is_terminal_and_idempotent() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.md", "- [ ] a\n");
    let index = open_index(&dir, IndexConfig::default());
    index.acquire_snapshot().unwrap();

    index.close().unwrap();
    assert!(matches!(index.acquire_snapshot(), Err(ZettelError::Closed)));

    index.queue_update("a.md");
    assert_eq!(index.status().pending, 0);

    index.close().unwrap();
    assert!(matches!(index.invalidate(), Err(ZettelError::Closed)));
}

#[test]
fn never_constructed_index_is_unavailable() {
    assert!(matches!(snapshot_of(None), Err(ZettelError::Unavailable)));

    let dir = TempDir::new().unwrap();
    let index = open_index(&dir, IndexConfig::default());
    assert!(snapshot_of(Some(&index)).unwrap().is_empty());
}

#[test]
fn fenced_items_are_neither_tasks_nor_tags() {
    let dir = TempDir::new().unwrap();
    write(&dir, "code.md", "```\n- [ ] inside\ntags:\n- inside-tag\n```\n\n- [ ] outside\n");

    let index = open_index(&dir, IndexConfig::default());
    assert_eq!(contents(&index), vec!["outside"]);

    let parsed = Parser::new().walk_tree(dir.path()).unwrap();
    assert!(parsed.tags.is_empty());
}

#[test]
fn absolute_queue_path_matches_relative() {
    let dir = TempDir::new().unwrap();
    write(&dir, "notes/a.md", "- [ ] before\n");
    let index = open_index(&dir, IndexConfig::default());
    index.acquire_snapshot().unwrap();

    write(&dir, "notes/a.md", "- [ ] after\n");
    index.queue_update(dir.path().join("notes/a.md"));
    index.queue_update("notes/a.md");
    assert_eq!(index.status().pending, 1);
    assert_eq!(contents(&index), vec!["after"]);
}

#[test]
fn multiline_tasks_keep_indentation() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "long.md",
        "- [ ] plan release @due(2024-06-01)\n    check the   [[Changelog]]\n      then tag it\n",
    );

    let index = open_index(&dir, IndexConfig::default());
    let snapshot = index.acquire_snapshot().unwrap();
    let task = snapshot.tasks().next().unwrap();
    assert_eq!(task.content, "plan release\n  check the\n    then tag it");
    assert_eq!(task.metadata.references, vec!["Changelog"]);
}

#[test]
fn tag_sections_are_counted() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.md", "tags:\n- project/foo\n- weekly\n");
    write(&dir, "b.md", "Tags:\n- project/foo\n\nBody\n");

    let parsed = Parser::new().walk_tree(dir.path()).unwrap();
    assert_eq!(parsed.tags.count("project/foo"), 2);
    assert_eq!(parsed.tags.count("weekly"), 1);
    assert_eq!(parsed.tags.tags().len(), 2);
}

#[test]
fn concurrent_queue_and_snapshot() {
    let dir = TempDir::new().unwrap();
    for i in 0..8 {
        write(&dir, &format!("n{i}.md"), "- [ ] task\n");
    }
    let index = Arc::new(open_index(&dir, IndexConfig::default()));
    index.acquire_snapshot().unwrap();

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let index = Arc::clone(&index);
            thread::spawn(move || {
                for i in 0..8 {
                    index.queue_update(format!("n{}.md", (i + worker) % 8));
                    let snapshot = index.acquire_snapshot().unwrap();
                    assert_eq!(snapshot.len(), 8);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let status = index.status();
    assert_eq!(status.state, IndexState::Fresh);
    assert_eq!((status.tasks, status.notes), (8, 8));
}
