//! Whole-note parsing: tasks and `tags:` sections.

use crate::error::{Result, ZettelError};
use crate::parser::block::{scan_blocks, BlockEvent};
use crate::parser::tag::TagCounts;
use crate::parser::task::parse_task_item;
use crate::sys::{Clock, FileSystem, OsFileSystem, SystemClock};
use crate::types::Task;
use crate::vault::{normalize_path, walk_markdown};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Text line that opens a tag section. Compared case-insensitively.
const TAGS_MARKER: &str = "tags:";

/// Tasks and tags gathered from one or more notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutput {
    /// Tasks in document order, per note in walk order.
    pub tasks: Vec<Task>,
    pub tags: TagCounts,
}

/// Reads notes through a [`FileSystem`] and dates relative tokens with a
/// [`Clock`].
#[derive(Clone)]
pub struct Parser {
    fs: Arc<dyn FileSystem>,
    clock: Arc<dyn Clock>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser").finish_non_exhaustive()
    }
}

impl Parser {
    /// Parser over the real file system and the local date.
    pub fn new() -> Self {
        Self::with_env(Arc::new(OsFileSystem), Arc::new(SystemClock))
    }

    pub fn with_env(fs: Arc<dyn FileSystem>, clock: Arc<dyn Clock>) -> Self {
        Self { fs, clock }
    }

    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Parse one note.
    pub fn parse(&self, path: &Path) -> Result<ParseOutput> {
        let mut out = ParseOutput::default();
        self.parse_into(path, &mut out)?;
        Ok(out)
    }

    /// Parse one note, appending to `out`. On error `out` is left untouched.
    pub fn parse_into(&self, path: &Path, out: &mut ParseOutput) -> Result<()> {
        let path = normalize_path(path);
        let content = self
            .fs
            .read_to_string(&path)
            .map_err(|e| ZettelError::io(&path, e))?;
        self.parse_content(&path, &content, out);
        Ok(())
    }

    /// Parse note text already in memory. `path` is recorded on each task
    /// as given.
    pub fn parse_content(&self, path: &Path, content: &str, out: &mut ParseOutput) {
        let today = self.clock.today();
        let mut in_tags = false;
        let before = out.tasks.len();

        for event in scan_blocks(content) {
            match event {
                BlockEvent::Text { text, .. } => {
                    if text.eq_ignore_ascii_case(TAGS_MARKER) {
                        in_tags = true;
                    }
                }
                BlockEvent::ListEnd => in_tags = false,
                BlockEvent::Item(item) => {
                    if in_tags {
                        out.tags.parse_tag(&item.text);
                    } else if let Some(task) = parse_task_item(path, item.line, &item.text, today) {
                        out.tasks.push(task);
                    }
                }
            }
        }

        debug!(path = %path.display(), tasks = out.tasks.len() - before, "parsed note");
    }

    /// Parse every note under `root`.
    ///
    /// Notes that cannot be read are skipped with a warning; a traversal
    /// failure aborts the walk.
    pub fn walk_tree(&self, root: &Path) -> Result<ParseOutput> {
        let root = normalize_path(root);
        let mut out = ParseOutput::default();
        let mut notes = 0usize;

        for path in walk_markdown(&root)? {
            match self.parse_into(&path, &mut out) {
                Ok(()) => notes += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable note"),
            }
        }

        debug!(
            root = %root.display(),
            notes,
            tasks = out.tasks.len(),
            tags = out.tags.len(),
            "walked vault"
        );
        Ok(out)
    }
}
