//! File system and clock primitives, injectable for tests.

use chrono::NaiveDate;
use std::fs;
use std::io;
use std::path::Path;

/// What a path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Dir,
    Other,
}

/// The file operations the parser and index depend on.
pub trait FileSystem: Send + Sync {
    /// Follows symlinks, like `fs::metadata`.
    fn stat(&self, path: &Path) -> io::Result<FileKind>;

    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// The real file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn stat(&self, path: &Path) -> io::Result<FileKind> {
        let metadata = fs::metadata(path)?;
        let kind = if metadata.is_dir() {
            FileKind::Dir
        } else if metadata.is_file() {
            FileKind::File
        } else {
            FileKind::Other
        };
        Ok(kind)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

/// Source of "today" for relative dates like `@due(tomorrow)`.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}
