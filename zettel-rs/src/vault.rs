//! Vault root handling and note discovery.

use crate::error::{Result, ZettelError};
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// File extension of notes. Matched exactly.
pub const NOTE_EXTENSION: &str = "md";

/// A directory of Markdown notes.
#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
    /// Symlink-resolved root, used to relativize paths reported by watchers.
    canonical_root: PathBuf,
}

impl Vault {
    /// Open a vault rooted at an existing directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = normalize_path(&root.into());

        if !root.is_dir() {
            return Err(ZettelError::VaultNotFound(root));
        }

        let canonical_root = std::fs::canonicalize(&root).unwrap_or_else(|_| root.clone());
        Ok(Self {
            root,
            canonical_root,
        })
    }

    /// Absolute, normalized root path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute, normalized path for a vault-relative path.
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        clean_path(&self.root.join(relative))
    }

    /// Vault-relative form of `path`, or `None` if it lies outside the vault.
    pub fn relativize(&self, path: &Path) -> Option<PathBuf> {
        let cleaned = clean_path(path);
        let relative = if cleaned.is_absolute() {
            cleaned
                .strip_prefix(&self.root)
                .or_else(|_| cleaned.strip_prefix(&self.canonical_root))
                .ok()?
                .to_path_buf()
        } else {
            cleaned
        };

        if matches!(relative.components().next(), Some(Component::ParentDir)) {
            return None;
        }
        Some(relative)
    }

    /// All notes in the vault, as absolute paths in walk order.
    pub fn list_notes(&self) -> Result<Vec<PathBuf>> {
        walk_markdown(&self.root)
    }
}

/// Whether `path` has exactly the `.md` extension.
pub fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == NOTE_EXTENSION)
}

/// Make `path` absolute and lexically clean (`.` and `..` removed).
pub fn normalize_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    clean_path(&absolute)
}

/// Lexically clean a path without touching the file system.
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // Cannot climb above the root
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Recursively collect `.md` files under `root`, sorted by name within each
/// directory. Hidden entries are not descended into. Any traversal error
/// aborts the walk.
pub fn walk_markdown(root: &Path) -> Result<Vec<PathBuf>> {
    let mut notes = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

    for entry in walker {
        let entry = entry.map_err(|source| {
            let path = source
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| root.to_path_buf());
            ZettelError::Walk { path, source }
        })?;

        if entry.file_type().is_file() && is_markdown(entry.path()) {
            notes.push(entry.into_path());
        }
    }

    Ok(notes)
}

/// Whether any component of `path` is hidden (starts with `.`).
pub fn has_hidden_component(path: &Path) -> bool {
    path.components().any(|component| match component {
        Component::Normal(name) => name.to_str().is_some_and(|n| n.starts_with('.')),
        _ => false,
    })
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}
