//! Orphan detection: notes that link nowhere.

use crate::cli::output::Output;
use crate::error::{ExitCode, Result, ZettelError};
use crate::parser::has_note_links;
use crate::sys::FileSystem;
use crate::vault::Vault;
use serde::Serialize;
use std::path::PathBuf;
use tracing::warn;

/// Output for the orphans command.
#[derive(Debug, Serialize)]
pub struct OrphansOutput {
    pub orphans: Vec<PathBuf>,
    pub total_notes: usize,
}

/// Vault-relative paths of notes whose content has no `[[...]]` link, in
/// walk order. Unreadable notes are skipped.
pub fn find_orphans(vault: &Vault, fs: &dyn FileSystem) -> Result<OrphansOutput> {
    let notes = vault.list_notes()?;
    let total_notes = notes.len();
    let mut orphans = Vec::new();

    for path in notes {
        let content = match fs.read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                let e = ZettelError::io(&path, e);
                warn!(path = %path.display(), error = %e, "skipping unreadable note");
                continue;
            }
        };
        if !has_note_links(&content) {
            orphans.push(vault.relativize(&path).unwrap_or(path));
        }
    }

    Ok(OrphansOutput {
        orphans,
        total_notes,
    })
}

pub fn get_orphans(vault: &Vault, fs: &dyn FileSystem, output: &Output) -> Result<ExitCode> {
    let result = find_orphans(vault, fs)?;
    output.print(&result)?;
    Ok(ExitCode::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::OsFileSystem;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_find_orphans() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("hub.md"), "See [[lonely]] and [[sub/leaf]]").unwrap();
        fs::write(dir.path().join("lonely.md"), "No links here. [not] [[unclosed").unwrap();
        fs::write(dir.path().join("sub/leaf.md"), "Back to ![[hub]]").unwrap();
        fs::write(dir.path().join("sub/empty.md"), "").unwrap();

        let vault = Vault::new(dir.path()).unwrap();
        let result = find_orphans(&vault, &OsFileSystem).unwrap();
        assert_eq!(result.total_notes, 4);
        assert_eq!(
            result.orphans,
            vec![PathBuf::from("lonely.md"), PathBuf::from("sub/empty.md")]
        );
    }
}
