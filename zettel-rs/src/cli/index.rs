//! Task index CLI commands.

use crate::cache::{IndexStatus, SnapshotSummary, TaskIndex};
use crate::cli::output::Output;
use crate::error::{ExitCode, Result};
use serde::Serialize;

/// Build the index if needed and show its status.
pub fn status(index: &TaskIndex, output: &Output) -> Result<ExitCode> {
    index.acquire_snapshot()?;
    output.print(&index.status())?;
    Ok(ExitCode::Success)
}

/// Discard the index and rebuild it from disk.
pub fn rebuild(index: &TaskIndex, output: &Output) -> Result<ExitCode> {
    index.invalidate()?;
    let snapshot = index.acquire_snapshot()?;

    let result = RebuildResult {
        summary: snapshot.summary(),
        status: index.status(),
    };
    output.print(&result)?;
    Ok(ExitCode::Success)
}

#[derive(Debug, Serialize)]
struct RebuildResult {
    summary: SnapshotSummary,
    status: IndexStatus,
}
