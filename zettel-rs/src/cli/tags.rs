//! Tag-related CLI commands.

use crate::cli::args::TagsArgs;
use crate::cli::output::Output;
use crate::error::{ExitCode, Result};
use crate::parser::{Parser, TagCounts};
use crate::vault::Vault;
use serde::Serialize;

/// Output for the tags command.
#[derive(Debug, Serialize)]
pub struct VaultTagsOutput {
    pub tags: Vec<VaultTagOutput>,
}

/// A tag with count.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct VaultTagOutput {
    pub tag: String,
    pub count: usize,
}

/// Tag counts in first-seen order, or summed per root segment.
pub fn tag_rows(tags: &TagCounts, roots: bool) -> Vec<VaultTagOutput> {
    if roots {
        tags.by_root()
            .into_iter()
            .map(|(tag, count)| VaultTagOutput { tag, count })
            .collect()
    } else {
        tags.iter()
            .map(|(tag, count)| VaultTagOutput {
                tag: tag.to_string(),
                count,
            })
            .collect()
    }
}

/// Count the tags listed in every note of the vault.
pub fn get_tags_vault(vault: &Vault, parser: &Parser, args: &TagsArgs, output: &Output) -> Result<ExitCode> {
    let parsed = parser.walk_tree(vault.root())?;
    let result = VaultTagsOutput {
        tags: tag_rows(&parsed.tags, args.roots),
    };
    output.print(&result)?;
    Ok(ExitCode::Success)
}
