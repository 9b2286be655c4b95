//! Backlink (`[[Target]]`) parsing.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

// Wikilink pattern: [[target]] or [[target|alias]] or [[target#heading]] or [[target#^block]]
//
// (!)?                     - Optional ! for embeds (group 1)
// \[\[                     - Opening [[
// ([^\]\|#]+)              - Target (group 2)
// (?:#\^([a-zA-Z0-9_-]+))? - Block reference (group 3)
// (?:#([^\]\|]+))?         - Heading reference (group 4)
// (?:\|([^\]]+))?          - Alias (group 5)
// \]\]                     - Closing ]]
static WIKILINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(!?)\[\[([^\]\|#]+)(?:#\^([a-zA-Z0-9_-]+))?(?:#([^\]\|]+))?(?:\|([^\]]+))?\]\]")
        .unwrap()
});

// Any double-bracket span, however malformed its inside.
static ANY_LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\[.+?\]\]").unwrap());

/// A backlink found in a piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backlink {
    /// Target note name, NFC-normalized and trimmed.
    pub target: String,
    pub alias: Option<String>,
    pub heading: Option<String>,
    pub block_id: Option<String>,
    /// `![[...]]` rather than `[[...]]`.
    pub embed: bool,
    /// Byte offset of the first character (the `!` for embeds).
    pub start: usize,
    /// Byte offset one past the closing `]]`.
    pub end: usize,
}

/// Find every backlink and embed in `text`, in order of appearance.
pub fn find_backlinks(text: &str) -> Vec<Backlink> {
    WIKILINK
        .captures_iter(text)
        .filter_map(|cap| {
            let full = cap.get(0)?;
            let target: String = cap.get(2)?.as_str().trim().nfc().collect();
            if target.is_empty() {
                return None;
            }
            Some(Backlink {
                target,
                alias: cap.get(5).map(|m| m.as_str().to_string()),
                heading: cap.get(4).map(|m| m.as_str().to_string()),
                block_id: cap.get(3).map(|m| m.as_str().to_string()),
                embed: cap.get(1).is_some_and(|m| !m.as_str().is_empty()),
                start: full.start(),
                end: full.end(),
            })
        })
        .collect()
}

/// Whether raw note content contains at least one `[[...]]` link.
///
/// Notes for which this is false have no outgoing links ("orphans").
pub fn has_note_links(content: &str) -> bool {
    ANY_LINK.is_match(content)
}
