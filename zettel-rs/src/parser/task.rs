//! Task recognition and `@key(value)` metadata extraction.

use crate::parser::wikilink::find_backlinks;
use crate::types::{Task, TaskMetadata, TaskStatus};
use chrono::NaiveDate;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

/// Metadata token: `@key(value)`. The value cannot contain parentheses or
/// span lines.
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@([A-Za-z][A-Za-z0-9_-]*)\(([^()\n]*)\)").unwrap()
});

/// Relative offset: +3d, -1w
static OFFSET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([+-])(\d{1,5})([dw])$").unwrap());

/// Structured field a token key maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Due,
    Scheduled,
    Priority,
    Owner,
    Project,
}

/// Recognized keys (lower-cased) and their aliases.
static FIELD_TABLE: &[(&str, Field)] = &[
    ("due", Field::Due),
    ("scheduled", Field::Scheduled),
    ("schedule", Field::Scheduled),
    ("start", Field::Scheduled),
    ("priority", Field::Priority),
    ("owner", Field::Owner),
    ("assignee", Field::Owner),
    ("responsible", Field::Owner),
    ("project", Field::Project),
    ("group", Field::Project),
];

fn lookup_field(key: &str) -> Option<Field> {
    FIELD_TABLE
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, field)| *field)
}

/// A `@key(value)` token located in task text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataToken {
    /// Lower-cased key.
    pub key: String,
    /// Trimmed value.
    pub value: String,
    pub start: usize,
    pub end: usize,
}

/// Every syntactically valid token in `text`, recognized or not.
pub fn tokenize(text: &str) -> Vec<MetadataToken> {
    TOKEN
        .captures_iter(text)
        .filter_map(|cap| {
            let full = cap.get(0)?;
            Some(MetadataToken {
                key: cap.get(1)?.as_str().to_lowercase(),
                value: cap.get(2)?.as_str().trim().to_string(),
                start: full.start(),
                end: full.end(),
            })
        })
        .collect()
}

/// Split list item text into its checkbox state and the text after the
/// marker. Only `[ ]` and lower-case `[x]` count, and the marker must be
/// followed by some text.
pub fn recognize_task(item_text: &str) -> Option<(TaskStatus, &str)> {
    let trimmed = item_text.trim_start();
    let status = if trimmed.starts_with("[ ]") {
        TaskStatus::Unchecked
    } else if trimmed.starts_with("[x]") {
        TaskStatus::Checked
    } else {
        return None;
    };

    let body = &trimmed[3..];
    if body.trim().is_empty() {
        return None;
    }
    Some((status, body))
}

/// Build a task from a list item's text, or `None` if the item is not a
/// task or nothing is left once metadata is removed.
pub fn parse_task_item(path: &Path, line: usize, item_text: &str, today: NaiveDate) -> Option<Task> {
    let (status, body) = recognize_task(item_text)?;
    let (content, metadata) = extract_metadata(body, today);
    if content.is_empty() {
        return None;
    }

    Some(Task {
        path: path.to_path_buf(),
        line,
        status,
        content,
        metadata,
    })
}

/// Pull recognized tokens and backlinks out of task text.
///
/// Returns the cleaned content and the extracted metadata. Unknown tokens
/// stay in the content. When a key repeats, the last parseable value wins.
pub fn extract_metadata(text: &str, today: NaiveDate) -> (String, TaskMetadata) {
    let mut metadata = TaskMetadata::default();
    let mut cuts = Vec::new();

    for token in tokenize(text) {
        let Some(field) = lookup_field(&token.key) else {
            continue;
        };
        apply_field(&mut metadata, field, &token.value, today);
        cuts.push((token.start, token.end));
        metadata.raw_tokens.insert(token.key, token.value);
    }

    let mut references = BTreeSet::new();
    for link in find_backlinks(text) {
        if !link.embed {
            references.insert(link.target);
        }
        cuts.push((link.start, link.end));
    }
    metadata.references = references.into_iter().collect();

    cuts.sort_unstable();
    let stripped = remove_ranges(text, &cuts);
    (normalize_content(&stripped), metadata)
}

fn apply_field(metadata: &mut TaskMetadata, field: Field, value: &str, today: NaiveDate) {
    match field {
        Field::Due => {
            if let Some(date) = parse_date(value, today) {
                metadata.due = Some(date);
            }
        }
        Field::Scheduled => {
            if let Some(date) = parse_date(value, today) {
                metadata.scheduled = Some(date);
            }
        }
        Field::Priority => {
            if !value.is_empty() {
                metadata.priority = Some(value.to_lowercase());
            }
        }
        Field::Owner => {
            if !value.is_empty() {
                metadata.owner = Some(value.to_string());
            }
        }
        Field::Project => {
            if !value.is_empty() {
                metadata.project = Some(value.to_string());
            }
        }
    }
}

/// Parse a date value.
///
/// Accepts `today`, `tomorrow`, `yesterday`, offsets like `+3d` or `-1w`,
/// RFC 3339 timestamps (date part kept), `YYYY-MM-DD` and `YYYY/MM/DD`.
pub fn parse_date(value: &str, today: NaiveDate) -> Option<NaiveDate> {
    let value = value.trim();
    let lower = value.to_lowercase();

    match lower.as_str() {
        "today" => return Some(today),
        "tomorrow" => return today.succ_opt(),
        "yesterday" => return today.pred_opt(),
        _ => {}
    }

    if let Some(caps) = OFFSET.captures(&lower) {
        let amount: i64 = caps[2].parse().ok()?;
        let days = if &caps[3] == "w" { amount * 7 } else { amount };
        let days = if &caps[1] == "-" { -days } else { days };
        return today.checked_add_signed(chrono::Duration::days(days));
    }

    if let Ok(timestamp) = chrono::DateTime::parse_from_rfc3339(value) {
        return Some(timestamp.date_naive());
    }

    ["%Y-%m-%d", "%Y/%m/%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

/// Remove sorted, possibly overlapping byte ranges from `text`.
fn remove_ranges(text: &str, ranges: &[(usize, usize)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for &(start, end) in ranges {
        if start > cursor {
            out.push_str(&text[cursor..start]);
        }
        cursor = cursor.max(end);
    }
    if cursor < text.len() {
        out.push_str(&text[cursor..]);
    }
    out
}

/// Collapse whitespace runs and drop empty lines.
///
/// The first line is trimmed; later lines keep their leading indentation.
fn normalize_content(text: &str) -> String {
    let mut lines = Vec::new();
    for line in text.lines() {
        let body = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if body.is_empty() {
            continue;
        }
        if lines.is_empty() {
            lines.push(body);
        } else {
            let indent = &line[..line.len() - line.trim_start().len()];
            lines.push(format!("{indent}{body}"));
        }
    }
    lines.join("\n")
}
