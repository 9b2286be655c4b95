//! Line-oriented Markdown block scanner.
//!
//! Produces the small event stream the document walker needs: text lines,
//! list items with their continuation lines, and the end of each outermost
//! list. Fenced code blocks are skipped entirely.

use regex::Regex;
use std::sync::LazyLock;

// Optional indent, a bullet or ordered marker, then either whitespace and
// the item text or the end of the line (an empty item).
static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([ \t]*)([-*+]|\d{1,9}[.)])(?:([ \t]+)(.*))?$").unwrap()
});

// Opening of a fenced code block: ``` or ~~~
static FENCE_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*(`{3,}|~{3,})(.*)$").unwrap()
});

static THEMATIC_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}(?:(?:-[ \t]*){3,}|(?:\*[ \t]*){3,}|(?:_[ \t]*){3,})$").unwrap()
});

/// One structural event in a Markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockEvent {
    /// A line of paragraph or heading text, trimmed.
    Text { line: usize, text: String },
    /// A list item.
    Item(ListItem),
    /// The outermost open list closed.
    ListEnd,
}

/// A list item and its continuation lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    /// Line of the marker (1-indexed).
    pub line: usize,
    /// Column of the marker.
    pub indent: usize,
    /// Text after the marker. Continuation lines follow on their own lines
    /// with any indentation beyond the item's content column kept.
    pub text: String,
}

/// Scan `content` into block events.
pub fn scan_blocks(content: &str) -> Vec<BlockEvent> {
    let mut scanner = Scanner::default();
    for (idx, line) in content.lines().enumerate() {
        scanner.line(idx + 1, line);
    }
    scanner.finish()
}

#[derive(Debug)]
struct Fence {
    ch: char,
    len: usize,
}

impl Fence {
    fn open(line: &str) -> Option<Fence> {
        let caps = FENCE_OPEN.captures(line)?;
        let marker = caps.get(1)?.as_str();
        let ch = marker.chars().next()?;
        // Backtick fences cannot carry backticks in the info string
        if ch == '`' && caps.get(2).is_some_and(|m| m.as_str().contains('`')) {
            return None;
        }
        Some(Fence {
            ch,
            len: marker.len(),
        })
    }

    fn closes(&self, line: &str) -> bool {
        let trimmed = line.trim();
        trimmed.len() >= self.len && trimmed.chars().all(|c| c == self.ch)
    }
}

#[derive(Debug)]
struct PendingItem {
    line: usize,
    indent: usize,
    content_col: usize,
    lines: Vec<String>,
}

#[derive(Debug, Default)]
struct Scanner {
    events: Vec<BlockEvent>,
    /// Content columns of the open items, outermost first.
    open: Vec<usize>,
    current: Option<PendingItem>,
    after_blank: bool,
    fence: Option<Fence>,
}

impl Scanner {
    fn line(&mut self, line_no: usize, line: &str) {
        if let Some(fence) = &self.fence {
            if fence.closes(line) {
                self.fence = None;
            }
            return;
        }

        if line.trim().is_empty() {
            self.after_blank = true;
            return;
        }

        let indent = indent_width(line);

        if let Some(fence) = Fence::open(line) {
            self.end_blocks_at(indent);
            self.fence = Some(fence);
        } else if THEMATIC_BREAK.is_match(line) {
            self.end_blocks_at(indent);
        } else if let Some(caps) = LIST_ITEM.captures(line) {
            let marker_indent = indent_width(caps.get(1).map_or("", |m| m.as_str()));
            let marker = caps.get(2).map_or("", |m| m.as_str());
            let spacing = caps.get(3).map_or(1, |m| indent_width(m.as_str()));
            let text = caps.get(4).map_or("", |m| m.as_str().trim_end());
            self.start_item(line_no, marker_indent, marker.len(), spacing, text);
        } else if let Some(text) = heading_text(line) {
            self.end_blocks_at(indent);
            self.events.push(BlockEvent::Text {
                line: line_no,
                text,
            });
        } else if !self.continue_item(line, indent) {
            self.end_blocks_at(indent);
            let text = line.trim().trim_start_matches('>').trim();
            self.events.push(BlockEvent::Text {
                line: line_no,
                text: text.to_string(),
            });
        }

        self.after_blank = false;
    }

    fn start_item(&mut self, line_no: usize, indent: usize, marker_len: usize, spacing: usize, text: &str) {
        self.flush_item();

        // More than four spaces after the marker means indented code; the
        // content column then sits one space past the marker.
        let spacing = if text.is_empty() || spacing > 4 { 1 } else { spacing };
        let content_col = indent + marker_len + spacing;

        while self.open.last().is_some_and(|&col| col > indent) {
            self.open.pop();
        }
        self.open.push(content_col);

        self.current = Some(PendingItem {
            line: line_no,
            indent,
            content_col,
            lines: vec![text.to_string()],
        });
    }

    /// Attach a paragraph line to the current item if it belongs there.
    fn continue_item(&mut self, line: &str, indent: usize) -> bool {
        let Some(item) = self.current.as_mut() else {
            return false;
        };
        if line.trim_start().starts_with('>') || indent <= item.indent {
            return false;
        }
        if self.after_blank && indent < item.content_col {
            return false;
        }
        item.lines
            .push(strip_columns(line, item.content_col).trim_end().to_string());
        true
    }

    /// A non-item block starts at `indent`: close the items it is not part of.
    fn end_blocks_at(&mut self, indent: usize) {
        self.flush_item();
        let had_open = !self.open.is_empty();
        while self.open.last().is_some_and(|&col| col > indent) {
            self.open.pop();
        }
        if had_open && self.open.is_empty() {
            self.events.push(BlockEvent::ListEnd);
        }
    }

    fn flush_item(&mut self) {
        if let Some(item) = self.current.take() {
            self.events.push(BlockEvent::Item(ListItem {
                line: item.line,
                indent: item.indent,
                text: item.lines.join("\n"),
            }));
        }
    }

    fn finish(mut self) -> Vec<BlockEvent> {
        self.flush_item();
        if !self.open.is_empty() {
            self.events.push(BlockEvent::ListEnd);
        }
        self.events
    }
}

/// ATX heading text without the `#` markers.
fn heading_text(line: &str) -> Option<String> {
    if indent_width(line) > 3 {
        return None;
    }
    let trimmed = line.trim_start();
    let hashes = trimmed.chars().take_while(|&c| c == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &trimmed[hashes..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    Some(rest.trim().trim_end_matches('#').trim_end().to_string())
}

/// Width of leading whitespace, tabs advancing to the next multiple of 4.
fn indent_width(s: &str) -> usize {
    let mut width = 0;
    for c in s.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += 4 - width % 4,
            _ => break,
        }
    }
    width
}

/// Drop up to `cols` columns of leading whitespace.
fn strip_columns(line: &str, cols: usize) -> &str {
    let mut width = 0;
    for (idx, c) in line.char_indices() {
        if width >= cols {
            return &line[idx..];
        }
        match c {
            ' ' => width += 1,
            '\t' => width += 4 - width % 4,
            _ => return &line[idx..],
        }
    }
    ""
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn items(content: &str) -> Vec<ListItem> {
        scan_blocks(content)
            .into_iter()
            .filter_map(|e| match e {
                BlockEvent::Item(item) => Some(item),
                _ => None,
            })
            .collect()
    }

    fn text(line: usize, s: &str) -> BlockEvent {
        BlockEvent::Text {
            line,
            text: s.to_string(),
        }
    }

    fn item(line: usize, indent: usize, s: &str) -> BlockEvent {
        BlockEvent::Item(ListItem {
            line,
            indent,
            text: s.to_string(),
        })
    }

    #[test]
    fn test_simple_list() {
        let events = scan_blocks("Intro\n\n- one\n- two\n\nOutro");
        assert_eq!(
            events,
            vec![
                text(1, "Intro"),
                item(3, 0, "one"),
                item(4, 0, "two"),
                BlockEvent::ListEnd,
                text(6, "Outro"),
            ]
        );
    }

    #[test]
    fn test_list_markers() {
        let found = items("* star\n+ plus\n1. first\n2) second\n-nospace\n-");
        let texts: Vec<_> = found.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["star", "plus", "first", "second", ""]);
    }

    #[test]
    fn test_nested_items_end_list_once() {
        let events = scan_blocks("- parent\n  - child\n    - grandchild\n- sibling\n\ndone");
        let ends = events.iter().filter(|e| **e == BlockEvent::ListEnd).count();
        assert_eq!(ends, 1);
        let found = items("- parent\n  - child\n    - grandchild");
        assert_eq!(found[1].indent, 2);
        assert_eq!(found[2].indent, 4);
    }

    #[test]
    fn test_continuation_keeps_relative_indent() {
        let found = items("- [ ] write report\n      with charts\n    and tables\n");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "[ ] write report\n    with charts\n  and tables");
    }

    #[test]
    fn test_unindented_line_ends_item() {
        let events = scan_blocks("- tags:\ntags:\n- a");
        assert_eq!(
            events,
            vec![
                item(1, 0, "tags:"),
                BlockEvent::ListEnd,
                text(2, "tags:"),
                item(3, 0, "a"),
                BlockEvent::ListEnd,
            ]
        );
    }

    #[test]
    fn test_no_lazy_continuation() {
        let events = scan_blocks("- [ ] buy milk\nand eggs");
        assert_eq!(
            events,
            vec![item(1, 0, "[ ] buy milk"), BlockEvent::ListEnd, text(2, "and eggs")]
        );
    }

    #[test]
    fn test_paragraph_after_blank_inside_item() {
        let found = items("- first\n\n  second paragraph\n- next");
        assert_eq!(found[0].text, "first\nsecond paragraph");
        assert_eq!(found[1].text, "next");
    }

    #[test]
    fn test_fenced_code_is_skipped() {
        let events = scan_blocks("```md\n- [ ] not a task\ntags:\n```\n- real");
        assert_eq!(events, vec![item(5, 0, "real"), BlockEvent::ListEnd]);
    }

    #[test]
    fn test_unclosed_fence_swallows_rest() {
        let events = scan_blocks("~~~\n- hidden");
        assert!(events.is_empty());
    }

    #[test]
    fn test_heading_and_thematic_break_close_list() {
        let events = scan_blocks("- a\n## Tags:\n- b\n---\n");
        assert_eq!(
            events,
            vec![
                item(1, 0, "a"),
                BlockEvent::ListEnd,
                text(2, "Tags:"),
                item(3, 0, "b"),
                BlockEvent::ListEnd,
            ]
        );
    }

    #[test]
    fn test_frontmatter_style_tags() {
        let events = scan_blocks("---\ntitle: Note\ntags:\n  - weekly\n---\nBody");
        assert_eq!(
            events,
            vec![
                text(2, "title: Note"),
                text(3, "tags:"),
                item(4, 2, "weekly"),
                BlockEvent::ListEnd,
                text(6, "Body"),
            ]
        );
    }

    #[test]
    fn test_hash_tag_is_not_heading() {
        assert_eq!(heading_text("#tag"), None);
        assert_eq!(heading_text("## Title ##"), Some("Title".to_string()));
        assert_eq!(heading_text("#"), Some(String::new()));
    }

    #[test]
    fn test_indent_helpers() {
        assert_eq!(indent_width("\t- x"), 4);
        assert_eq!(indent_width("  \tx"), 4);
        assert_eq!(strip_columns("      x", 2), "    x");
        assert_eq!(strip_columns(" x", 4), "x");
    }
}
