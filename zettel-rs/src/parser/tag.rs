//! Tag counting for `tags:` sections.

use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;

/// Occurrence counts per tag, remembering first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagCounts {
    order: Vec<String>,
    counts: HashMap<String, usize>,
}

impl TagCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one occurrence of the tag named by a list item.
    ///
    /// Only the first line of the item counts. The name is trimmed and
    /// NFC-normalized; empty names are ignored.
    pub fn parse_tag(&mut self, item_text: &str) {
        let first = item_text.lines().next().unwrap_or("").trim();
        if first.is_empty() {
            return;
        }
        let name: String = first.nfc().collect();
        match self.counts.get_mut(&name) {
            Some(count) => *count += 1,
            None => {
                self.order.push(name.clone());
                self.counts.insert(name, 1);
            }
        }
    }

    /// Occurrences of `tag`, 0 if never seen.
    pub fn count(&self, tag: &str) -> usize {
        let name: String = tag.trim().nfc().collect();
        self.counts.get(&name).copied().unwrap_or(0)
    }

    /// Distinct tags in first-seen order.
    pub fn tags(&self) -> &[String] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.order
            .iter()
            .map(|name| (name.as_str(), self.counts.get(name).copied().unwrap_or(0)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Totals per root segment (`project/apollo` counts toward `project`),
    /// in first-seen order of the roots.
    pub fn by_root(&self) -> Vec<(String, usize)> {
        let mut roots: Vec<(String, usize)> = Vec::new();
        for (name, count) in self.iter() {
            let root = name.split('/').next().unwrap_or(name);
            match roots.iter_mut().find(|(r, _)| r == root) {
                Some((_, total)) => *total += count,
                None => roots.push((root.to_string(), count)),
            }
        }
        roots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_counts_and_order() {
        let mut tags = TagCounts::new();
        tags.parse_tag("weekly");
        tags.parse_tag("  project/apollo ");
        tags.parse_tag("weekly");
        tags.parse_tag("   ");

        assert_eq!(tags.len(), 2);
        assert_eq!(tags.tags(), &["weekly".to_string(), "project/apollo".to_string()]);
        assert_eq!(tags.count("weekly"), 2);
        assert_eq!(tags.count("project/apollo"), 1);
        assert_eq!(tags.count("missing"), 0);
    }

    #[test]
    fn test_first_line_only() {
        let mut tags = TagCounts::new();
        tags.parse_tag("review\nstatus: draft");
        assert_eq!(tags.tags(), &["review".to_string()]);
    }

    #[test]
    fn test_nfc_forms_count_together() {
        let mut tags = TagCounts::new();
        tags.parse_tag("caf\u{e9}");
        tags.parse_tag("cafe\u{301}");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.count("cafe\u{301}"), 2);
    }

    #[test]
    fn test_by_root() {
        let mut tags = TagCounts::new();
        tags.parse_tag("project/apollo");
        tags.parse_tag("area");
        tags.parse_tag("project/gemini");
        tags.parse_tag("project/gemini");
        assert_eq!(
            tags.by_root(),
            vec![("project".to_string(), 3), ("area".to_string(), 1)]
        );
    }
}
