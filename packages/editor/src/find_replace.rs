//! Case-insensitive find and replace.
//!
//! Matching is leaf-local: an occurrence split across two leaves (say, half
//! bold) is not found.

use crate::mutations::{Applied, MutationError};
use crate::selection::Range;
use inkpad_common::VisitorMut;
use inkpad_parser::{ContentTree, NodeId, TextLeaf};
use regex::{NoExpand, Regex, RegexBuilder};

/// Literal, case-insensitive pattern for a search term
pub fn search_pattern(search: &str) -> Result<Regex, MutationError> {
    RegexBuilder::new(&regex::escape(search))
        .case_insensitive(true)
        .build()
        .map_err(|e| MutationError::InvalidPattern(e.to_string()))
}

struct Replacer<'a> {
    pattern: Regex,
    replacement: &'a str,
    count: usize,
}

impl VisitorMut for Replacer<'_> {
    fn visit_leaf_mut(&mut self, _id: NodeId, leaf: &mut TextLeaf) {
        let found = self.pattern.find_iter(&leaf.text).count();
        if found == 0 {
            return;
        }
        leaf.text = self
            .pattern
            .replace_all(&leaf.text, NoExpand(self.replacement))
            .into_owned();
        self.count += found;
    }
}

/// Occurrences of `search` across all leaves
pub fn count_matches(tree: &ContentTree, search: &str) -> Result<usize, MutationError> {
    if search.is_empty() {
        return Ok(0);
    }
    let pattern = search_pattern(search)?;
    Ok(tree
        .leaves()
        .into_iter()
        .filter_map(|id| tree.leaf(id))
        .map(|leaf| pattern.find_iter(&leaf.text).count())
        .sum())
}

pub(crate) fn find_and_replace(
    tree: &mut ContentTree,
    search: &str,
    replacement: &str,
    selection: Option<Range>,
) -> Result<Applied, MutationError> {
    if search.is_empty() {
        return Ok(Applied::unchanged(selection));
    }

    let mut replacer = Replacer {
        pattern: search_pattern(search)?,
        replacement,
        count: 0,
    };
    replacer.visit_tree_mut(tree);

    Ok(Applied {
        changed: replacer.count > 0,
        selection: selection.and_then(|range| range.clamp(tree)),
        replacements: replacer.count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkpad_parser::parse_content;

    #[test]
    fn test_replaces_every_occurrence_case_insensitively() {
        let mut tree = parse_content(
            r#"[{ "type": "paragraph", "children": [{ "text": "The cat sat on the mat", "italic": true }] }]"#,
        )
        .unwrap();

        let applied = find_and_replace(&mut tree, "at", "AT", None).unwrap();
        assert_eq!(applied.replacements, 3);

        let leaf = tree.leaf(tree.leaves()[0]).unwrap();
        assert_eq!(leaf.text, "The cAT sAT on the mAT");
        assert!(leaf.italic);
    }

    #[test]
    fn test_search_is_literal() {
        let mut tree = parse_content(
            r#"[{ "type": "paragraph", "children": [{ "text": "cost: $5 (approx.)" }] }]"#,
        )
        .unwrap();

        assert_eq!(count_matches(&tree, "(APPROX.)").unwrap(), 1);
        find_and_replace(&mut tree, "$5", "$10", None).unwrap();
        assert_eq!(tree.block_text(tree.roots()[0]), "cost: $10 (approx.)");
    }

    #[test]
    fn test_matches_do_not_span_leaves() {
        let mut tree = parse_content(
            r#"[{ "type": "paragraph", "children": [{ "text": "ca", "bold": true }, { "text": "t" }] }]"#,
        )
        .unwrap();
        let applied = find_and_replace(&mut tree, "cat", "dog", None).unwrap();
        assert!(!applied.changed);
    }

    #[test]
    fn test_empty_search_is_noop() {
        let mut tree = ContentTree::with_empty_paragraph();
        let applied = find_and_replace(&mut tree, "", "x", None).unwrap();
        assert_eq!(applied, Applied::unchanged(None));
    }
}
