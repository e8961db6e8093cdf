//! # Note Statistics
//!
//! Pure, read-only counts derived from a content tree.

use inkpad_common::{walk_block, Visitor};
use inkpad_parser::{Block, BlockKind, ContentTree, NodeId, TextLeaf};
use serde::{Deserialize, Serialize};

/// Words per minute used for the reading-time estimate
pub const WORDS_PER_MINUTE: usize = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteStats {
    pub word_count: usize,
    /// Chars across all leaves
    pub character_count: usize,
    /// Minutes, rounded up
    pub reading_time: usize,
    pub table_count: usize,
    /// Always 0: notes have no code-block kind
    pub code_block_count: usize,
}

#[derive(Default)]
struct StatsCollector {
    words: usize,
    characters: usize,
    tables: usize,
}

impl Visitor for StatsCollector {
    fn visit_block(&mut self, tree: &ContentTree, _id: NodeId, block: &Block) {
        if block.kind() == BlockKind::Table {
            self.tables += 1;
        }
        walk_block(self, tree, block);
    }

    fn visit_leaf(&mut self, _tree: &ContentTree, _id: NodeId, leaf: &TextLeaf) {
        self.characters += leaf.char_len();
        self.words += leaf.text.split_whitespace().count();
    }
}

pub fn stats(tree: &ContentTree) -> NoteStats {
    let mut collector = StatsCollector::default();
    collector.visit_tree(tree);

    NoteStats {
        word_count: collector.words,
        character_count: collector.characters,
        reading_time: collector.words.div_ceil(WORDS_PER_MINUTE),
        table_count: collector.tables,
        code_block_count: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkpad_parser::parse_content;

    #[test]
    fn test_hello_world() {
        let tree = parse_content(
            r#"[{ "type": "paragraph", "children": [{ "text": "hello world" }] }]"#,
        )
        .unwrap();
        let result = stats(&tree);
        assert_eq!(result.word_count, 2);
        assert_eq!(result.character_count, 11);
        assert_eq!(result.reading_time, 1);
        assert_eq!(result, stats(&tree));
    }

    #[test]
    fn test_words_are_counted_per_leaf() {
        // "bold" and "face" sit in different leaves and count as two words
        let tree = parse_content(
            r#"[
                { "type": "paragraph", "children": [{ "text": "bold", "bold": true }, { "text": "face " }] },
                { "type": "table", "children": [
                    { "type": "table-row", "children": [
                        { "type": "table-cell", "children": [{ "text": "  a  b " }] }
                    ]}
                ]}
            ]"#,
        )
        .unwrap();
        let result = stats(&tree);
        assert_eq!(result.word_count, 4);
        assert_eq!(result.table_count, 1);
        assert_eq!(result.code_block_count, 0);
    }

    #[test]
    fn test_empty_note() {
        let result = stats(&ContentTree::with_empty_paragraph());
        assert_eq!(result, NoteStats::default());
    }

    #[test]
    fn test_reading_time_rounds_up() {
        let text = vec!["word"; 201].join(" ");
        let tree = parse_content(&format!(
            r#"[{{ "type": "paragraph", "children": [{{ "text": "{text}" }}] }}]"#
        ))
        .unwrap();
        assert_eq!(stats(&tree).reading_time, 2);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(stats(&ContentTree::with_empty_paragraph())).unwrap();
        assert!(json.get("wordCount").is_some());
        assert!(json.get("codeBlockCount").is_some());
    }
}
