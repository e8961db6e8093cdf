//! Block format toggling (paragraph / bulleted list / numbered list)

use crate::mutations::{Applied, MutationError};
use crate::selection::Range;
use crate::transforms::{lift_list_item, selected_text_blocks};
use inkpad_parser::{BlockKind, ContentTree, Element, NodeId};

const TOGGLEABLE: [BlockKind; 3] = [
    BlockKind::Paragraph,
    BlockKind::BulletedList,
    BlockKind::NumberedList,
];

pub(crate) fn is_toggleable(kind: BlockKind) -> bool {
    TOGGLEABLE.contains(&kind)
}

/// Whether any selected text block is of `kind` or sits inside one
pub(crate) fn is_block_active(tree: &ContentTree, kind: BlockKind, range: &Range) -> bool {
    selected_text_blocks(tree, range)
        .iter()
        .any(|block| tree.closest(*block, kind).is_some())
}

pub(crate) fn toggle_block(
    tree: &mut ContentTree,
    kind: BlockKind,
    selection: Option<Range>,
) -> Result<Applied, MutationError> {
    let Some(range) = selection else {
        return Ok(Applied::unchanged(None));
    };

    // Table cells keep their kind
    let blocks: Vec<NodeId> = selected_text_blocks(tree, &range)
        .into_iter()
        .filter(|block| tree.kind(*block) != Some(BlockKind::TableCell))
        .collect();
    if blocks.is_empty() {
        return Ok(Applied::unchanged(Some(range)));
    }

    let before = tree.to_nodes();
    let active = blocks
        .iter()
        .any(|block| tree.closest(*block, kind).is_some());

    // Unwrap first so only the selected items leave their list
    for block in &blocks {
        if tree.kind(*block) == Some(BlockKind::ListItem) {
            lift_list_item(tree, *block);
        }
    }

    if kind.is_list() && !active {
        wrap_in_lists(tree, &blocks, kind);
    }

    // Leaves are only moved, so the selection still holds
    Ok(Applied {
        changed: tree.to_nodes() != before,
        selection: Some(range),
        replacements: 0,
    })
}

/// Wrap runs of adjacent root paragraphs into new lists of `kind`
fn wrap_in_lists(tree: &mut ContentTree, blocks: &[NodeId], kind: BlockKind) {
    let mut runs: Vec<Vec<NodeId>> = Vec::new();
    let mut last_index: Option<usize> = None;

    for block in blocks {
        let index = tree.index_in_parent(*block);
        let is_root_paragraph =
            tree.parent(*block).is_none() && tree.kind(*block) == Some(BlockKind::Paragraph);
        let (true, Some(index)) = (is_root_paragraph, index) else {
            last_index = None;
            continue;
        };

        let extends = last_index.is_some_and(|previous| previous + 1 == index);
        if extends {
            if let Some(run) = runs.last_mut() {
                run.push(*block);
            }
        } else {
            runs.push(vec![*block]);
        }
        last_index = Some(index);
    }

    for run in runs {
        let Some(index) = run.first().and_then(|first| tree.index_in_parent(*first)) else {
            continue;
        };
        for block in &run {
            tree.detach(*block);
            if let Some(data) = tree.block_mut(*block) {
                data.element = Element::ListItem;
            }
        }
        let list = tree.alloc_block(Element::from_kind(kind), run);
        tree.insert_root(index, list);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Point;
    use inkpad_parser::parse_content;

    fn root_kinds(tree: &ContentTree) -> Vec<BlockKind> {
        tree.roots().iter().filter_map(|id| tree.kind(*id)).collect()
    }

    fn span(tree: &ContentTree, from: usize, to: usize) -> Range {
        let leaves = tree.leaves();
        Range::new(Point::new(leaves[from], 0), Point::new(leaves[to], 0))
    }

    #[test]
    fn test_paragraphs_become_one_list() {
        let mut tree = parse_content(
            r#"[
                { "type": "paragraph", "children": [{ "text": "a" }] },
                { "type": "paragraph", "children": [{ "text": "b" }] },
                { "type": "paragraph", "children": [{ "text": "c" }] }
            ]"#,
        )
        .unwrap();
        let range = span(&tree, 0, 1);

        let applied = toggle_block(&mut tree, BlockKind::BulletedList, Some(range)).unwrap();
        assert!(applied.changed);
        assert_eq!(root_kinds(&tree), vec![BlockKind::BulletedList, BlockKind::Paragraph]);
        let list = tree.roots()[0];
        assert_eq!(tree.children(list).len(), 2);
        assert!(is_block_active(&tree, BlockKind::BulletedList, &range));
    }

    #[test]
    fn test_switching_list_kind_splits_the_list() {
        let mut tree = parse_content(
            r#"[{ "type": "bulleted-list", "children": [
                { "type": "list-item", "children": [{ "text": "1" }] },
                { "type": "list-item", "children": [{ "text": "2" }] },
                { "type": "list-item", "children": [{ "text": "3" }] }
            ]}]"#,
        )
        .unwrap();
        let range = span(&tree, 1, 1);

        toggle_block(&mut tree, BlockKind::NumberedList, Some(range)).unwrap();
        assert_eq!(
            root_kinds(&tree),
            vec![
                BlockKind::BulletedList,
                BlockKind::NumberedList,
                BlockKind::BulletedList
            ]
        );
        assert_eq!(tree.block_text(tree.roots()[1]), "2");
    }

    #[test]
    fn test_deactivating_list_yields_paragraphs() {
        let mut tree = parse_content(
            r#"[{ "type": "numbered-list", "children": [
                { "type": "list-item", "children": [{ "text": "x" }] },
                { "type": "list-item", "children": [{ "text": "y" }] }
            ]}]"#,
        )
        .unwrap();
        let range = span(&tree, 0, 1);

        toggle_block(&mut tree, BlockKind::NumberedList, Some(range)).unwrap();
        assert_eq!(root_kinds(&tree), vec![BlockKind::Paragraph, BlockKind::Paragraph]);
    }

    #[test]
    fn test_paragraph_toggle_is_noop_on_paragraphs() {
        let mut tree = ContentTree::with_empty_paragraph();
        let range = span(&tree, 0, 0);
        let applied = toggle_block(&mut tree, BlockKind::Paragraph, Some(range)).unwrap();
        assert!(!applied.changed);
    }
}
