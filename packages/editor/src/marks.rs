//! Inline mark toggling

use crate::mutations::{Applied, MutationError};
use crate::selection::Range;
use crate::transforms::{merge_leaves, selected_spans, split_leaf, text_block, BlockRange};
use inkpad_parser::{ContentTree, MarkFormat, NodeId};

/// Whether every selected leaf carries the mark. A caret reports the mark
/// of the leaf it sits in.
pub(crate) fn is_mark_active(tree: &ContentTree, format: MarkFormat, range: &Range) -> bool {
    if range.is_collapsed() {
        return tree
            .leaf(range.anchor.leaf)
            .is_some_and(|leaf| leaf.has_mark(format));
    }
    let spans = selected_spans(tree, range);
    !spans.is_empty()
        && spans
            .iter()
            .all(|(id, _, _)| tree.leaf(*id).is_some_and(|leaf| leaf.has_mark(format)))
}

pub(crate) fn toggle_mark(
    tree: &mut ContentTree,
    format: MarkFormat,
    color: Option<&str>,
    selection: Option<Range>,
) -> Result<Applied, MutationError> {
    let Some(range) = selection else {
        return Ok(Applied::unchanged(None));
    };
    if range.is_collapsed() {
        return Ok(Applied::unchanged(Some(range)));
    }

    let spans = selected_spans(tree, &range);
    if spans.is_empty() {
        return Ok(Applied::unchanged(Some(range)));
    }
    let anchor = BlockRange::capture(tree, &range);

    let mut blocks: Vec<NodeId> = Vec::new();
    let mut targets = Vec::with_capacity(spans.len());
    for (leaf, start, end) in spans {
        if let Some(block) = text_block(tree, leaf) {
            if !blocks.contains(&block) {
                blocks.push(block);
            }
        }
        let len = tree.leaf(leaf).map_or(0, |data| data.char_len());
        if end < len {
            split_leaf(tree, leaf, end);
        }
        let target = if start > 0 {
            split_leaf(tree, leaf, start)
        } else {
            Some(leaf)
        };
        targets.extend(target);
    }

    let active = targets
        .iter()
        .all(|id| tree.leaf(*id).is_some_and(|leaf| leaf.has_mark(format)));
    let clear = match (format, color) {
        (MarkFormat::BackgroundColor, None) => true,
        (MarkFormat::BackgroundColor, Some(color)) => {
            active
                && targets.iter().all(|id| {
                    tree.leaf(*id)
                        .is_some_and(|leaf| leaf.background_color.as_deref() == Some(color))
                })
        }
        _ => active,
    };

    let mut changed = false;
    for id in &targets {
        if let Some(leaf) = tree.leaf_mut(*id) {
            let before = leaf.clone();
            if clear {
                leaf.clear_mark(format);
            } else {
                leaf.set_mark(format, color);
            }
            changed |= *leaf != before;
        }
    }

    for block in blocks {
        merge_leaves(tree, block);
    }

    let selection = anchor
        .and_then(|anchor| anchor.resolve(tree))
        .or(Some(range));
    Ok(Applied {
        changed,
        selection,
        replacements: 0,
    })
}
