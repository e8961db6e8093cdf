//! Caret-level text editing: typing, backspace, enter and paste

use crate::mutations::{Applied, MutationError};
use crate::selection::{Point, Range};
use crate::transforms::{
    block_len, block_offset, byte_index, insert_after, lift_list_item, merge_leaves, point_at,
    split_leaf,
};
use inkpad_parser::{sanitize_html, BlockKind, ContentTree, NodeId};
use unicode_segmentation::UnicodeSegmentation;

pub(crate) fn insert_text(
    tree: &mut ContentTree,
    text: &str,
    selection: Option<Range>,
) -> Result<Applied, MutationError> {
    let Some(range) = selection else {
        return Ok(Applied::unchanged(None));
    };
    if text.is_empty() {
        return Ok(Applied::unchanged(Some(range)));
    }

    let point = range.start(tree);
    let leaf = tree
        .leaf_mut(point.leaf)
        .ok_or(MutationError::NodeNotFound(point.leaf))?;
    let at = byte_index(&leaf.text, point.offset);
    leaf.text.insert_str(at, text);

    Ok(Applied::changed(Some(Range::caret(
        point.leaf,
        point.offset + text.chars().count(),
    ))))
}

pub(crate) fn delete_backward(
    tree: &mut ContentTree,
    selection: Option<Range>,
) -> Result<Applied, MutationError> {
    let Some(range) = selection else {
        return Ok(Applied::unchanged(None));
    };
    if !range.is_collapsed() {
        return Ok(Applied::unchanged(Some(range)));
    }
    let Some((block, offset)) = block_offset(tree, range.anchor) else {
        return Ok(Applied::unchanged(Some(range)));
    };

    if offset == 0 {
        return Ok(delete_at_block_start(tree, block, range));
    }

    let Some(removed) = remove_grapheme_before(tree, block, offset) else {
        return Ok(Applied::unchanged(Some(range)));
    };
    merge_leaves(tree, block);
    let caret = point_at(tree, block, offset - removed).map(Range::collapsed);
    Ok(Applied::changed(caret))
}

/// Remove the grapheme ending at block offset `offset`; returns its char length
fn remove_grapheme_before(tree: &mut ContentTree, block: NodeId, offset: usize) -> Option<usize> {
    let mut start = 0;
    for child in tree.children(block).to_vec() {
        let Some(len) = tree.leaf(child).map(|leaf| leaf.char_len()) else {
            continue;
        };
        if offset > start && offset <= start + len {
            let leaf = tree.leaf_mut(child)?;
            let end = byte_index(&leaf.text, offset - start);
            let (from, grapheme) = leaf.text[..end].grapheme_indices(true).next_back()?;
            let removed = grapheme.chars().count();
            leaf.text.replace_range(from..end, "");
            return Some(removed);
        }
        start += len;
    }
    None
}

/// Backspace with the caret at the very start of a text block
fn delete_at_block_start(tree: &mut ContentTree, block: NodeId, range: Range) -> Applied {
    match tree.kind(block) {
        // Outdent before merging
        Some(BlockKind::ListItem) => {
            if lift_list_item(tree, block) {
                Applied::changed(Some(range))
            } else {
                Applied::unchanged(Some(range))
            }
        }
        Some(BlockKind::Paragraph) => merge_into_previous(tree, block, range),
        _ => Applied::unchanged(Some(range)),
    }
}

fn merge_into_previous(tree: &mut ContentTree, block: NodeId, range: Range) -> Applied {
    let blocks = tree.text_blocks();
    let previous = blocks
        .iter()
        .position(|id| *id == block)
        .and_then(|index| index.checked_sub(1))
        .map(|index| blocks[index]);
    let Some(previous) = previous else {
        // Document start
        return Applied::unchanged(Some(range));
    };

    if tree.kind(previous) == Some(BlockKind::TableCell) {
        // Never pull text into a cell; an empty paragraph after a table goes away
        if block_len(tree, block) > 0 {
            return Applied::unchanged(Some(range));
        }
        let caret = Point::end_of(tree, previous).map(Range::collapsed);
        tree.remove_subtree(block);
        return Applied::changed(caret);
    }

    let joint = block_len(tree, previous);
    for child in tree.children(block).to_vec() {
        tree.detach(child);
        let index = tree.children(previous).len();
        tree.insert_child(previous, index, child);
    }
    tree.remove_subtree(block);
    merge_leaves(tree, previous);

    Applied::changed(point_at(tree, previous, joint).map(Range::collapsed))
}

pub(crate) fn insert_break(
    tree: &mut ContentTree,
    selection: Option<Range>,
) -> Result<Applied, MutationError> {
    let Some(range) = selection else {
        return Ok(Applied::unchanged(None));
    };
    if !range.is_collapsed() {
        return Ok(Applied::unchanged(Some(range)));
    }
    let Some((block, offset)) = block_offset(tree, range.anchor) else {
        return Ok(Applied::unchanged(Some(range)));
    };

    match tree.kind(block) {
        Some(BlockKind::TableCell) => insert_text(tree, "\n", Some(range)),
        Some(BlockKind::Paragraph | BlockKind::ListItem) => {
            let caret = split_block(tree, block, offset)
                .and_then(|next| Point::start_of(tree, next))
                .map(Range::collapsed);
            Ok(Applied::changed(caret))
        }
        _ => Ok(Applied::unchanged(Some(range))),
    }
}

/// Split a text block at a block offset into two siblings of the same kind
fn split_block(tree: &mut ContentTree, block: NodeId, offset: usize) -> Option<NodeId> {
    let point = point_at(tree, block, offset)?;
    let right = split_leaf(tree, point.leaf, point.offset)?;
    let index = tree.index_in_parent(right)?;

    let moved: Vec<NodeId> = tree.children(block)[index..].to_vec();
    for id in &moved {
        tree.detach(*id);
    }
    let element = tree.block(block)?.element.clone();
    let next = tree.alloc_block(element, moved);
    insert_after(tree, block, next);

    merge_leaves(tree, block);
    merge_leaves(tree, next);
    Some(next)
}

pub(crate) fn insert_fragment(
    tree: &mut ContentTree,
    lines: &[String],
    selection: Option<Range>,
) -> Result<Applied, MutationError> {
    let lines: Vec<String> = lines.iter().map(|line| sanitize_html(line)).collect();
    if lines.is_empty() {
        return Ok(Applied::unchanged(selection));
    }

    if let (Some(range), [line]) = (selection, lines.as_slice()) {
        return insert_text(tree, line, Some(range));
    }

    let index = selection
        .and_then(|range| fragment_index(tree, range))
        .unwrap_or(tree.roots().len());

    let mut last = None;
    for (offset, line) in lines.iter().enumerate() {
        let paragraph = tree.paragraph(line);
        tree.insert_root(index + offset, paragraph);
        last = Some(paragraph);
    }

    let caret = last
        .and_then(|paragraph| Point::end_of(tree, paragraph))
        .map(Range::collapsed);
    Ok(Applied::changed(caret))
}

/// Root index for pasted paragraphs. A caret inside a top-level paragraph
/// splits it; anywhere else the lines go after the caret's top-level block.
fn fragment_index(tree: &mut ContentTree, range: Range) -> Option<usize> {
    let start = range.start(tree);
    let top = tree.top_level(start.leaf);
    let index = tree.index_in_parent(top)?;

    let Some((block, offset)) = block_offset(tree, start) else {
        return Some(index + 1);
    };
    if block != top || tree.kind(block) != Some(BlockKind::Paragraph) {
        return Some(index + 1);
    }

    if offset >= block_len(tree, block) {
        Some(index + 1)
    } else if offset == 0 {
        Some(index)
    } else {
        split_block(tree, block, offset)?;
        Some(index + 1)
    }
}
