//! Structural edit primitives shared by the mutation operations.
//!
//! Operations that restructure leaves record positions as
//! `(text block, char offset)` first and resolve them back to leaf points
//! afterwards, since merging and splitting leaves changes which leaf a
//! position falls in.

use crate::selection::{Point, Range};
use inkpad_parser::{BlockKind, ContentTree, Element, NodeId, TextLeaf};

/// Byte index of the `offset`-th char (clamped to the end)
pub(crate) fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}

/// Insert a detached node under `parent`, or into the roots
pub(crate) fn insert_at(tree: &mut ContentTree, parent: Option<NodeId>, index: usize, id: NodeId) {
    match parent {
        Some(parent) => {
            tree.insert_child(parent, index, id);
        }
        None => tree.insert_root(index, id),
    }
}

/// Insert a detached node right after `anchor` in the same sequence
pub(crate) fn insert_after(tree: &mut ContentTree, anchor: NodeId, id: NodeId) {
    let parent = tree.parent(anchor);
    let index = tree
        .index_in_parent(anchor)
        .map_or(usize::MAX, |index| index + 1);
    insert_at(tree, parent, index, id);
}

/// The text-holding block a leaf belongs to
pub(crate) fn text_block(tree: &ContentTree, leaf: NodeId) -> Option<NodeId> {
    tree.parent(leaf)
        .filter(|parent| tree.kind(*parent).is_some_and(BlockKind::holds_text))
}

pub(crate) fn block_len(tree: &ContentTree, block: NodeId) -> usize {
    tree.children(block)
        .iter()
        .filter_map(|child| tree.leaf(*child))
        .map(TextLeaf::char_len)
        .sum()
}

/// Char offset of `point` from the start of its text block
pub(crate) fn block_offset(tree: &ContentTree, point: Point) -> Option<(NodeId, usize)> {
    let block = text_block(tree, point.leaf)?;
    let mut offset = 0;
    for child in tree.children(block) {
        if *child == point.leaf {
            return Some((block, offset + point.offset));
        }
        offset += tree.leaf(*child).map_or(0, TextLeaf::char_len);
    }
    None
}

/// Resolve a block-relative offset to a leaf point. Offsets on a leaf
/// boundary resolve to the end of the earlier leaf.
pub(crate) fn point_at(tree: &ContentTree, block: NodeId, offset: usize) -> Option<Point> {
    let mut remaining = offset;
    let mut last = None;
    for child in tree.children(block) {
        let Some(leaf) = tree.leaf(*child) else {
            continue;
        };
        let len = leaf.char_len();
        if remaining <= len {
            return Some(Point::new(*child, remaining));
        }
        remaining -= len;
        last = Some(Point::new(*child, len));
    }
    last
}

/// Block-relative form of a range, used across leaf restructuring
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlockRange {
    anchor: (NodeId, usize),
    focus: (NodeId, usize),
}

impl BlockRange {
    pub(crate) fn capture(tree: &ContentTree, range: &Range) -> Option<Self> {
        Some(Self {
            anchor: block_offset(tree, range.anchor)?,
            focus: block_offset(tree, range.focus)?,
        })
    }

    pub(crate) fn resolve(&self, tree: &ContentTree) -> Option<Range> {
        let anchor = point_at(tree, self.anchor.0, self.anchor.1)?;
        let focus = point_at(tree, self.focus.0, self.focus.1)?;
        Some(Range::new(anchor, focus))
    }
}

/// Split a leaf at a char offset. The right half becomes a new sibling leaf
/// carrying the same marks.
pub(crate) fn split_leaf(tree: &mut ContentTree, leaf: NodeId, offset: usize) -> Option<NodeId> {
    let data = tree.leaf_mut(leaf)?;
    let at = byte_index(&data.text, offset);
    let right_text = data.text.split_off(at);
    let right = data.with_text(right_text);
    let id = tree.alloc_leaf(right);
    insert_after(tree, leaf, id);
    Some(id)
}

/// Merge neighbouring leaves with identical marks and drop empty leaves.
/// A block always keeps at least one leaf.
pub(crate) fn merge_leaves(tree: &mut ContentTree, block: NodeId) {
    let children = tree.children(block).to_vec();
    let mut previous: Option<NodeId> = None;

    for child in children {
        let Some(leaf) = tree.leaf(child).cloned() else {
            previous = None;
            continue;
        };
        let Some(prev) = previous else {
            previous = Some(child);
            continue;
        };
        let Some(prev_leaf) = tree.leaf(prev).cloned() else {
            previous = Some(child);
            continue;
        };

        if leaf.text.is_empty() || prev_leaf.same_marks(&leaf) {
            if let Some(target) = tree.leaf_mut(prev) {
                target.text.push_str(&leaf.text);
            }
            tree.remove_subtree(child);
        } else if prev_leaf.text.is_empty() {
            tree.remove_subtree(prev);
            previous = Some(child);
        } else {
            previous = Some(child);
        }
    }
}

/// Move a list item out of its list as a paragraph in the list's place,
/// splitting the list around it. Returns false when `item` is not in a list.
pub(crate) fn lift_list_item(tree: &mut ContentTree, item: NodeId) -> bool {
    let Some(list) = tree.parent(item) else {
        return false;
    };
    let Some(list_kind) = tree.kind(list).filter(|kind| kind.is_list()) else {
        return false;
    };
    let Some(index) = tree.index_in_parent(item) else {
        return false;
    };

    let following: Vec<NodeId> = tree.children(list)[index + 1..].to_vec();
    for id in &following {
        tree.detach(*id);
    }
    tree.detach(item);
    if let Some(block) = tree.block_mut(item) {
        block.element = Element::Paragraph;
    }
    insert_after(tree, list, item);

    if !following.is_empty() {
        let tail = tree.alloc_block(Element::from_kind(list_kind), following);
        insert_after(tree, item, tail);
    }
    if tree.children(list).is_empty() {
        tree.remove_subtree(list);
    }
    true
}

/// Text blocks touched by a range, in document order
pub(crate) fn selected_text_blocks(tree: &ContentTree, range: &Range) -> Vec<NodeId> {
    let (start, end) = range.edges(tree);
    let (Some(first), Some(last)) = (text_block(tree, start.leaf), text_block(tree, end.leaf))
    else {
        return Vec::new();
    };

    let blocks = tree.text_blocks();
    let from = blocks.iter().position(|id| *id == first);
    let to = blocks.iter().position(|id| *id == last);
    match (from, to) {
        (Some(from), Some(to)) if from <= to => blocks[from..=to].to_vec(),
        _ => Vec::new(),
    }
}

/// Leaves touched by a range with the selected char span of each.
/// Leaves with an empty overlap are skipped.
pub(crate) fn selected_spans(tree: &ContentTree, range: &Range) -> Vec<(NodeId, usize, usize)> {
    let (start, end) = range.edges(tree);
    let leaves = tree.leaves();
    let (Some(from), Some(to)) = (
        leaves.iter().position(|id| *id == start.leaf),
        leaves.iter().position(|id| *id == end.leaf),
    ) else {
        return Vec::new();
    };

    leaves[from..=to]
        .iter()
        .filter_map(|id| {
            let len = tree.leaf(*id)?.char_len();
            let span_start = if *id == start.leaf { start.offset } else { 0 };
            let span_end = if *id == end.leaf { end.offset.min(len) } else { len };
            (span_start < span_end).then_some((*id, span_start, span_end))
        })
        .collect()
}
