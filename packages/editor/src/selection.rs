//! # Selection
//!
//! Ephemeral caret/span positions handed in by the editing surface.
//! A [`Point`] names a text leaf and a char offset inside it; a [`Range`] is
//! an anchor/focus pair in the order the user made it, so the focus may sit
//! before the anchor.

use crate::mutations::MutationError;
use inkpad_parser::{ContentTree, NodeId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub leaf: NodeId,
    /// Offset in chars
    pub offset: usize,
}

impl Point {
    pub fn new(leaf: NodeId, offset: usize) -> Self {
        Self { leaf, offset }
    }

    /// First position inside a block
    pub fn start_of(tree: &ContentTree, node: NodeId) -> Option<Self> {
        let leaf = *tree.leaves_in(node).first()?;
        Some(Self::new(leaf, 0))
    }

    /// Last position inside a block
    pub fn end_of(tree: &ContentTree, node: NodeId) -> Option<Self> {
        let leaf = *tree.leaves_in(node).last()?;
        let len = tree.leaf(leaf)?.char_len();
        Some(Self::new(leaf, len))
    }

    /// Build a point from a child-index path that must end at a leaf
    pub fn from_path(tree: &ContentTree, path: &[usize], offset: usize) -> Option<Self> {
        let leaf = tree.node_at_path(path)?;
        tree.is_leaf(leaf).then_some(Self::new(leaf, offset))
    }

    pub fn path(&self, tree: &ContentTree) -> Option<Vec<usize>> {
        tree.path(self.leaf)
    }

    pub fn validate(&self, tree: &ContentTree) -> Result<(), MutationError> {
        let leaf = tree
            .leaf(self.leaf)
            .ok_or(MutationError::NodeNotFound(self.leaf))?;
        if tree.path(self.leaf).is_none() {
            return Err(MutationError::NodeNotFound(self.leaf));
        }
        if self.offset > leaf.char_len() {
            return Err(MutationError::InvalidSelection(format!(
                "offset {} past end of leaf {} ({} chars)",
                self.offset,
                self.leaf,
                leaf.char_len()
            )));
        }
        Ok(())
    }

    /// Same point with the offset clamped to the leaf; None if the leaf is gone
    pub(crate) fn clamp(self, tree: &ContentTree) -> Option<Self> {
        tree.path(self.leaf)?;
        let len = tree.leaf(self.leaf)?.char_len();
        Some(Self::new(self.leaf, self.offset.min(len)))
    }
}

/// Document order of two points
pub fn compare_points(tree: &ContentTree, a: &Point, b: &Point) -> Ordering {
    if a.leaf == b.leaf {
        return a.offset.cmp(&b.offset);
    }
    let leaves = tree.leaves();
    let position = |leaf: NodeId| leaves.iter().position(|id| *id == leaf);
    position(a.leaf).cmp(&position(b.leaf))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub anchor: Point,
    pub focus: Point,
}

impl Range {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self::new(point, point)
    }

    pub fn caret(leaf: NodeId, offset: usize) -> Self {
        Self::collapsed(Point::new(leaf, offset))
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// `(start, end)` in document order
    pub fn edges(&self, tree: &ContentTree) -> (Point, Point) {
        match compare_points(tree, &self.anchor, &self.focus) {
            Ordering::Greater => (self.focus, self.anchor),
            _ => (self.anchor, self.focus),
        }
    }

    pub fn start(&self, tree: &ContentTree) -> Point {
        self.edges(tree).0
    }

    pub fn validate(&self, tree: &ContentTree) -> Result<(), MutationError> {
        self.anchor.validate(tree)?;
        self.focus.validate(tree)
    }

    pub(crate) fn clamp(self, tree: &ContentTree) -> Option<Self> {
        Some(Self::new(self.anchor.clamp(tree)?, self.focus.clamp(tree)?))
    }
}
