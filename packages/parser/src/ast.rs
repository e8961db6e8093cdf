//! # Content Tree
//!
//! Arena-backed representation of one note's body.
//!
//! Nodes live in a slot arena and are addressed by [`NodeId`]. Parent and
//! child links are stored as ids, so structural edits (wrap, unwrap, split,
//! merge) rewrite a handful of indices instead of shifting paths.
//!
//! ## Shape
//!
//! ```text
//! roots: [paragraph, bulleted-list, table, ...]
//!          │           │              │
//!        leaves    list-item...    table-row...
//!                      │              │
//!                    leaves       table-cell...
//!                                     │
//!                                   leaves
//! ```
//!
//! Ids of removed nodes are never handed out again within the same tree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle to a node in a [`ContentTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Block node discriminant (wire name is kebab-case)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Paragraph,
    BulletedList,
    NumberedList,
    ListItem,
    Table,
    TableRow,
    TableCell,
}

/// What a block kind may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildRule {
    /// Only text leaves
    Text,
    /// Only blocks of the given kind
    Block(BlockKind),
}

impl BlockKind {
    pub const ALL: [BlockKind; 7] = [
        BlockKind::Paragraph,
        BlockKind::BulletedList,
        BlockKind::NumberedList,
        BlockKind::ListItem,
        BlockKind::Table,
        BlockKind::TableRow,
        BlockKind::TableCell,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::BulletedList => "bulleted-list",
            BlockKind::NumberedList => "numbered-list",
            BlockKind::ListItem => "list-item",
            BlockKind::Table => "table",
            BlockKind::TableRow => "table-row",
            BlockKind::TableCell => "table-cell",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    pub fn is_list(self) -> bool {
        matches!(self, BlockKind::BulletedList | BlockKind::NumberedList)
    }

    /// Blocks whose children are text leaves
    pub fn holds_text(self) -> bool {
        matches!(self.child_rule(), ChildRule::Text)
    }

    /// Blocks whose children must be blocks of one specific kind
    pub fn is_container(self) -> bool {
        matches!(self.child_rule(), ChildRule::Block(_))
    }

    pub fn child_rule(self) -> ChildRule {
        match self {
            BlockKind::Paragraph | BlockKind::ListItem | BlockKind::TableCell => ChildRule::Text,
            BlockKind::BulletedList | BlockKind::NumberedList => {
                ChildRule::Block(BlockKind::ListItem)
            }
            BlockKind::Table => ChildRule::Block(BlockKind::TableRow),
            BlockKind::TableRow => ChildRule::Block(BlockKind::TableCell),
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Block element payload, one variant per block kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    Paragraph,
    BulletedList,
    NumberedList,
    ListItem,
    /// Declared dimensions are metadata; they are set at creation and by the
    /// row/column operations, never reconciled against the children.
    Table { rows: usize, columns: usize },
    TableRow,
    TableCell,
}

impl Element {
    pub fn kind(&self) -> BlockKind {
        match self {
            Element::Paragraph => BlockKind::Paragraph,
            Element::BulletedList => BlockKind::BulletedList,
            Element::NumberedList => BlockKind::NumberedList,
            Element::ListItem => BlockKind::ListItem,
            Element::Table { .. } => BlockKind::Table,
            Element::TableRow => BlockKind::TableRow,
            Element::TableCell => BlockKind::TableCell,
        }
    }

    pub fn from_kind(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Paragraph => Element::Paragraph,
            BlockKind::BulletedList => Element::BulletedList,
            BlockKind::NumberedList => Element::NumberedList,
            BlockKind::ListItem => Element::ListItem,
            BlockKind::Table => Element::Table {
                rows: 0,
                columns: 0,
            },
            BlockKind::TableRow => Element::TableRow,
            BlockKind::TableCell => Element::TableCell,
        }
    }
}

/// Inline formatting flag carried per text leaf
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkFormat {
    Bold,
    Italic,
    Underline,
    BackgroundColor,
}

impl MarkFormat {
    pub const ALL: [MarkFormat; 4] = [
        MarkFormat::Bold,
        MarkFormat::Italic,
        MarkFormat::Underline,
        MarkFormat::BackgroundColor,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|format| format.as_str() == name)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MarkFormat::Bold => "bold",
            MarkFormat::Italic => "italic",
            MarkFormat::Underline => "underline",
            MarkFormat::BackgroundColor => "backgroundColor",
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Literal text plus inline marks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextLeaf {
    pub text: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

impl TextLeaf {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// New leaf with this leaf's marks and different text
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }

    pub fn has_mark(&self, format: MarkFormat) -> bool {
        match format {
            MarkFormat::Bold => self.bold,
            MarkFormat::Italic => self.italic,
            MarkFormat::Underline => self.underline,
            MarkFormat::BackgroundColor => self
                .background_color
                .as_deref()
                .is_some_and(|color| !color.is_empty()),
        }
    }

    /// Set a mark. `color` is only read for `BackgroundColor`.
    pub fn set_mark(&mut self, format: MarkFormat, color: Option<&str>) {
        match format {
            MarkFormat::Bold => self.bold = true,
            MarkFormat::Italic => self.italic = true,
            MarkFormat::Underline => self.underline = true,
            MarkFormat::BackgroundColor => {
                self.background_color = color.filter(|c| !c.is_empty()).map(str::to_string)
            }
        }
    }

    pub fn clear_mark(&mut self, format: MarkFormat) {
        match format {
            MarkFormat::Bold => self.bold = false,
            MarkFormat::Italic => self.italic = false,
            MarkFormat::Underline => self.underline = false,
            MarkFormat::BackgroundColor => self.background_color = None,
        }
    }

    pub fn same_marks(&self, other: &TextLeaf) -> bool {
        self.bold == other.bold
            && self.italic == other.italic
            && self.underline == other.underline
            && self.background_color == other.background_color
    }

    /// Length in chars; selection offsets count chars
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub element: Element,
    pub children: Vec<NodeId>,
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        self.element.kind()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Text(TextLeaf),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub data: NodeData,
}

/// Rooted ordered tree for one note's body
#[derive(Debug, Clone, Default)]
pub struct ContentTree {
    slots: Vec<Option<Node>>,
    roots: Vec<NodeId>,
}

impl ContentTree {
    /// Empty tree. Only valid transiently; normalization adds a paragraph.
    pub fn new() -> Self {
        Self::default()
    }

    /// The default note body: one paragraph holding one empty leaf
    pub fn with_empty_paragraph() -> Self {
        let mut tree = Self::new();
        let paragraph = tree.paragraph("");
        tree.roots.push(paragraph);
        tree
    }

    /// Allocate a detached paragraph holding a single plain leaf
    pub fn paragraph(&mut self, text: &str) -> NodeId {
        let leaf = self.alloc_leaf(TextLeaf::new(text));
        self.alloc_block(Element::Paragraph, vec![leaf])
    }

    pub fn alloc_leaf(&mut self, leaf: TextLeaf) -> NodeId {
        self.alloc(Node {
            parent: None,
            data: NodeData::Text(leaf),
        })
    }

    /// Allocate a detached block and adopt `children`
    pub fn alloc_block(&mut self, element: Element, children: Vec<NodeId>) -> NodeId {
        let id = self.alloc(Node {
            parent: None,
            data: NodeData::Block(Block {
                element,
                children: Vec::new(),
            }),
        });
        for child in &children {
            self.set_parent(*child, Some(id));
        }
        if let Some(block) = self.block_mut(id) {
            block.children = children;
        }
        id
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Some(node));
        id
    }

    fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(node) = self.slots.get_mut(id.index()).and_then(Option::as_mut) {
            node.parent = parent;
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.node(id).map(|node| &node.data) {
            Some(NodeData::Block(block)) => &block.children,
            _ => &[],
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    /// The sequence `id` lives in: its parent's children, or the roots
    pub fn siblings(&self, id: NodeId) -> &[NodeId] {
        match self.parent(id) {
            Some(parent) => self.children(parent),
            None => &self.roots,
        }
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        self.siblings(id).iter().position(|sibling| *sibling == id)
    }

    pub fn leaf(&self, id: NodeId) -> Option<&TextLeaf> {
        match self.node(id).map(|node| &node.data) {
            Some(NodeData::Text(leaf)) => Some(leaf),
            _ => None,
        }
    }

    pub fn leaf_mut(&mut self, id: NodeId) -> Option<&mut TextLeaf> {
        match self.node_mut(id).map(|node| &mut node.data) {
            Some(NodeData::Text(leaf)) => Some(leaf),
            _ => None,
        }
    }

    pub fn block(&self, id: NodeId) -> Option<&Block> {
        match self.node(id).map(|node| &node.data) {
            Some(NodeData::Block(block)) => Some(block),
            _ => None,
        }
    }

    pub fn block_mut(&mut self, id: NodeId) -> Option<&mut Block> {
        match self.node_mut(id).map(|node| &mut node.data) {
            Some(NodeData::Block(block)) => Some(block),
            _ => None,
        }
    }

    pub fn kind(&self, id: NodeId) -> Option<BlockKind> {
        self.block(id).map(Block::kind)
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.leaf(id).is_some()
    }

    /// Insert a detached node into the root sequence (index is clamped)
    pub fn insert_root(&mut self, index: usize, id: NodeId) {
        let index = index.min(self.roots.len());
        self.roots.insert(index, id);
        self.set_parent(id, None);
    }

    /// Insert a detached node under `parent` (index is clamped).
    /// Returns false when `parent` is not a block.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, id: NodeId) -> bool {
        let Some(block) = self.block_mut(parent) else {
            return false;
        };
        let index = index.min(block.children.len());
        block.children.insert(index, id);
        self.set_parent(id, Some(parent));
        true
    }

    /// Unlink a node from its parent (or the roots) without freeing it.
    /// Returns the index it occupied.
    pub fn detach(&mut self, id: NodeId) -> Option<usize> {
        let index = self.index_in_parent(id)?;
        match self.parent(id) {
            Some(parent) => {
                if let Some(block) = self.block_mut(parent) {
                    block.children.remove(index);
                }
            }
            None => {
                self.roots.remove(index);
            }
        }
        self.set_parent(id, None);
        Some(index)
    }

    /// Unlink a node and free it together with all descendants
    pub fn remove_subtree(&mut self, id: NodeId) {
        self.detach(id);
        for descendant in self.descendants(id) {
            if let Some(slot) = self.slots.get_mut(descendant.index()) {
                *slot = None;
            }
        }
    }

    /// `id` and everything below it, pre-order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !self.contains(current) {
                continue;
            }
            out.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        out
    }

    /// Every attached node in document order
    pub fn nodes_in_order(&self) -> Vec<NodeId> {
        self.roots
            .iter()
            .flat_map(|root| self.descendants(*root))
            .collect()
    }

    /// All attached leaves in document order
    pub fn leaves(&self) -> Vec<NodeId> {
        self.nodes_in_order()
            .into_iter()
            .filter(|id| self.is_leaf(*id))
            .collect()
    }

    /// Leaves below `id` in document order
    pub fn leaves_in(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|id| self.is_leaf(*id))
            .collect()
    }

    /// Every attached text-holding block in document order
    pub fn text_blocks(&self) -> Vec<NodeId> {
        self.nodes_in_order()
            .into_iter()
            .filter(|id| self.kind(*id).is_some_and(BlockKind::holds_text))
            .collect()
    }

    /// Ancestors nearest first
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(parent) = current {
            out.push(parent);
            current = self.parent(parent);
        }
        out
    }

    /// The root-level node containing `id` (itself when it is a root)
    pub fn top_level(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().copied().unwrap_or(id)
    }

    /// Nearest ancestor (or self) of the given kind
    pub fn closest(&self, id: NodeId, kind: BlockKind) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|candidate| self.kind(*candidate) == Some(kind))
    }

    /// Child-index path from the roots
    pub fn path(&self, id: NodeId) -> Option<Vec<usize>> {
        let mut path = vec![self.index_in_parent(id)?];
        for ancestor in self.ancestors(id) {
            path.push(self.index_in_parent(ancestor)?);
        }
        path.reverse();
        Some(path)
    }

    pub fn node_at_path(&self, path: &[usize]) -> Option<NodeId> {
        let (first, rest) = path.split_first()?;
        let mut current = *self.roots.get(*first)?;
        for index in rest {
            current = *self.children(current).get(*index)?;
        }
        Some(current)
    }

    /// Concatenated text of every leaf below `id`
    pub fn block_text(&self, id: NodeId) -> String {
        self.leaves_in(id)
            .into_iter()
            .filter_map(|leaf| self.leaf(leaf))
            .map(|leaf| leaf.text.as_str())
            .collect()
    }
}

impl PartialEq for ContentTree {
    fn eq(&self, other: &Self) -> bool {
        self.to_nodes() == other.to_nodes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bulleted(tree: &mut ContentTree, items: &[&str]) -> NodeId {
        let items = items
            .iter()
            .map(|text| {
                let leaf = tree.alloc_leaf(TextLeaf::new(*text));
                tree.alloc_block(Element::ListItem, vec![leaf])
            })
            .collect();
        tree.alloc_block(Element::BulletedList, items)
    }

    #[test]
    fn test_child_rules() {
        assert_eq!(
            BlockKind::BulletedList.child_rule(),
            ChildRule::Block(BlockKind::ListItem)
        );
        assert_eq!(
            BlockKind::TableRow.child_rule(),
            ChildRule::Block(BlockKind::TableCell)
        );
        assert!(BlockKind::TableCell.holds_text());
        assert!(!BlockKind::Table.holds_text());
        assert_eq!(BlockKind::from_name("numbered-list"), Some(BlockKind::NumberedList));
        assert_eq!(BlockKind::from_name("code"), None);
    }

    #[test]
    fn test_document_order_and_paths() {
        let mut tree = ContentTree::with_empty_paragraph();
        let list = bulleted(&mut tree, &["one", "two"]);
        tree.insert_root(1, list);

        let leaves = tree.leaves();
        assert_eq!(leaves.len(), 3);
        assert_eq!(tree.leaf(leaves[2]).unwrap().text, "two");
        assert_eq!(tree.path(leaves[2]), Some(vec![1, 1, 0]));
        assert_eq!(tree.node_at_path(&[1, 1, 0]), Some(leaves[2]));
        assert_eq!(tree.top_level(leaves[2]), list);
        assert_eq!(tree.closest(leaves[2], BlockKind::ListItem), tree.parent(leaves[2]));
    }

    #[test]
    fn test_detach_and_remove() {
        let mut tree = ContentTree::with_empty_paragraph();
        let list = bulleted(&mut tree, &["a", "b"]);
        tree.insert_root(1, list);
        let first_item = tree.children(list)[0];

        assert_eq!(tree.detach(first_item), Some(0));
        assert_eq!(tree.children(list).len(), 1);
        assert!(tree.contains(first_item));
        assert_eq!(tree.parent(first_item), None);

        let live = tree.len();
        tree.remove_subtree(list);
        assert_eq!(tree.roots().len(), 1);
        // list, remaining item and its leaf are freed
        assert_eq!(tree.len(), live - 3);
    }

    #[test]
    fn test_leaf_marks() {
        let mut leaf = TextLeaf::new("x");
        leaf.set_mark(MarkFormat::Bold, None);
        leaf.set_mark(MarkFormat::BackgroundColor, Some("#ff0"));
        assert!(leaf.has_mark(MarkFormat::Bold));
        assert!(leaf.has_mark(MarkFormat::BackgroundColor));

        let copy = leaf.with_text("y");
        assert!(copy.same_marks(&leaf));

        leaf.clear_mark(MarkFormat::BackgroundColor);
        assert!(!leaf.has_mark(MarkFormat::BackgroundColor));
        assert!(!copy.same_marks(&leaf));
    }
}
