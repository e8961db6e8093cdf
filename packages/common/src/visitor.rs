use inkpad_parser::{Block, ContentTree, NodeData, NodeId, TextLeaf};

/// Visitor pattern for traversing a content tree immutably
///
/// Default implementations walk every node in document order.
/// Override specific visit_* methods to act on blocks or leaves.
pub trait Visitor: Sized {
    fn visit_tree(&mut self, tree: &ContentTree) {
        walk_tree(self, tree);
    }

    fn visit_block(&mut self, tree: &ContentTree, _id: NodeId, block: &Block) {
        walk_block(self, tree, block);
    }

    fn visit_leaf(&mut self, _tree: &ContentTree, _id: NodeId, _leaf: &TextLeaf) {
        // Leaf node, no children to walk
    }
}

/// Mutable visitor for rewriting leaf text and marks in place
///
/// Structure is fixed while walking; only leaves are handed out mutably.
pub trait VisitorMut: Sized {
    fn visit_tree_mut(&mut self, tree: &mut ContentTree) {
        walk_tree_mut(self, tree);
    }

    fn visit_leaf_mut(&mut self, _id: NodeId, _leaf: &mut TextLeaf) {}
}

pub fn walk_tree<V: Visitor>(visitor: &mut V, tree: &ContentTree) {
    for root in tree.roots() {
        walk_node(visitor, tree, *root);
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, tree: &ContentTree, id: NodeId) {
    match tree.node(id).map(|node| &node.data) {
        Some(NodeData::Block(block)) => visitor.visit_block(tree, id, block),
        Some(NodeData::Text(leaf)) => visitor.visit_leaf(tree, id, leaf),
        None => {}
    }
}

pub fn walk_block<V: Visitor>(visitor: &mut V, tree: &ContentTree, block: &Block) {
    for child in &block.children {
        walk_node(visitor, tree, *child);
    }
}

pub fn walk_tree_mut<V: VisitorMut>(visitor: &mut V, tree: &mut ContentTree) {
    for id in tree.leaves() {
        if let Some(leaf) = tree.leaf_mut(id) {
            visitor.visit_leaf_mut(id, leaf);
        }
    }
}
