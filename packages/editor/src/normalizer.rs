//! # Normalizer
//!
//! Invariant repair run after every mutation that changed the tree.
//!
//! Rules run in a fixed order:
//! 1. A tree with no text leaf (an empty root sequence, or only empty
//!    structure) becomes one default empty paragraph, so there is always a
//!    caret position.
//! 2. Inside every container (lists, tables, table rows) direct element
//!    children with zero children are removed.
//! 3. Text-holding blocks are left alone; their leaves may hold empty text.
//!
//! One pass only looks at direct children, so a cell emptied inside a row
//! leaves that row for the next pass. [`Normalizer::normalize_pass`] keeps
//! that single-level behaviour. [`Normalizer::normalize`] is stronger: it
//! repeats passes until nothing changes, so it is idempotent.
//!
//! Kind mismatches (a paragraph inside a list, say) are passed through.

use inkpad_parser::{ContentTree, NodeId};
use tracing::debug;

/// One invariant-repair rule
pub trait NormalizeRule: std::fmt::Debug {
    fn name(&self) -> &'static str;

    /// Repair the tree in place, returning whether anything changed
    fn apply(&self, tree: &mut ContentTree) -> bool;
}

/// The tree always holds at least one text leaf
#[derive(Debug)]
pub struct EnsureRootBlock;

impl NormalizeRule for EnsureRootBlock {
    fn name(&self) -> &'static str {
        "ensure-root-block"
    }

    fn apply(&self, tree: &mut ContentTree) -> bool {
        if !tree.leaves().is_empty() {
            return false;
        }
        for root in tree.roots().to_vec() {
            tree.remove_subtree(root);
        }
        let paragraph = tree.paragraph("");
        tree.insert_root(0, paragraph);
        true
    }
}

/// Containers drop direct element children that have no children
#[derive(Debug)]
pub struct RemoveEmptyElements;

impl NormalizeRule for RemoveEmptyElements {
    fn name(&self) -> &'static str {
        "remove-empty-elements"
    }

    fn apply(&self, tree: &mut ContentTree) -> bool {
        // Decide on the pre-pass shape so removals don't cascade within a pass
        let doomed: Vec<NodeId> = tree
            .nodes_in_order()
            .into_iter()
            .filter(|id| tree.kind(*id).is_some_and(|kind| kind.is_container()))
            .flat_map(|container| tree.children(container).to_vec())
            .filter(|child| tree.block(*child).is_some_and(|block| block.children.is_empty()))
            .collect();

        for id in &doomed {
            tree.remove_subtree(*id);
        }
        !doomed.is_empty()
    }
}

/// Applies every registered rule in order
#[derive(Debug)]
pub struct Normalizer {
    rules: Vec<Box<dyn NormalizeRule>>,
}

/// Upper bound on passes; containers nest at most three deep
const MAX_PASSES: usize = 8;

impl Normalizer {
    /// Create a normalizer with the default rules
    pub fn new() -> Self {
        Self {
            rules: vec![Box::new(EnsureRootBlock), Box::new(RemoveEmptyElements)],
        }
    }

    /// One pass of every rule; returns whether anything changed
    pub fn normalize_pass(&self, tree: &mut ContentTree) -> bool {
        let mut changed = false;
        for rule in &self.rules {
            if rule.apply(tree) {
                debug!(rule = rule.name(), "Normalization rule applied");
                changed = true;
            }
        }
        changed
    }

    /// Repeat passes until the tree is stable
    pub fn normalize(&self, tree: &mut ContentTree) -> bool {
        let mut changed = false;
        for _ in 0..MAX_PASSES {
            if !self.normalize_pass(tree) {
                break;
            }
            changed = true;
        }
        changed
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize with the default rules
pub fn normalize(tree: &mut ContentTree) -> bool {
    Normalizer::new().normalize(tree)
}
