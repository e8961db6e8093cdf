//! # Undo/Redo Stack
//!
//! Tracks edit history as before/after snapshots.
//!
//! ## Design
//!
//! - Each applied mutation records the tree and selection before and after
//! - Undo restores the before-snapshot and moves the batch to the redo stack
//! - Redo restores the after-snapshot
//! - New mutations clear the redo stack
//! - Batches group several mutations into one undo step
//!
//! Snapshots are whole trees; notes are small and cloning keeps node ids
//! stable, so a restored selection still points at the right leaves.

use crate::selection::Range;
use crate::Mutation;
use inkpad_parser::ContentTree;

/// Tree and selection at one point in history
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub tree: ContentTree,
    pub selection: Option<Range>,
}

impl Snapshot {
    pub fn new(tree: ContentTree, selection: Option<Range>) -> Self {
        Self { tree, selection }
    }
}

/// A group of mutations that should be undone/redone together
#[derive(Debug, Clone)]
pub struct MutationBatch {
    /// The mutations in this batch (in application order)
    pub mutations: Vec<Mutation>,

    /// State before the first mutation
    pub before: Snapshot,

    /// State after the last mutation
    pub after: Snapshot,

    /// Optional description of this batch
    pub description: Option<String>,
}

impl MutationBatch {
    /// Create a single-mutation batch
    pub fn single(mutation: Mutation, before: Snapshot, after: Snapshot) -> Self {
        Self {
            mutations: vec![mutation],
            before,
            after,
            description: None,
        }
    }

    /// Add a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// Stack of applied batches (most recent last)
    undo_stack: Vec<MutationBatch>,

    /// Stack of undone batches (most recent last)
    redo_stack: Vec<MutationBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Set between `begin_batch` and `end_batch`
    batching: bool,

    /// Batch being built
    current_batch: Option<MutationBatch>,

    batch_description: Option<String>,
}

pub const DEFAULT_UNDO_LEVELS: usize = 100;

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(DEFAULT_UNDO_LEVELS)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            batching: false,
            current_batch: None,
            batch_description: None,
        }
    }

    /// Record an applied mutation
    pub fn record(&mut self, mutation: Mutation, before: Snapshot, after: Snapshot) {
        if !self.batching {
            self.push_batch(MutationBatch::single(mutation, before, after));
            return;
        }

        match &mut self.current_batch {
            Some(batch) => {
                batch.mutations.push(mutation);
                batch.after = after;
            }
            None => self.current_batch = Some(MutationBatch::single(mutation, before, after)),
        }
    }

    /// Start a batch of mutations (will be undone/redone together)
    pub fn begin_batch(&mut self) {
        self.end_batch();
        self.batching = true;
    }

    /// End the current batch and push to undo stack
    pub fn end_batch(&mut self) {
        self.batching = false;
        let description = self.batch_description.take();
        if let Some(mut batch) = self.current_batch.take() {
            batch.description = description;
            self.push_batch(batch);
        }
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if self.batching {
            self.batch_description = Some(description.into());
        }
    }

    /// Push a batch to the undo stack
    fn push_batch(&mut self, batch: MutationBatch) {
        self.undo_stack.push(batch);

        // Trim if exceeded max levels
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // Clear redo stack (new action invalidates future)
        self.redo_stack.clear();
    }

    /// Step back; returns the snapshot to restore
    pub fn undo(&mut self) -> Option<&Snapshot> {
        self.end_batch();
        let batch = self.undo_stack.pop()?;
        self.redo_stack.push(batch);
        self.redo_stack.last().map(|batch| &batch.before)
    }

    /// Step forward again; returns the snapshot to restore
    pub fn redo(&mut self) -> Option<&Snapshot> {
        let batch = self.redo_stack.pop()?;
        self.undo_stack.push(batch);
        self.undo_stack.last().map(|batch| &batch.after)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() || self.current_batch.is_some()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.batching = false;
        self.current_batch = None;
        self.batch_description = None;
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
