//! # Edit Session
//!
//! One editing surface's view of a document: the document itself, the
//! current selection and the undo history. The session is the only owner of
//! the tree while a note is open.

use crate::selection::Range;
use crate::undo_stack::{Snapshot, UndoStack};
use crate::{Document, EditorError, Mutation, MutationResult};
use inkpad_parser::ContentTree;
use tracing::debug;

pub struct EditSession {
    /// Session identifier (the bound note id in a workspace)
    pub id: String,

    /// Document being edited
    pub document: Document,

    /// Current selection
    pub selection: Option<Range>,

    undo_stack: UndoStack,
}

impl EditSession {
    /// Create new edit session
    pub fn new(id: impl Into<String>, document: Document) -> Self {
        Self::with_undo_levels(id, document, crate::undo_stack::DEFAULT_UNDO_LEVELS)
    }

    pub fn with_undo_levels(id: impl Into<String>, document: Document, levels: usize) -> Self {
        Self {
            id: id.into(),
            document,
            selection: None,
            undo_stack: UndoStack::with_max_levels(levels),
        }
    }

    /// Apply a mutation at the current selection and record it for undo
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        let before = Snapshot::new(self.document.tree().clone(), self.selection);
        let result = self.document.apply(&mutation, self.selection)?;
        self.selection = result.selection;

        if result.changed {
            let after = Snapshot::new(self.document.tree().clone(), self.selection);
            self.undo_stack.record(mutation, before, after);
        }
        Ok(result)
    }

    /// Returns false when there is nothing to undo
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.undo_stack.undo() else {
            return false;
        };
        self.document.restore(snapshot.tree.clone());
        self.selection = snapshot.selection;
        debug!(session = %self.id, version = self.document.version, "Undo");
        true
    }

    /// Returns false when there is nothing to redo
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.undo_stack.redo() else {
            return false;
        };
        self.document.restore(snapshot.tree.clone());
        self.selection = snapshot.selection;
        debug!(session = %self.id, version = self.document.version, "Redo");
        true
    }

    /// Update selection; points must name live leaves
    pub fn set_selection(&mut self, selection: Option<Range>) -> Result<(), EditorError> {
        if let Some(range) = &selection {
            range.validate(self.document.tree())?;
        }
        self.selection = selection;
        Ok(())
    }

    /// Load different content (another note); clears selection and history
    pub fn replace_content(&mut self, tree: ContentTree) {
        self.document.replace(tree);
        self.selection = None;
        self.undo_stack.clear();
    }

    /// Group the following mutations into one undo step
    pub fn begin_batch(&mut self, description: impl Into<String>) {
        self.undo_stack.begin_batch();
        self.undo_stack.set_batch_description(description);
    }

    pub fn end_batch(&mut self) {
        self.undo_stack.end_batch();
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo_stack.can_redo()
    }

    pub fn tree(&self) -> &ContentTree {
        self.document.tree()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::Point;

    #[test]
    fn test_session_creation() {
        let session = EditSession::new("note-1", Document::default());
        assert_eq!(session.id, "note-1");
        assert!(session.selection.is_none());
        assert!(!session.can_undo());
    }

    #[test]
    fn test_apply_undo_redo() {
        let mut session = EditSession::new("note-1", Document::default());
        let start = session.document.start();
        session.set_selection(start).unwrap();

        session
            .apply(Mutation::InsertText {
                text: "hello".to_string(),
            })
            .unwrap();
        let typed = session.tree().clone();
        assert!(session.can_undo());

        assert!(session.undo());
        assert_eq!(session.tree(), &ContentTree::with_empty_paragraph());
        assert_eq!(session.selection, start);

        assert!(session.redo());
        assert_eq!(session.tree(), &typed);
        assert!(!session.redo());
    }

    #[test]
    fn test_unchanged_mutations_are_not_recorded() {
        let mut session = EditSession::new("note-1", Document::default());
        session.set_selection(session.document.start()).unwrap();
        session.apply(Mutation::DeleteBackward).unwrap();
        assert!(!session.can_undo());
    }

    #[test]
    fn test_set_selection_validates() {
        let mut session = EditSession::new("note-1", Document::default());
        let leaf = session.tree().leaves()[0];
        assert!(session
            .set_selection(Some(Range::collapsed(Point::new(leaf, 9))))
            .is_err());
        assert!(session.selection.is_none());
    }

    #[test]
    fn test_replace_content_clears_history() {
        let mut session = EditSession::new("note-1", Document::default());
        session.set_selection(session.document.start()).unwrap();
        session
            .apply(Mutation::InsertText {
                text: "x".to_string(),
            })
            .unwrap();

        session.replace_content(ContentTree::new());
        assert!(!session.can_undo());
        assert!(session.selection.is_none());
        // Empty content is normalized on the way in
        assert_eq!(session.tree(), &ContentTree::with_empty_paragraph());
    }
}
