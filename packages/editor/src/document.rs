//! # Document Handle
//!
//! One note's content tree plus its edit version.
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Normalize → Mutate → Normalize → Serialize
//!   ↓                   ↓                     ↓
//! JSON             MutationResult           JSON
//! ```
//!
//! The tree is normalized on construction and after every mutation that
//! changed it, so callers never observe an invalid tree.

use crate::export::{export, ExportFormat};
use crate::find_replace::count_matches;
use crate::normalizer::Normalizer;
use crate::selection::{Point, Range};
use crate::stats::{stats, NoteStats};
use crate::{blocks, marks, EditorError, Mutation, MutationResult};
use inkpad_parser::{
    load_content, parse_content, serialize_content, BlockKind, ContentTree, MarkFormat,
};
use tracing::{debug, instrument};

/// Editable note content
#[derive(Debug)]
pub struct Document {
    /// Current version number (increments on each change)
    pub version: u64,

    tree: ContentTree,

    normalizer: Normalizer,
}

impl Document {
    /// Wrap a tree, normalizing it first
    pub fn new(mut tree: ContentTree) -> Self {
        let normalizer = Normalizer::new();
        normalizer.normalize(&mut tree);
        Self {
            version: 0,
            tree,
            normalizer,
        }
    }

    /// Strictly parse stored content
    pub fn from_json(source: &str) -> Result<Self, EditorError> {
        Ok(Self::new(parse_content(source)?))
    }

    /// Load stored content, falling back to one empty paragraph when it is
    /// malformed
    pub fn load(source: &str) -> Self {
        Self::new(load_content(source))
    }

    pub fn tree(&self) -> &ContentTree {
        &self.tree
    }

    pub fn into_tree(self) -> ContentTree {
        self.tree
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        Ok(serialize_content(&self.tree)?)
    }

    /// Caret at the start of the document
    pub fn start(&self) -> Option<Range> {
        let first = *self.tree.roots().first()?;
        Point::start_of(&self.tree, first).map(Range::collapsed)
    }

    /// Apply a mutation at `selection`, then normalize
    #[instrument(skip_all, fields(mutation = mutation.name()))]
    pub fn apply(
        &mut self,
        mutation: &Mutation,
        selection: Option<Range>,
    ) -> Result<MutationResult, EditorError> {
        let applied = mutation.apply(&mut self.tree, selection)?;

        if !applied.changed {
            debug!("Mutation left the document unchanged");
            return Ok(MutationResult {
                version: self.version,
                changed: false,
                selection: applied.selection,
                replacements: applied.replacements,
            });
        }

        if self.normalizer.normalize(&mut self.tree) {
            debug!("Document normalized after mutation");
        }
        self.version += 1;

        // Normalization may have removed the node the selection pointed at
        let selection = match applied.selection {
            Some(range) => range.clamp(&self.tree).or_else(|| self.start()),
            None => None,
        };

        debug!(version = self.version, "Mutation applied");
        Ok(MutationResult {
            version: self.version,
            changed: true,
            selection,
            replacements: applied.replacements,
        })
    }

    /// Swap in different content (a different note was opened)
    pub fn replace(&mut self, mut tree: ContentTree) {
        self.normalizer.normalize(&mut tree);
        self.tree = tree;
        self.version += 1;
    }

    /// Put back a previously normalized tree (undo/redo)
    pub(crate) fn restore(&mut self, tree: ContentTree) {
        self.tree = tree;
        self.version += 1;
    }

    pub fn is_block_active(&self, kind: BlockKind, range: Option<&Range>) -> bool {
        range.is_some_and(|range| blocks::is_block_active(&self.tree, kind, range))
    }

    pub fn is_mark_active(&self, format: MarkFormat, range: Option<&Range>) -> bool {
        range.is_some_and(|range| marks::is_mark_active(&self.tree, format, range))
    }

    pub fn stats(&self) -> NoteStats {
        stats(&self.tree)
    }

    pub fn export(&self, format: ExportFormat) -> String {
        export(&self.tree, format)
    }

    pub fn count_matches(&self, search: &str) -> Result<usize, EditorError> {
        Ok(count_matches(&self.tree, search)?)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(ContentTree::with_empty_paragraph())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_substitutes_default_for_malformed_content() {
        let doc = Document::load(r#"{"not":"an array"}"#);
        assert_eq!(doc.tree(), &ContentTree::with_empty_paragraph());
        assert_eq!(doc.version, 0);
    }

    #[test]
    fn test_from_json_is_strict() {
        assert!(matches!(
            Document::from_json("[1, 2]"),
            Err(EditorError::Parse(_))
        ));
    }

    #[test]
    fn test_leafless_content_still_has_a_caret() {
        let mut doc = Document::load(
            r#"[{"type":"bulleted-list","children":[{"type":"list-item","children":[]}]}]"#,
        );
        let caret = doc.start();
        assert!(caret.is_some());

        let result = doc
            .apply(&Mutation::InsertText { text: "hi".into() }, caret)
            .unwrap();
        assert!(result.changed);
        assert_eq!(doc.export(ExportFormat::Txt), "hi");
    }

    #[test]
    fn test_empty_content_is_normalized() {
        let doc = Document::from_json("[]").unwrap();
        assert_eq!(doc.tree(), &ContentTree::with_empty_paragraph());
    }

    #[test]
    fn test_version_only_moves_on_change() {
        let mut doc = Document::default();
        let caret = doc.start();

        let result = doc.apply(&Mutation::DeleteBackward, caret).unwrap();
        assert!(!result.changed);
        assert_eq!(result.version, 0);

        let typing = Mutation::InsertText {
            text: "hi".to_string(),
        };
        let result = doc.apply(&typing, caret).unwrap();
        assert!(result.changed);
        assert_eq!(result.version, 1);
        assert_eq!(doc.to_json().unwrap(), r#"[{"type":"paragraph","children":[{"text":"hi"}]}]"#);
    }

    #[test]
    fn test_invalid_selection_is_rejected_untouched() {
        let mut doc = Document::default();
        let before = doc.tree().clone();
        let paragraph = doc.tree().roots()[0];

        let result = doc.apply(&Mutation::InsertBreak, Some(Range::caret(paragraph, 0)));
        assert!(matches!(result, Err(EditorError::Mutation(_))));
        assert_eq!(doc.tree(), &before);
    }
}
