//! # Mutations
//!
//! Editing operations sent by the editing surface.
//!
//! ## Semantics
//!
//! Every operation takes the current tree and the current selection.
//! Preconditions that are part of normal editing (no selection, a collapsed
//! range for a mark toggle, backspace at the document start) make the
//! operation a no-op with `changed == false`. Misuse (an unknown node in the
//! selection, a block format that cannot be toggled, a zero-sized table) is
//! a [`MutationError`] and leaves the tree untouched.
//!
//! Shape-changing operations are followed by the normalizer; see
//! [`crate::Document::apply`].

use crate::selection::Range;
use crate::{blocks, find_replace, marks, tables, typing};
use inkpad_parser::{sanitized_lines, BlockKind, ContentTree, MarkFormat, NodeId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Editing operations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Mutation {
    /// Set or clear a mark over the selected text.
    /// `color` is the highlight for `backgroundColor`; without it the
    /// highlight is cleared.
    ToggleMark {
        format: MarkFormat,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        color: Option<String>,
    },

    /// Turn the selected blocks into paragraphs or list items
    ToggleBlock { kind: BlockKind },

    /// Insert a table after the block holding the caret
    InsertTable { rows: usize, columns: usize },

    InsertTableRow,
    InsertTableColumn,
    RemoveTableRow,
    RemoveTableColumn,

    /// Backspace at a collapsed caret
    DeleteBackward,

    /// Enter at a collapsed caret
    InsertBreak,

    /// Typing
    InsertText { text: String },

    /// Paste; one paragraph per line, or inline text for a single line
    InsertFragment { lines: Vec<String> },

    /// Case-insensitive literal replace across every leaf
    FindAndReplace { search: String, replacement: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    #[error("Block format `{0}` cannot be toggled")]
    UnsupportedBlockFormat(BlockKind),

    #[error("Invalid table size {rows}x{columns}")]
    InvalidTableSize { rows: usize, columns: usize },

    #[error("Invalid search pattern: {0}")]
    InvalidPattern(String),
}

/// What one operation did to the tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Applied {
    pub changed: bool,
    pub selection: Option<Range>,
    pub replacements: usize,
}

impl Applied {
    pub fn unchanged(selection: Option<Range>) -> Self {
        Self {
            changed: false,
            selection,
            replacements: 0,
        }
    }

    pub fn changed(selection: Option<Range>) -> Self {
        Self {
            changed: true,
            selection,
            replacements: 0,
        }
    }
}

impl Mutation {
    /// Paste from raw clipboard text
    pub fn paste(text: &str) -> Self {
        Mutation::InsertFragment {
            lines: sanitized_lines(text),
        }
    }

    pub fn toggle_mark(format: MarkFormat) -> Self {
        Mutation::ToggleMark {
            format,
            color: None,
        }
    }

    pub fn highlight(color: impl Into<String>) -> Self {
        Mutation::ToggleMark {
            format: MarkFormat::BackgroundColor,
            color: Some(color.into()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mutation::ToggleMark { .. } => "toggleMark",
            Mutation::ToggleBlock { .. } => "toggleBlock",
            Mutation::InsertTable { .. } => "insertTable",
            Mutation::InsertTableRow => "insertTableRow",
            Mutation::InsertTableColumn => "insertTableColumn",
            Mutation::RemoveTableRow => "removeTableRow",
            Mutation::RemoveTableColumn => "removeTableColumn",
            Mutation::DeleteBackward => "deleteBackward",
            Mutation::InsertBreak => "insertBreak",
            Mutation::InsertText { .. } => "insertText",
            Mutation::InsertFragment { .. } => "insertFragment",
            Mutation::FindAndReplace { .. } => "findAndReplace",
        }
    }

    /// Validate without applying
    pub fn validate(&self, tree: &ContentTree, selection: Option<&Range>) -> Result<(), MutationError> {
        if let Some(range) = selection {
            range.validate(tree)?;
        }

        match self {
            Mutation::ToggleBlock { kind } if !blocks::is_toggleable(*kind) => {
                Err(MutationError::UnsupportedBlockFormat(*kind))
            }
            Mutation::InsertTable { rows, columns } if *rows == 0 || *columns == 0 => {
                Err(MutationError::InvalidTableSize {
                    rows: *rows,
                    columns: *columns,
                })
            }
            _ => Ok(()),
        }
    }

    /// Apply to the tree with validation. Does not normalize.
    pub fn apply(
        &self,
        tree: &mut ContentTree,
        selection: Option<Range>,
    ) -> Result<Applied, MutationError> {
        self.validate(tree, selection.as_ref())?;

        match self {
            Mutation::ToggleMark { format, color } => {
                marks::toggle_mark(tree, *format, color.as_deref(), selection)
            }
            Mutation::ToggleBlock { kind } => blocks::toggle_block(tree, *kind, selection),
            Mutation::InsertTable { rows, columns } => {
                tables::insert_table(tree, *rows, *columns, selection)
            }
            Mutation::InsertTableRow => tables::insert_row(tree, selection),
            Mutation::InsertTableColumn => tables::insert_column(tree, selection),
            Mutation::RemoveTableRow => tables::remove_row(tree, selection),
            Mutation::RemoveTableColumn => tables::remove_column(tree, selection),
            Mutation::DeleteBackward => typing::delete_backward(tree, selection),
            Mutation::InsertBreak => typing::insert_break(tree, selection),
            Mutation::InsertText { text } => typing::insert_text(tree, text, selection),
            Mutation::InsertFragment { lines } => typing::insert_fragment(tree, lines, selection),
            Mutation::FindAndReplace {
                search,
                replacement,
            } => find_replace::find_and_replace(tree, search, replacement, selection),
        }
    }
}

/// Result of applying a mutation to a document
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// Document version after the mutation
    pub version: u64,

    pub changed: bool,

    /// Selection after the mutation
    pub selection: Option<Range>,

    /// Occurrences replaced by `FindAndReplace`
    pub replacements: usize,
}
