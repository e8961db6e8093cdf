//! # Inkpad Editor
//!
//! Document model and editing engine for one note.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: JSON wire form ↔ ContentTree arena  │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document + mutations                │
//! │  - Apply mutations at a selection           │
//! │  - Normalize after every change             │
//! │  - Undo/redo snapshots                      │
//! │  - Statistics and export                    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ workspace: notebook store + autosave        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use inkpad_editor::{Document, EditSession, Mutation};
//! use inkpad_parser::MarkFormat;
//!
//! let mut session = EditSession::new("note-1", Document::load(&stored_json));
//! session.set_selection(session.document.start())?;
//!
//! session.apply(Mutation::InsertText { text: "Hello".into() })?;
//! session.apply(Mutation::toggle_mark(MarkFormat::Bold))?;
//!
//! let stats = session.document.stats();
//! let json = session.document.to_json()?;
//! ```

mod blocks;
mod document;
mod errors;
mod export;
mod find_replace;
mod marks;
mod mutations;
mod normalizer;
mod selection;
mod session;
mod stats;
mod tables;
mod transforms;
mod typing;
mod undo_stack;

pub use document::Document;
pub use errors::EditorError;
pub use export::{escape_html, export, ExportFormat};
pub use find_replace::{count_matches, search_pattern};
pub use mutations::{Applied, Mutation, MutationError, MutationResult};
pub use normalizer::{normalize, EnsureRootBlock, NormalizeRule, Normalizer, RemoveEmptyElements};
pub use selection::{compare_points, Point, Range};
pub use session::EditSession;
pub use stats::{stats, NoteStats, WORDS_PER_MINUTE};
pub use tables::build_table;
pub use undo_stack::{MutationBatch, Snapshot, UndoStack, DEFAULT_UNDO_LEVELS};

// Re-export common types for convenience
pub use inkpad_parser::{BlockKind, ContentTree, MarkFormat, NodeId};
