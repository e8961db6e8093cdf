use inkpad_editor::EditorError;
use inkpad_parser::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Notebook not found: {0}")]
    NotebookNotFound(String),

    #[error("Section not found: {0}")]
    SectionNotFound(String),

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid store file: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by a [`crate::NoteCommitter`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommitError {
    #[error("No note is bound")]
    NotBound,

    #[error("A save is already in progress")]
    InFlight,

    #[error("Note not found: {0}")]
    NoteNotFound(String),

    #[error("Commit failed: {0}")]
    Failed(String),
}

#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error("Import rejected: {0}")]
    Import(#[from] ParseError),

    #[error("Save failed: {0}")]
    Commit(#[from] CommitError),

    #[error("No note is open")]
    NoNoteOpen,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type WorkspaceResult<T> = Result<T, WorkspaceError>;
