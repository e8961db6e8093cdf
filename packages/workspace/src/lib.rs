//! # Inkpad Workspace
//!
//! Everything around the editor: the notebook store, autosave, workspace
//! configuration and the session that binds an open note to all three.

pub mod autosave;
pub mod config;
pub mod error;
pub mod model;
pub mod session;
pub mod store;

pub use autosave::{AutosaveConfig, AutosaveController, AutosaveState, NoteCommitter};
pub use config::{WorkspaceConfig, DEFAULT_CONFIG_NAME};
pub use error::{CommitError, StoreError, StoreResult, WorkspaceError, WorkspaceResult};
pub use model::{Note, Notebook, Section, DEFAULT_NOTEBOOK_TITLE, NEW_NOTE_TITLE};
pub use session::{SharedStore, StatsListener, WorkspaceSession};
pub use store::NotebookStore;
