//! # Workspace Session
//!
//! Ties the notebook store to the one note being edited: opening a note
//! binds the edit session and the autosave controller to it, and every
//! change is fed to autosave and to the stats listener.

use crate::autosave::{AutosaveController, NoteCommitter};
use crate::config::WorkspaceConfig;
use crate::error::{CommitError, WorkspaceError, WorkspaceResult};
use crate::model::Note;
use crate::store::NotebookStore;
use async_trait::async_trait;
use inkpad_common::FileSystem;
use inkpad_editor::{Document, EditSession, Mutation, MutationResult, NoteStats, Range};
use inkpad_parser::{decode_import, lines_to_content, sanitize_title, ContentTree, ImportSource};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument};

/// Store handle shared with the autosave controller
pub type SharedStore = Arc<Mutex<NotebookStore>>;

/// Called with the open note's id and fresh stats after every change
pub type StatsListener = Box<dyn Fn(&str, &NoteStats) + Send + Sync>;

#[async_trait]
impl NoteCommitter for Mutex<NotebookStore> {
    async fn commit(&self, note_id: &str, tree: ContentTree) -> Result<(), CommitError> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .update_note_content(note_id, tree)
            .map_err(|_| CommitError::NoteNotFound(note_id.to_string()))
    }
}

pub struct WorkspaceSession {
    store: SharedStore,
    editor: Option<EditSession>,
    autosave: AutosaveController,
    config: WorkspaceConfig,
    on_stats: Option<StatsListener>,
}

impl WorkspaceSession {
    pub fn new(store: NotebookStore, config: WorkspaceConfig) -> Self {
        let store: SharedStore = Arc::new(Mutex::new(store));
        let autosave = AutosaveController::new(config.autosave, store.clone());
        Self {
            store,
            editor: None,
            autosave,
            config,
            on_stats: None,
        }
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn store(&self) -> MutexGuard<'_, NotebookStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn autosave(&self) -> &AutosaveController {
        &self.autosave
    }

    pub fn on_stats_changed(&mut self, listener: impl Fn(&str, &NoteStats) + Send + Sync + 'static) {
        self.on_stats = Some(Box::new(listener));
    }

    /// The open note's edit session
    pub fn editor(&self) -> Option<&EditSession> {
        self.editor.as_ref()
    }

    /// Open a note for editing. The previous note's pending autosave is
    /// cancelled, not flushed.
    #[instrument(skip(self))]
    pub fn open_note(&mut self, note_id: &str) -> WorkspaceResult<()> {
        let content = {
            let mut store = self.store();
            store.set_current_note(note_id)?;
            store
                .find_note(note_id)
                .map(|note| note.content.clone())
                .unwrap_or_else(ContentTree::with_empty_paragraph)
        };

        self.autosave.bind(Some(note_id));
        let mut editor =
            EditSession::with_undo_levels(note_id, Document::new(content), self.config.undo_levels);
        editor.set_selection(editor.document.start())?;
        self.editor = Some(editor);

        info!("Opened note");
        self.emit_stats();
        Ok(())
    }

    pub fn close_note(&mut self) {
        self.autosave.bind(None);
        self.editor = None;
    }

    fn editor_mut(&mut self) -> WorkspaceResult<&mut EditSession> {
        self.editor.as_mut().ok_or(WorkspaceError::NoNoteOpen)
    }

    /// Apply a mutation to the open note.
    ///
    /// Must be called from within a Tokio runtime (autosave schedules a timer).
    pub fn apply(&mut self, mutation: Mutation) -> WorkspaceResult<MutationResult> {
        let result = self.editor_mut()?.apply(mutation)?;
        if result.changed {
            self.changed();
        }
        Ok(result)
    }

    pub fn set_selection(&mut self, selection: Option<Range>) -> WorkspaceResult<()> {
        self.editor_mut()?.set_selection(selection)?;
        Ok(())
    }

    pub fn undo(&mut self) -> WorkspaceResult<bool> {
        let undone = self.editor_mut()?.undo();
        if undone {
            self.changed();
        }
        Ok(undone)
    }

    pub fn redo(&mut self) -> WorkspaceResult<bool> {
        let redone = self.editor_mut()?.redo();
        if redone {
            self.changed();
        }
        Ok(redone)
    }

    fn changed(&self) {
        if let Some(editor) = &self.editor {
            self.autosave.notify_change(editor.tree().clone());
        }
        self.emit_stats();
    }

    fn emit_stats(&self) {
        if let (Some(editor), Some(listener)) = (&self.editor, &self.on_stats) {
            listener(&editor.id, &editor.document.stats());
        }
    }

    pub fn stats(&self) -> Option<NoteStats> {
        self.editor.as_ref().map(|editor| editor.document.stats())
    }

    /// Write the open note to the store now
    pub async fn save_now(&self) -> WorkspaceResult<()> {
        let editor = self.editor.as_ref().ok_or(WorkspaceError::NoNoteOpen)?;
        self.autosave.save_now(editor.tree().clone()).await?;
        Ok(())
    }

    /// Turn an opened text file into a new note in `section_id`; returns the
    /// note's id. Nothing is added when the file is rejected.
    #[instrument(skip_all, fields(file = %source.file_name, section = %section_id))]
    pub fn import_file(&mut self, section_id: &str, source: &ImportSource) -> WorkspaceResult<String> {
        let text = decode_import(source, self.config.max_import_bytes)?;
        let note = Note::new(
            section_id,
            sanitize_title(&source.file_name),
            lines_to_content(&text),
        );
        let id = self.store().add_note(section_id, note)?;
        info!(note = %id, "Imported file as note");
        Ok(id)
    }

    /// Persist the whole store to `path`
    pub fn persist(&self, fs: &mut dyn FileSystem, path: &Path) -> WorkspaceResult<()> {
        self.store().save(fs, path)?;
        debug!(path = %path.display(), "Store persisted");
        Ok(())
    }
}
