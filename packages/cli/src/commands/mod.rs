pub mod import;
pub mod init;
pub mod note;
pub mod notebook;

pub use import::{import, ImportArgs};
pub use init::{init, InitArgs};
pub use note::{export, replace, stats, ExportArgs, ReplaceArgs, StatsArgs};
pub use notebook::{notebook, NotebookArgs};

use crate::config::Config;
use anyhow::{anyhow, Result};
use inkpad_common::RealFileSystem;
use inkpad_workspace::{Note, NotebookStore};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Open the store named by the project's config
pub(crate) fn open_store(cwd: &Path) -> Result<(Config, NotebookStore, PathBuf)> {
    let config = Config::load(cwd)?;
    let path = config.store_path(cwd);
    let store = NotebookStore::load(&RealFileSystem, &path)?;
    debug!(path = %path.display(), notebooks = store.notebooks.len(), "Opened store");
    Ok((config, store, path))
}

pub(crate) fn save_store(store: &NotebookStore, path: &Path) -> Result<()> {
    store.save(&mut RealFileSystem, path)?;
    Ok(())
}

/// Find a note by full id or a unique id prefix
pub(crate) fn resolve_note<'a>(store: &'a NotebookStore, id: &str) -> Result<&'a Note> {
    if let Some(note) = store.find_note(id) {
        return Ok(note);
    }

    let mut matches = store
        .notebooks
        .iter()
        .flat_map(|notebook| &notebook.sections)
        .flat_map(|section| &section.notes)
        .filter(|note| note.id.starts_with(id));

    match (matches.next(), matches.next()) {
        (Some(note), None) => Ok(note),
        (Some(_), Some(_)) => Err(anyhow!("Note id prefix `{}` is ambiguous", id)),
        (None, _) => Err(anyhow!("Note not found: {}", id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_note_by_prefix() {
        let mut store = NotebookStore::new();
        let notebook = store.add_notebook(None);
        let section = store.add_section(&notebook, None).unwrap();
        let id = store.new_note(&section).unwrap();

        assert_eq!(resolve_note(&store, &id).unwrap().id, id);
        assert_eq!(resolve_note(&store, &id[..8]).unwrap().id, id);
        assert!(resolve_note(&store, "zzzz").is_err());

        // An empty prefix matches every note
        store.new_note(&section).unwrap();
        assert!(resolve_note(&store, "").is_err());
    }
}
