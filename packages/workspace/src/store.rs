//! # Notebook Store
//!
//! The owned collection of notebooks → sections → notes, plus which of them
//! is currently selected. Selection is kept as ids so it can never drift from
//! the stored data.

use crate::error::{StoreError, StoreResult};
use crate::model::{Note, Notebook, Section, DEFAULT_SECTION_TITLE};
use chrono::Utc;
use inkpad_common::FileSystem;
use inkpad_parser::ContentTree;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotebookStore {
    #[serde(default)]
    pub notebooks: Vec<Notebook>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_notebook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    current_note: Option<String>,
}

impl NotebookStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a store file; a missing file is an empty store
    #[instrument(skip(fs))]
    pub fn load(fs: &dyn FileSystem, path: &Path) -> StoreResult<Self> {
        if !fs.exists(path) {
            debug!("No store file yet, starting empty");
            return Ok(Self::new());
        }
        let bytes = fs.read(path)?;
        let store: Self = serde_json::from_slice(&bytes)?;
        info!(notebooks = store.notebooks.len(), "Loaded notebook store");
        Ok(store)
    }

    #[instrument(skip(self, fs))]
    pub fn save(&self, fs: &mut dyn FileSystem, path: &Path) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(self)?;
        fs.write(path, &json)?;
        info!(notebooks = self.notebooks.len(), "Saved notebook store");
        Ok(())
    }

    /// Returns the new notebook's id
    pub fn add_notebook(&mut self, title: Option<&str>) -> String {
        let notebook = Notebook::new(title);
        let id = notebook.id.clone();
        debug!(notebook = %id, title = %notebook.title, "Added notebook");
        self.notebooks.push(notebook);
        id
    }

    pub fn notebook(&self, id: &str) -> Option<&Notebook> {
        self.notebooks.iter().find(|notebook| notebook.id == id)
    }

    fn notebook_mut(&mut self, id: &str) -> StoreResult<&mut Notebook> {
        self.notebooks
            .iter_mut()
            .find(|notebook| notebook.id == id)
            .ok_or_else(|| StoreError::NotebookNotFound(id.to_string()))
    }

    /// Returns the new section's id
    pub fn add_section(&mut self, notebook_id: &str, title: Option<&str>) -> StoreResult<String> {
        let notebook = self.notebook_mut(notebook_id)?;
        let section = Section::new(notebook_id, title.unwrap_or(DEFAULT_SECTION_TITLE));
        let id = section.id.clone();
        notebook.sections.push(section);
        notebook.updated_at = Utc::now();
        Ok(id)
    }

    pub fn find_section(&self, id: &str) -> Option<&Section> {
        self.notebooks
            .iter()
            .find_map(|notebook| notebook.section(id))
    }

    fn section_mut(&mut self, id: &str) -> StoreResult<&mut Section> {
        self.notebooks
            .iter_mut()
            .find_map(|notebook| notebook.section_mut(id))
            .ok_or_else(|| StoreError::SectionNotFound(id.to_string()))
    }

    /// Add an existing note to a section; returns its id
    pub fn add_note(&mut self, section_id: &str, mut note: Note) -> StoreResult<String> {
        let section = self.section_mut(section_id)?;
        note.section_id = section_id.to_string();
        let id = note.id.clone();
        section.notes.push(note);
        debug!(section = %section_id, note = %id, "Added note");
        Ok(id)
    }

    /// Add a "New Note" with one empty paragraph
    pub fn new_note(&mut self, section_id: &str) -> StoreResult<String> {
        self.add_note(section_id, Note::blank(section_id))
    }

    pub fn find_note(&self, id: &str) -> Option<&Note> {
        self.notebooks
            .iter()
            .flat_map(|notebook| &notebook.sections)
            .find_map(|section| section.note(id))
    }

    fn note_mut(&mut self, id: &str) -> StoreResult<&mut Note> {
        self.notebooks
            .iter_mut()
            .flat_map(|notebook| &mut notebook.sections)
            .flat_map(|section| &mut section.notes)
            .find(|note| note.id == id)
            .ok_or_else(|| StoreError::NoteNotFound(id.to_string()))
    }

    pub fn update_note_content(&mut self, note_id: &str, content: ContentTree) -> StoreResult<()> {
        let note = self.note_mut(note_id)?;
        note.content = content;
        note.updated_at = Utc::now();
        Ok(())
    }

    pub fn update_note_title(&mut self, note_id: &str, title: &str) -> StoreResult<()> {
        let note = self.note_mut(note_id)?;
        note.title = title.to_string();
        note.updated_at = Utc::now();
        Ok(())
    }

    pub fn update_section_title(&mut self, section_id: &str, title: &str) -> StoreResult<()> {
        self.section_mut(section_id)?.title = title.to_string();
        Ok(())
    }

    /// Remove a section and its notes; clears the current section and note
    /// when they were inside it
    pub fn delete_section(&mut self, notebook_id: &str, section_id: &str) -> StoreResult<Section> {
        let notebook = self.notebook_mut(notebook_id)?;
        let index = notebook
            .sections
            .iter()
            .position(|section| section.id == section_id)
            .ok_or_else(|| StoreError::SectionNotFound(section_id.to_string()))?;
        let section = notebook.sections.remove(index);
        notebook.updated_at = Utc::now();

        if self.current_section.as_deref() == Some(section_id) {
            self.current_section = None;
            self.current_note = None;
        }
        if self
            .current_note
            .as_deref()
            .is_some_and(|note| section.note(note).is_some())
        {
            self.current_note = None;
        }
        Ok(section)
    }

    pub fn delete_note(&mut self, note_id: &str) -> StoreResult<Note> {
        let section = self
            .notebooks
            .iter_mut()
            .flat_map(|notebook| &mut notebook.sections)
            .find(|section| section.note(note_id).is_some())
            .ok_or_else(|| StoreError::NoteNotFound(note_id.to_string()))?;
        let index = section
            .notes
            .iter()
            .position(|note| note.id == note_id)
            .ok_or_else(|| StoreError::NoteNotFound(note_id.to_string()))?;
        let note = section.notes.remove(index);

        if self.current_note.as_deref() == Some(note_id) {
            self.current_note = None;
        }
        Ok(note)
    }

    /// Move the section at `from` so it ends up at `to`
    pub fn reorder_sections(&mut self, notebook_id: &str, from: usize, to: usize) -> StoreResult<()> {
        let notebook = self.notebook_mut(notebook_id)?;
        move_item(&mut notebook.sections, from, to)
    }

    /// Move the note at `from` so it ends up at `to`
    pub fn reorder_notes(&mut self, section_id: &str, from: usize, to: usize) -> StoreResult<()> {
        let section = self.section_mut(section_id)?;
        move_item(&mut section.notes, from, to)
    }

    pub fn set_current_notebook(&mut self, id: &str) -> StoreResult<()> {
        if self.notebook(id).is_none() {
            return Err(StoreError::NotebookNotFound(id.to_string()));
        }
        self.current_notebook = Some(id.to_string());
        Ok(())
    }

    pub fn set_current_section(&mut self, id: &str) -> StoreResult<()> {
        if self.find_section(id).is_none() {
            return Err(StoreError::SectionNotFound(id.to_string()));
        }
        self.current_section = Some(id.to_string());
        Ok(())
    }

    pub fn set_current_note(&mut self, id: &str) -> StoreResult<()> {
        if self.find_note(id).is_none() {
            return Err(StoreError::NoteNotFound(id.to_string()));
        }
        self.current_note = Some(id.to_string());
        Ok(())
    }

    pub fn current_notebook(&self) -> Option<&Notebook> {
        self.notebook(self.current_notebook.as_deref()?)
    }

    pub fn current_section(&self) -> Option<&Section> {
        self.find_section(self.current_section.as_deref()?)
    }

    pub fn current_note(&self) -> Option<&Note> {
        self.find_note(self.current_note.as_deref()?)
    }
}

fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> StoreResult<()> {
    let len = items.len();
    for index in [from, to] {
        if index >= len {
            return Err(StoreError::IndexOutOfRange { index, len });
        }
    }
    let item = items.remove(from);
    items.insert(to, item);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkpad_common::MockFileSystem;
    use inkpad_parser::lines_to_content;

    fn sample() -> (NotebookStore, String, String) {
        let mut store = NotebookStore::new();
        let notebook = store.add_notebook(Some("Personal"));
        let section = store.add_section(&notebook, Some("Ideas")).unwrap();
        (store, notebook, section)
    }

    fn note_titles(store: &NotebookStore, section: &str) -> Vec<String> {
        store
            .find_section(section)
            .unwrap()
            .notes
            .iter()
            .map(|note| note.title.clone())
            .collect()
    }

    #[test]
    fn test_new_note_defaults() {
        let (mut store, _, section) = sample();
        let id = store.new_note(&section).unwrap();
        let note = store.find_note(&id).unwrap();
        assert_eq!(note.title, "New Note");
        assert_eq!(note.section_id, section);
        assert_eq!(note.content, ContentTree::with_empty_paragraph());
    }

    #[test]
    fn test_update_content_bumps_timestamp() {
        let (mut store, _, section) = sample();
        let id = store.new_note(&section).unwrap();
        let before = store.find_note(&id).unwrap().updated_at;

        store
            .update_note_content(&id, lines_to_content("hello"))
            .unwrap();
        let note = store.find_note(&id).unwrap();
        assert_eq!(note.content, lines_to_content("hello"));
        assert!(note.updated_at >= before);

        assert!(matches!(
            store.update_note_content("missing", ContentTree::new()),
            Err(StoreError::NoteNotFound(_))
        ));
    }

    #[test]
    fn test_delete_section_clears_current_selection() {
        let (mut store, notebook, section) = sample();
        let note = store.new_note(&section).unwrap();
        store.set_current_section(&section).unwrap();
        store.set_current_note(&note).unwrap();

        let removed = store.delete_section(&notebook, &section).unwrap();
        assert_eq!(removed.notes.len(), 1);
        assert!(store.current_section().is_none());
        assert!(store.current_note().is_none());
        assert!(store.find_note(&note).is_none());
    }

    #[test]
    fn test_delete_note_clears_current_note() {
        let (mut store, _, section) = sample();
        let keep = store.new_note(&section).unwrap();
        let doomed = store.new_note(&section).unwrap();
        store.set_current_note(&doomed).unwrap();

        store.delete_note(&doomed).unwrap();
        assert!(store.current_note().is_none());
        assert!(store.find_note(&keep).is_some());
    }

    #[test]
    fn test_reorder_notes() {
        let (mut store, _, section) = sample();
        for title in ["a", "b", "c"] {
            let id = store.new_note(&section).unwrap();
            store.update_note_title(&id, title).unwrap();
        }

        store.reorder_notes(&section, 0, 2).unwrap();
        assert_eq!(note_titles(&store, &section), vec!["b", "c", "a"]);

        assert!(matches!(
            store.reorder_notes(&section, 0, 3),
            Err(StoreError::IndexOutOfRange { index: 3, len: 3 })
        ));
    }

    #[test]
    fn test_reorder_sections() {
        let (mut store, notebook, first) = sample();
        let second = store.add_section(&notebook, None).unwrap();
        store.reorder_sections(&notebook, 1, 0).unwrap();

        let ids: Vec<&str> = store
            .notebook(&notebook)
            .unwrap()
            .sections
            .iter()
            .map(|section| section.id.as_str())
            .collect();
        assert_eq!(ids, vec![second.as_str(), first.as_str()]);
    }

    #[test]
    fn test_save_and_load() {
        let (mut store, notebook, section) = sample();
        let note = store.new_note(&section).unwrap();
        store.set_current_notebook(&notebook).unwrap();
        store.set_current_note(&note).unwrap();

        let mut fs = MockFileSystem::new();
        let path = Path::new("/data/notebooks.json");
        store.save(&mut fs, path).unwrap();

        let loaded = NotebookStore::load(&fs, path).unwrap();
        assert_eq!(loaded, store);
        assert_eq!(loaded.current_note().map(|n| n.id.as_str()), Some(note.as_str()));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let fs = MockFileSystem::new();
        let store = NotebookStore::load(&fs, Path::new("nope.json")).unwrap();
        assert!(store.notebooks.is_empty());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let mut fs = MockFileSystem::new();
        fs.add_file("bad.json", "not json");
        assert!(matches!(
            NotebookStore::load(&fs, Path::new("bad.json")),
            Err(StoreError::Serde(_))
        ));
    }
}
