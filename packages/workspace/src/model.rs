//! Notebooks, sections and notes as stored on disk.
//!
//! The JSON shape is camelCase with RFC 3339 timestamps; note content uses the
//! nested wire form of the content tree.

use chrono::{DateTime, Utc};
use inkpad_parser::{parse_content_value, ContentTree};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;
use uuid::Uuid;

pub const DEFAULT_NOTEBOOK_TITLE: &str = "Untitled Notebook";
pub const DEFAULT_SECTION_TITLE: &str = "New Section";
pub const NEW_NOTE_TITLE: &str = "New Note";

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notebook {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Notebook {
    /// Blank titles fall back to "Untitled Notebook"
    pub fn new(title: Option<&str>) -> Self {
        let title = title
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .unwrap_or(DEFAULT_NOTEBOOK_TITLE);
        let now = Utc::now();
        Self {
            id: new_id(),
            title: title.to_string(),
            sections: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|section| section.id == id)
    }

    pub fn section_mut(&mut self, id: &str) -> Option<&mut Section> {
        self.sections.iter_mut().find(|section| section.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub notes: Vec<Note>,
    pub notebook_id: String,
}

impl Section {
    pub fn new(notebook_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            title: title.into(),
            notes: Vec::new(),
            notebook_id: notebook_id.into(),
        }
    }

    pub fn note(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|note| note.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    #[serde(
        default = "ContentTree::with_empty_paragraph",
        deserialize_with = "lenient_content"
    )]
    pub content: ContentTree,
    pub section_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(section_id: impl Into<String>, title: impl Into<String>, content: ContentTree) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            title: title.into(),
            content,
            section_id: section_id.into(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// "New Note" holding one empty paragraph
    pub fn blank(section_id: impl Into<String>) -> Self {
        Self::new(section_id, NEW_NOTE_TITLE, ContentTree::with_empty_paragraph())
    }
}

/// Malformed stored content becomes one empty paragraph instead of failing
/// the whole store
fn lenient_content<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ContentTree, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(parse_content_value(value).unwrap_or_else(|e| {
        warn!(error = %e, "Malformed stored note content, substituting empty paragraph");
        ContentTree::with_empty_paragraph()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_titles_use_default() {
        assert_eq!(Notebook::new(None).title, DEFAULT_NOTEBOOK_TITLE);
        assert_eq!(Notebook::new(Some("  ")).title, DEFAULT_NOTEBOOK_TITLE);
        assert_eq!(Notebook::new(Some("Work")).title, "Work");
    }

    #[test]
    fn test_malformed_note_content_is_replaced() {
        let json = r#"{
            "id": "n1",
            "title": "Broken",
            "content": {"type": "paragraph"},
            "sectionId": "s1",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert_eq!(note.content, ContentTree::with_empty_paragraph());
        assert!(note.tags.is_empty());
    }

    #[test]
    fn test_note_json_shape() {
        let note = Note::blank("s1");
        let value = serde_json::to_value(&note).unwrap();
        assert_eq!(value["sectionId"], "s1");
        assert_eq!(value["title"], NEW_NOTE_TITLE);
        assert_eq!(
            value["content"],
            serde_json::json!([{ "type": "paragraph", "children": [{ "text": "" }] }])
        );
        assert!(Uuid::parse_str(&note.id).is_ok());
    }
}
