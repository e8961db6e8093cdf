//! Browser bindings: an editing surface drives a [`NoteEditor`] with JSON
//! payloads. Selections cross the boundary as child-index paths, since node
//! ids mean nothing outside the tree.

use inkpad_editor::{
    Document, EditSession, EditorError, ExportFormat, Mutation, MutationResult, NoteStats, Point,
    Range,
};
use inkpad_parser::{
    decode_import, lines_to_content, parse_content, serialize_content, BlockKind, ContentTree,
    ImportSource, MarkFormat, ParseError, MAX_IMPORT_BYTES,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

#[derive(Error, Debug)]
pub enum BindingError {
    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Invalid payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Selection path {0:?} does not name a text leaf")]
    InvalidPath(Vec<usize>),
}

fn to_js(error: BindingError) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// A position as the editing surface sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub path: Vec<usize>,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRange {
    pub anchor: PathPoint,
    pub focus: PathPoint,
}

impl PathRange {
    fn resolve(&self, tree: &ContentTree) -> Result<Range, BindingError> {
        let point = |p: &PathPoint| {
            Point::from_path(tree, &p.path, p.offset)
                .ok_or_else(|| BindingError::InvalidPath(p.path.clone()))
        };
        Ok(Range::new(point(&self.anchor)?, point(&self.focus)?))
    }

    fn from_range(tree: &ContentTree, range: &Range) -> Option<Self> {
        let point = |p: &Point| {
            Some(PathPoint {
                path: p.path(tree)?,
                offset: p.offset,
            })
        };
        Some(Self {
            anchor: point(&range.anchor)?,
            focus: point(&range.focus)?,
        })
    }
}

/// Reply to every applied mutation
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub version: u64,
    pub changed: bool,
    pub replacements: usize,
    pub selection: Option<PathRange>,
    pub stats: NoteStats,
}

#[wasm_bindgen]
pub struct NoteEditor {
    session: EditSession,
}

#[wasm_bindgen]
impl NoteEditor {
    /// Open note content; malformed content loads as one empty paragraph
    #[wasm_bindgen(constructor)]
    pub fn new(note_id: &str, content_json: &str) -> NoteEditor {
        let mut session = EditSession::new(note_id, Document::load(content_json));
        session.selection = session.document.start();
        NoteEditor { session }
    }

    /// Apply a JSON mutation (e.g. `{"type":"toggleMark","format":"bold"}`)
    #[wasm_bindgen(js_name = applyMutation)]
    pub fn apply_mutation(&mut self, mutation_json: &str) -> Result<String, JsValue> {
        self.apply_json(mutation_json).map_err(to_js)
    }

    /// Set the selection from `{"anchor":{"path":[0,0],"offset":1},"focus":...}`,
    /// or clear it with `null`
    #[wasm_bindgen(js_name = setSelection)]
    pub fn set_selection(&mut self, selection_json: &str) -> Result<(), JsValue> {
        self.select_json(selection_json).map_err(to_js)
    }

    pub fn undo(&mut self) -> bool {
        self.session.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.session.redo()
    }

    /// Current content in the stored JSON form
    pub fn content(&self) -> Result<String, JsValue> {
        serialize_content(self.session.tree()).map_err(|e| to_js(e.into()))
    }

    pub fn selection(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.path_selection()).map_err(|e| to_js(e.into()))
    }

    pub fn stats(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.document.stats()).map_err(|e| to_js(e.into()))
    }

    /// Export as `txt`, `md` or `html`
    pub fn export(&self, format: &str) -> Result<String, JsValue> {
        let format: ExportFormat = format.parse().map_err(|e: EditorError| to_js(e.into()))?;
        Ok(self.session.document.export(format))
    }

    #[wasm_bindgen(js_name = isMarkActive)]
    pub fn is_mark_active(&self, format: &str) -> bool {
        MarkFormat::from_name(format).is_some_and(|format| {
            self.session
                .document
                .is_mark_active(format, self.session.selection.as_ref())
        })
    }

    #[wasm_bindgen(js_name = isBlockActive)]
    pub fn is_block_active(&self, kind: &str) -> bool {
        BlockKind::from_name(kind).is_some_and(|kind| {
            self.session
                .document
                .is_block_active(kind, self.session.selection.as_ref())
        })
    }

    /// Load a different note into this editor; history is cleared
    #[wasm_bindgen(js_name = replaceContent)]
    pub fn replace_content(&mut self, content_json: &str) -> Result<(), JsValue> {
        let tree = parse_content(content_json).map_err(|e| to_js(e.into()))?;
        self.session.replace_content(tree);
        self.session.selection = self.session.document.start();
        Ok(())
    }
}

impl NoteEditor {
    fn apply_json(&mut self, mutation_json: &str) -> Result<String, BindingError> {
        let mutation: Mutation = serde_json::from_str(mutation_json)?;
        let result = self.session.apply(mutation)?;
        Ok(serde_json::to_string(&self.response(&result))?)
    }

    fn select_json(&mut self, selection_json: &str) -> Result<(), BindingError> {
        let selection: Option<PathRange> = serde_json::from_str(selection_json)?;
        let range = selection
            .map(|selection| selection.resolve(self.session.tree()))
            .transpose()?;
        self.session.set_selection(range)?;
        Ok(())
    }

    fn path_selection(&self) -> Option<PathRange> {
        self.session
            .selection
            .as_ref()
            .and_then(|range| PathRange::from_range(self.session.tree(), range))
    }

    fn response(&self, result: &MutationResult) -> MutationResponse {
        MutationResponse {
            version: result.version,
            changed: result.changed,
            replacements: result.replacements,
            selection: self.path_selection(),
            stats: self.session.document.stats(),
        }
    }
}

fn import_text_inner(file_name: &str, media_type: &str, bytes: Vec<u8>) -> Result<String, BindingError> {
    let media_type = Some(media_type.to_string()).filter(|media_type| !media_type.is_empty());
    let source = ImportSource::new(file_name, media_type, bytes);
    let text = decode_import(&source, MAX_IMPORT_BYTES)?;
    Ok(serialize_content(&lines_to_content(&text))?)
}

/// Turn an opened `.txt`/`.md` file into note content JSON
#[wasm_bindgen(js_name = importText)]
pub fn import_text(file_name: &str, media_type: &str, bytes: Vec<u8>) -> Result<String, JsValue> {
    import_text_inner(file_name, media_type, bytes).map_err(to_js)
}

fn compute_stats_inner(content_json: &str) -> Result<String, BindingError> {
    let tree = parse_content(content_json)?;
    Ok(serde_json::to_string(&inkpad_editor::stats(&tree))?)
}

#[wasm_bindgen(js_name = computeStats)]
pub fn compute_stats(content_json: &str) -> Result<String, JsValue> {
    compute_stats_inner(content_json).map_err(to_js)
}
