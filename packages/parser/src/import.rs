//! # Plain-Text Import
//!
//! Turns an opened `.txt`/`.md` file, or pasted text, into note content.
//! Input is rejected up front when it is too large or of the wrong type, so an
//! import either produces a whole tree or nothing.

use crate::ast::ContentTree;
use crate::error::{ParseError, ParseResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Largest accepted import, in bytes
pub const MAX_IMPORT_BYTES: usize = 5 * 1024 * 1024;

pub const ACCEPTED_MEDIA_TYPES: [&str; 2] = ["text/plain", "text/markdown"];
pub const ACCEPTED_EXTENSIONS: [&str; 2] = ["txt", "md"];

const FALLBACK_TITLE: &str = "Imported Note";

static SCRIPT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("valid script regex"));
static STYLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style\b[^>]*>.*?</style\s*>").expect("valid style regex"));
static COMMENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[A-Za-z][^<>]*>").expect("valid tag regex"));

/// A file handed over by the open-file dialog
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSource {
    pub file_name: String,
    /// Reported media type; empty or missing falls back to the extension
    pub media_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImportSource {
    pub fn new(file_name: impl Into<String>, media_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            media_type,
            bytes,
        }
    }
}

/// Strip markup from untrusted text. `<script>`/`<style>` bodies and comments
/// are dropped entirely; other tags are removed and their text kept.
pub fn sanitize_html(text: &str) -> String {
    let text = SCRIPT_RE.replace_all(text, "");
    let text = STYLE_RE.replace_all(&text, "");
    let text = COMMENT_RE.replace_all(&text, "");
    TAG_RE.replace_all(&text, "").into_owned()
}

/// Sanitize and split into lines (a trailing `\r` is dropped per line)
pub fn sanitized_lines(text: &str) -> Vec<String> {
    sanitize_html(text)
        .split('\n')
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}

/// One paragraph per line of sanitized text
pub fn lines_to_content(text: &str) -> ContentTree {
    let mut tree = ContentTree::new();
    for (index, line) in sanitized_lines(text).iter().enumerate() {
        let paragraph = tree.paragraph(line);
        tree.insert_root(index, paragraph);
    }
    tree
}

/// Check size and type, then decode the file as UTF-8
pub fn decode_import(source: &ImportSource, max_bytes: usize) -> ParseResult<String> {
    if source.bytes.len() > max_bytes {
        return Err(ParseError::file_too_large(source.bytes.len(), max_bytes));
    }

    if !is_accepted_type(source) {
        let reported = source
            .media_type
            .clone()
            .filter(|media_type| !media_type.is_empty())
            .unwrap_or_else(|| source.file_name.clone());
        return Err(ParseError::UnsupportedFileType(reported));
    }

    String::from_utf8(source.bytes.clone()).map_err(|_| ParseError::InvalidEncoding)
}

/// Check an import without keeping the decoded text
pub fn validate_import(source: &ImportSource) -> ParseResult<()> {
    decode_import(source, MAX_IMPORT_BYTES).map(drop)
}

fn is_accepted_type(source: &ImportSource) -> bool {
    match source.media_type.as_deref() {
        Some(media_type) if !media_type.is_empty() => ACCEPTED_MEDIA_TYPES.contains(&media_type),
        _ => Path::new(&source.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                ACCEPTED_EXTENSIONS
                    .iter()
                    .any(|accepted| accepted.eq_ignore_ascii_case(ext))
            }),
    }
}

/// Note title derived from a file name
pub fn sanitize_title(file_name: &str) -> String {
    let title = sanitize_html(file_name).trim().to_string();
    if title.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        title
    }
}
