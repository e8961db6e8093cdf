//! # Inkpad Parser
//!
//! Note content model and the ways content enters the system:
//! - [`ast`]: the arena-backed Content Tree
//! - [`content`]: the nested JSON wire form, strict parsing and lenient loading
//! - [`import`]: plain-text/markdown import and HTML sanitization

pub mod ast;
pub mod content;
pub mod error;
pub mod import;

pub use ast::{
    Block, BlockKind, ChildRule, ContentTree, Element, MarkFormat, Node, NodeData, NodeId,
    TextLeaf,
};
pub use content::{
    load_content, parse_content, parse_content_value, serialize_content,
    serialize_content_pretty, ContentNode, ElementNode,
};
pub use error::{ParseError, ParseResult};
pub use import::{
    decode_import, lines_to_content, sanitize_html, sanitize_title, sanitized_lines,
    validate_import, ImportSource, MAX_IMPORT_BYTES,
};
