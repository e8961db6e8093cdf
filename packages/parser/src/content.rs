//! # Note Content Wire Form
//!
//! Notes are stored and exchanged as a nested JSON array compatible with the
//! editing surface:
//!
//! ```json
//! [
//!   { "type": "paragraph", "children": [{ "text": "Hello", "bold": true }] },
//!   { "type": "table", "rows": 1, "columns": 1, "children": [
//!     { "type": "table-row", "children": [
//!       { "type": "table-cell", "children": [{ "text": "" }] }
//!     ]}
//!   ]}
//! ]
//! ```
//!
//! The arena ([`ContentTree`]) is built from this form on load and flattened
//! back into it on save.

use crate::ast::{BlockKind, ContentTree, Element, NodeData, NodeId, TextLeaf};
use crate::error::{ParseError, ParseResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

/// One node of the nested wire form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentNode {
    Element(ElementNode),
    Text(TextLeaf),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<usize>,
    pub children: Vec<ContentNode>,
}

impl ElementNode {
    pub fn new(kind: BlockKind, children: Vec<ContentNode>) -> Self {
        Self {
            kind,
            rows: None,
            columns: None,
            children,
        }
    }

    fn to_element(&self) -> Element {
        match self.kind {
            BlockKind::Table => {
                // Missing declared dimensions are taken from the children
                let rows = self.rows.unwrap_or(self.children.len());
                let columns = self.columns.unwrap_or_else(|| {
                    self.children
                        .first()
                        .map(|row| match row {
                            ContentNode::Element(row) => row.children.len(),
                            ContentNode::Text(_) => 0,
                        })
                        .unwrap_or(0)
                });
                Element::Table { rows, columns }
            }
            kind => Element::from_kind(kind),
        }
    }
}

impl ContentTree {
    /// Build an arena from the nested wire form
    pub fn from_nodes(nodes: &[ContentNode]) -> Self {
        let mut tree = Self::new();
        for node in nodes {
            let id = tree.build_node(node);
            let index = tree.roots().len();
            tree.insert_root(index, id);
        }
        tree
    }

    fn build_node(&mut self, node: &ContentNode) -> NodeId {
        match node {
            ContentNode::Text(leaf) => self.alloc_leaf(leaf.clone()),
            ContentNode::Element(element) => {
                let children = element
                    .children
                    .iter()
                    .map(|child| self.build_node(child))
                    .collect();
                self.alloc_block(element.to_element(), children)
            }
        }
    }

    /// Flatten the arena into the nested wire form
    pub fn to_nodes(&self) -> Vec<ContentNode> {
        self.roots()
            .iter()
            .filter_map(|id| self.export_node(*id))
            .collect()
    }

    fn export_node(&self, id: NodeId) -> Option<ContentNode> {
        let node = self.node(id)?;
        Some(match &node.data {
            NodeData::Text(leaf) => ContentNode::Text(leaf.clone()),
            NodeData::Block(block) => {
                let (rows, columns) = match block.element {
                    Element::Table { rows, columns } => (Some(rows), Some(columns)),
                    _ => (None, None),
                };
                ContentNode::Element(ElementNode {
                    kind: block.kind(),
                    rows,
                    columns,
                    children: block
                        .children
                        .iter()
                        .filter_map(|child| self.export_node(*child))
                        .collect(),
                })
            }
        })
    }
}

impl Serialize for ContentTree {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_nodes().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ContentTree {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let nodes = Vec::<ContentNode>::deserialize(deserializer)?;
        Ok(ContentTree::from_nodes(&nodes))
    }
}

/// Strictly parse note content JSON
pub fn parse_content(source: &str) -> ParseResult<ContentTree> {
    let value: Value = serde_json::from_str(source)?;
    parse_content_value(value)
}

/// Strictly parse an already-decoded JSON value
pub fn parse_content_value(value: Value) -> ParseResult<ContentTree> {
    let items = value
        .as_array()
        .ok_or_else(|| ParseError::invalid_content("$", "content must be an array of blocks"))?;

    for (index, item) in items.iter().enumerate() {
        validate_node(item, &format!("$[{index}]"), true)?;
    }

    let nodes: Vec<ContentNode> = serde_json::from_value(value)?;
    Ok(ContentTree::from_nodes(&nodes))
}

/// Lenient load used when binding a note: malformed content is replaced by
/// the default single empty paragraph.
pub fn load_content(source: &str) -> ContentTree {
    match parse_content(source) {
        Ok(tree) => tree,
        Err(e) => {
            warn!(error = %e, "Malformed note content, substituting empty paragraph");
            ContentTree::with_empty_paragraph()
        }
    }
}

pub fn serialize_content(tree: &ContentTree) -> ParseResult<String> {
    Ok(serde_json::to_string(tree)?)
}

pub fn serialize_content_pretty(tree: &ContentTree) -> ParseResult<String> {
    Ok(serde_json::to_string_pretty(tree)?)
}

fn validate_node(value: &Value, path: &str, top_level: bool) -> ParseResult<()> {
    let object = value
        .as_object()
        .ok_or_else(|| ParseError::invalid_content(path, "expected an object"))?;

    if let Some(kind) = object.get("type") {
        let name = kind
            .as_str()
            .ok_or_else(|| ParseError::invalid_content(path, "`type` must be a string"))?;
        if BlockKind::from_name(name).is_none() {
            return Err(ParseError::invalid_content(
                path,
                format!("unknown block type `{name}`"),
            ));
        }
        let children = object
            .get("children")
            .and_then(Value::as_array)
            .ok_or_else(|| ParseError::invalid_content(path, "block requires a `children` array"))?;
        for (index, child) in children.iter().enumerate() {
            validate_node(child, &format!("{path}.children[{index}]"), false)?;
        }
        return Ok(());
    }

    if top_level {
        return Err(ParseError::invalid_content(path, "top-level nodes must be blocks"));
    }

    match object.get("text") {
        Some(Value::String(_)) => Ok(()),
        Some(_) => Err(ParseError::invalid_content(path, "`text` must be a string")),
        None => Err(ParseError::invalid_content(
            path,
            "expected a block with `type` or a leaf with `text`",
        )),
    }
}
