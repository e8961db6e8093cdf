//! # Export
//!
//! Flattens a note into plain text, Markdown or HTML for download.
//!
//! - `txt`: one line per text block, table cells tab-separated
//! - `md`: list items prefixed with `- ` / `1. `, tables as pipe rows
//! - `html`: `<p>`, `<ul>`/`<ol>`/`<li>` and `<table>` with escaped text

use crate::errors::EditorError;
use inkpad_common::{walk_block, Visitor};
use inkpad_parser::{Block, BlockKind, ContentTree, NodeId, TextLeaf};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Txt,
    Md,
    Html,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Txt, ExportFormat::Md, ExportFormat::Html];

    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Md => "md",
            ExportFormat::Html => "html",
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            ExportFormat::Txt => "text/plain",
            ExportFormat::Md => "text/markdown",
            ExportFormat::Html => "text/html",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_start_matches('.');
        Self::ALL
            .into_iter()
            .find(|format| format.extension().eq_ignore_ascii_case(name))
            .or_else(|| name.eq_ignore_ascii_case("markdown").then_some(ExportFormat::Md))
            .ok_or_else(|| EditorError::UnknownExportFormat(s.to_string()))
    }
}

pub fn export(tree: &ContentTree, format: ExportFormat) -> String {
    match format {
        ExportFormat::Txt => {
            let mut exporter = PlainText::default();
            exporter.visit_tree(tree);
            exporter.lines.join("\n")
        }
        ExportFormat::Md => {
            let mut exporter = Markdown::default();
            exporter.visit_tree(tree);
            exporter.lines.join("\n")
        }
        ExportFormat::Html => {
            let mut exporter = Html::default();
            exporter.visit_tree(tree);
            exporter.out
        }
    }
}

fn cell_texts(tree: &ContentTree, row: &Block) -> Vec<String> {
    row.children.iter().map(|cell| tree.block_text(*cell)).collect()
}

#[derive(Default)]
struct PlainText {
    lines: Vec<String>,
}

impl Visitor for PlainText {
    fn visit_block(&mut self, tree: &ContentTree, id: NodeId, block: &Block) {
        match block.kind() {
            BlockKind::TableRow => self.lines.push(cell_texts(tree, block).join("\t")),
            kind if kind.holds_text() => self.lines.push(tree.block_text(id)),
            _ => walk_block(self, tree, block),
        }
    }
}

#[derive(Default)]
struct Markdown {
    lines: Vec<String>,
}

impl Markdown {
    fn table(&mut self, tree: &ContentTree, table: &Block) {
        for (index, row) in table.children.iter().enumerate() {
            let Some(row) = tree.block(*row) else {
                continue;
            };
            let cells: Vec<String> = cell_texts(tree, row)
                .into_iter()
                .map(|text| text.replace('\n', " "))
                .collect();
            self.lines.push(format!("| {} |", cells.join(" | ")));
            if index == 0 {
                let rule = vec!["---"; cells.len()].join(" | ");
                self.lines.push(format!("| {rule} |"));
            }
        }
    }
}

impl Visitor for Markdown {
    fn visit_block(&mut self, tree: &ContentTree, id: NodeId, block: &Block) {
        match block.kind() {
            BlockKind::BulletedList | BlockKind::NumberedList => {
                let numbered = block.kind() == BlockKind::NumberedList;
                for (index, item) in block.children.iter().enumerate() {
                    let text = tree.block_text(*item);
                    if numbered {
                        self.lines.push(format!("{}. {text}", index + 1));
                    } else {
                        self.lines.push(format!("- {text}"));
                    }
                }
            }
            BlockKind::ListItem => self.lines.push(format!("- {}", tree.block_text(id))),
            BlockKind::Table => self.table(tree, block),
            kind if kind.holds_text() => self.lines.push(tree.block_text(id)),
            _ => walk_block(self, tree, block),
        }
    }
}

#[derive(Default)]
struct Html {
    out: String,
}

fn html_tag(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Paragraph => "p",
        BlockKind::BulletedList => "ul",
        BlockKind::NumberedList => "ol",
        BlockKind::ListItem => "li",
        BlockKind::Table => "table",
        BlockKind::TableRow => "tr",
        BlockKind::TableCell => "td",
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

impl Visitor for Html {
    fn visit_block(&mut self, tree: &ContentTree, id: NodeId, block: &Block) {
        if tree.parent(id).is_none() && !self.out.is_empty() {
            self.out.push('\n');
        }
        let tag = html_tag(block.kind());
        self.out.push_str(&format!("<{tag}>"));
        walk_block(self, tree, block);
        self.out.push_str(&format!("</{tag}>"));
    }

    fn visit_leaf(&mut self, _tree: &ContentTree, _id: NodeId, leaf: &TextLeaf) {
        let mut html = escape_html(&leaf.text).replace('\n', "<br>");
        if leaf.bold {
            html = format!("<strong>{html}</strong>");
        }
        if leaf.italic {
            html = format!("<em>{html}</em>");
        }
        if leaf.underline {
            html = format!("<u>{html}</u>");
        }
        if let Some(color) = leaf.background_color.as_deref().filter(|c| !c.is_empty()) {
            html = format!(
                r#"<span style="background-color: {}">{html}</span>"#,
                escape_html(color)
            );
        }
        self.out.push_str(&html);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkpad_parser::parse_content;

    fn sample() -> ContentTree {
        parse_content(
            r#"[
                { "type": "paragraph", "children": [{ "text": "Groceries & ", "bold": true }, { "text": "<stuff>" }] },
                { "type": "numbered-list", "children": [
                    { "type": "list-item", "children": [{ "text": "milk" }] },
                    { "type": "list-item", "children": [{ "text": "eggs" }] }
                ]},
                { "type": "table", "children": [
                    { "type": "table-row", "children": [
                        { "type": "table-cell", "children": [{ "text": "a" }] },
                        { "type": "table-cell", "children": [{ "text": "b" }] }
                    ]}
                ]}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(
            export(&sample(), ExportFormat::Txt),
            "Groceries & <stuff>\nmilk\neggs\na\tb"
        );
    }

    #[test]
    fn test_markdown() {
        assert_eq!(
            export(&sample(), ExportFormat::Md),
            "Groceries & <stuff>\n1. milk\n2. eggs\n| a | b |\n| --- | --- |"
        );
    }

    #[test]
    fn test_html_escapes_text() {
        let html = export(&sample(), ExportFormat::Html);
        let lines: Vec<&str> = html.lines().collect();
        assert_eq!(
            lines[0],
            "<p><strong>Groceries &amp; </strong>&lt;stuff&gt;</p>"
        );
        assert_eq!(lines[1], "<ol><li>milk</li><li>eggs</li></ol>");
        assert_eq!(
            lines[2],
            "<table><tr><td>a</td><td>b</td></tr></table>"
        );
    }

    #[test]
    fn test_format_names() {
        assert_eq!("MD".parse::<ExportFormat>().unwrap(), ExportFormat::Md);
        assert_eq!(".html".parse::<ExportFormat>().unwrap(), ExportFormat::Html);
        assert_eq!("markdown".parse::<ExportFormat>().unwrap(), ExportFormat::Md);
        assert!("pdf".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Md.media_type(), "text/markdown");
    }
}
