//! Table creation and row/column editing.
//!
//! The declared `rows`/`columns` on a table are metadata: set when the table
//! is built and adjusted by the row/column operations here. Nothing else
//! reconciles them against the actual children.

use crate::mutations::{Applied, MutationError};
use crate::selection::{Point, Range};
use inkpad_parser::{BlockKind, ContentTree, Element, NodeId, TextLeaf};

/// Where the caret sits inside a table
#[derive(Debug, Clone, Copy)]
struct CellPosition {
    table: NodeId,
    row: NodeId,
    row_index: usize,
    column: usize,
}

fn locate_cell(tree: &ContentTree, selection: Option<&Range>) -> Option<CellPosition> {
    let start = selection?.start(tree);
    let cell = tree.closest(start.leaf, BlockKind::TableCell)?;
    let row = tree
        .parent(cell)
        .filter(|row| tree.kind(*row) == Some(BlockKind::TableRow))?;
    let table = tree
        .parent(row)
        .filter(|table| tree.kind(*table) == Some(BlockKind::Table))?;
    Some(CellPosition {
        table,
        row,
        row_index: tree.index_in_parent(row)?,
        column: tree.index_in_parent(cell)?,
    })
}

fn empty_cell(tree: &mut ContentTree) -> NodeId {
    let leaf = tree.alloc_leaf(TextLeaf::default());
    tree.alloc_block(Element::TableCell, vec![leaf])
}

fn empty_row(tree: &mut ContentTree, columns: usize) -> NodeId {
    let mut cells = Vec::with_capacity(columns);
    for _ in 0..columns {
        cells.push(empty_cell(tree));
    }
    tree.alloc_block(Element::TableRow, cells)
}

/// Build a detached `rows` x `columns` table of empty cells
pub fn build_table(tree: &mut ContentTree, rows: usize, columns: usize) -> NodeId {
    let mut children = Vec::with_capacity(rows);
    for _ in 0..rows {
        children.push(empty_row(tree, columns));
    }
    tree.alloc_block(Element::Table { rows, columns }, children)
}

fn adjust_dimensions(tree: &mut ContentTree, table: NodeId, row_delta: isize, column_delta: isize) {
    if let Some(block) = tree.block_mut(table) {
        if let Element::Table { rows, columns } = &mut block.element {
            *rows = rows.saturating_add_signed(row_delta);
            *columns = columns.saturating_add_signed(column_delta);
        }
    }
}

/// Caret at the start of `row`'s cell nearest to `column`
fn caret_in_row(tree: &ContentTree, row: NodeId, column: usize) -> Option<Range> {
    let cells = tree.children(row);
    let cell = cells.get(column).or(cells.last())?;
    Point::start_of(tree, *cell).map(Range::collapsed)
}

pub(crate) fn insert_table(
    tree: &mut ContentTree,
    rows: usize,
    columns: usize,
    selection: Option<Range>,
) -> Result<Applied, MutationError> {
    let table = build_table(tree, rows, columns);
    let index = selection
        .and_then(|range| {
            let top = tree.top_level(range.start(tree).leaf);
            tree.index_in_parent(top)
        })
        .map_or(tree.roots().len(), |index| index + 1);
    tree.insert_root(index, table);

    Ok(Applied::changed(
        Point::start_of(tree, table).map(Range::collapsed),
    ))
}

pub(crate) fn insert_row(
    tree: &mut ContentTree,
    selection: Option<Range>,
) -> Result<Applied, MutationError> {
    let Some(position) = locate_cell(tree, selection.as_ref()) else {
        return Ok(Applied::unchanged(selection));
    };

    let width = tree.children(position.row).len();
    let row = empty_row(tree, width);
    tree.insert_child(position.table, position.row_index + 1, row);
    adjust_dimensions(tree, position.table, 1, 0);

    Ok(Applied::changed(caret_in_row(tree, row, position.column)))
}

pub(crate) fn insert_column(
    tree: &mut ContentTree,
    selection: Option<Range>,
) -> Result<Applied, MutationError> {
    let Some(position) = locate_cell(tree, selection.as_ref()) else {
        return Ok(Applied::unchanged(selection));
    };

    for row in tree.children(position.table).to_vec() {
        let cell = empty_cell(tree);
        tree.insert_child(row, position.column + 1, cell);
    }
    adjust_dimensions(tree, position.table, 0, 1);

    Ok(Applied::changed(caret_in_row(
        tree,
        position.row,
        position.column + 1,
    )))
}

pub(crate) fn remove_row(
    tree: &mut ContentTree,
    selection: Option<Range>,
) -> Result<Applied, MutationError> {
    let Some(position) = locate_cell(tree, selection.as_ref()) else {
        return Ok(Applied::unchanged(selection));
    };

    let rows = tree.children(position.table).to_vec();
    if rows.len() <= 1 {
        return Ok(remove_table(tree, position.table));
    }

    let neighbour = if position.row_index > 0 {
        rows[position.row_index - 1]
    } else {
        rows[1]
    };
    tree.remove_subtree(position.row);
    adjust_dimensions(tree, position.table, -1, 0);

    Ok(Applied::changed(caret_in_row(tree, neighbour, position.column)))
}

pub(crate) fn remove_column(
    tree: &mut ContentTree,
    selection: Option<Range>,
) -> Result<Applied, MutationError> {
    let Some(position) = locate_cell(tree, selection.as_ref()) else {
        return Ok(Applied::unchanged(selection));
    };

    if tree.children(position.row).len() <= 1 {
        return Ok(remove_table(tree, position.table));
    }

    // Rows emptied by this are left to the normalizer
    for row in tree.children(position.table).to_vec() {
        if let Some(cell) = tree.children(row).get(position.column).copied() {
            tree.remove_subtree(cell);
        }
    }
    adjust_dimensions(tree, position.table, 0, -1);

    let column = position.column.saturating_sub(1);
    Ok(Applied::changed(caret_in_row(tree, position.row, column)))
}

fn remove_table(tree: &mut ContentTree, table: NodeId) -> Applied {
    let index = tree.index_in_parent(table).unwrap_or(0);
    tree.remove_subtree(table);

    let caret = tree
        .roots()
        .get(index)
        .and_then(|next| Point::start_of(tree, *next))
        .or_else(|| {
            let previous = *tree.roots().get(index.checked_sub(1)?)?;
            Point::end_of(tree, previous)
        })
        .map(Range::collapsed);
    Applied::changed(caret)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_tree(rows: usize, columns: usize) -> (ContentTree, NodeId) {
        let mut tree = ContentTree::with_empty_paragraph();
        let table = build_table(&mut tree, rows, columns);
        tree.insert_root(1, table);
        (tree, table)
    }

    fn caret_in_cell(tree: &ContentTree, table: NodeId, row: usize, column: usize) -> Range {
        let row = tree.children(table)[row];
        let cell = tree.children(row)[column];
        Range::collapsed(Point::start_of(tree, cell).unwrap())
    }

    fn declared(tree: &ContentTree, table: NodeId) -> (usize, usize) {
        match tree.block(table).map(|block| &block.element) {
            Some(Element::Table { rows, columns }) => (*rows, *columns),
            _ => panic!("not a table"),
        }
    }

    #[test]
    fn test_insert_table_after_caret_block() {
        let mut tree = ContentTree::with_empty_paragraph();
        let caret = Range::collapsed(Point::start_of(&tree, tree.roots()[0]).unwrap());

        let applied = insert_table(&mut tree, 2, 3, Some(caret)).unwrap();
        let table = tree.roots()[1];
        assert_eq!(tree.kind(table), Some(BlockKind::Table));
        assert_eq!(declared(&tree, table), (2, 3));

        let first_cell = tree.children(tree.children(table)[0])[0];
        let selection = applied.selection.unwrap();
        assert_eq!(tree.parent(selection.anchor.leaf), Some(first_cell));
    }

    #[test]
    fn test_insert_row_and_column_update_dimensions() {
        let (mut tree, table) = table_tree(2, 2);

        let caret = caret_in_cell(&tree, table, 0, 1);
        insert_row(&mut tree, Some(caret)).unwrap();
        assert_eq!(tree.children(table).len(), 3);

        let caret = caret_in_cell(&tree, table, 0, 0);
        let applied = insert_column(&mut tree, Some(caret)).unwrap();
        assert!(tree
            .children(table)
            .iter()
            .all(|row| tree.children(*row).len() == 3));
        assert_eq!(declared(&tree, table), (3, 3));

        // Caret moves into the new column of the same row
        let row = tree.children(table)[0];
        let new_cell = tree.children(row)[1];
        assert_eq!(
            tree.parent(applied.selection.unwrap().anchor.leaf),
            Some(new_cell)
        );
    }

    #[test]
    fn test_remove_last_row_removes_table() {
        let (mut tree, table) = table_tree(1, 2);
        let caret = caret_in_cell(&tree, table, 0, 0);

        let applied = remove_row(&mut tree, Some(caret)).unwrap();
        assert!(applied.changed);
        assert!(!tree.contains(table));
        assert_eq!(tree.roots().len(), 1);
        assert!(applied.selection.is_some());
    }

    #[test]
    fn test_remove_column() {
        let (mut tree, table) = table_tree(2, 2);
        let caret = caret_in_cell(&tree, table, 1, 1);

        remove_column(&mut tree, Some(caret)).unwrap();
        assert!(tree
            .children(table)
            .iter()
            .all(|row| tree.children(*row).len() == 1));
        assert_eq!(declared(&tree, table), (2, 1));
    }

    #[test]
    fn test_row_ops_outside_table_are_noops() {
        let mut tree = ContentTree::with_empty_paragraph();
        let caret = Range::collapsed(Point::start_of(&tree, tree.roots()[0]).unwrap());
        assert!(!insert_row(&mut tree, Some(caret)).unwrap().changed);
        assert!(!remove_column(&mut tree, None).unwrap().changed);
    }
}
