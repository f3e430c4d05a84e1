//! Table structure commands: rows, columns, metadata.
//!
//! All commands take the table's block index explicitly (cell focus lives
//! at the editor level, not in the document selection) and silently no-op
//! on any structural lookup that misses.

use smol_str::SmolStr;

use crate::block::{Block, BlockKind, ColAlign, even_widths, join_nums, meta};
use crate::line::Line;
use crate::state::EditorState;
use crate::step::Step;
use crate::transaction::Transaction;

fn table_at(state: &EditorState, index: usize) -> Option<&Block> {
    state
        .doc()
        .block(index)
        .filter(|b| b.kind == BlockKind::Table)
}

fn replace_table(state: &EditorState, index: usize, table: Block) -> Transaction {
    Transaction::new(state.selection()).step(Step::ReplaceBlock {
        index,
        block: table,
    })
}

fn empty_row(cols: usize) -> Block {
    let cells = (0..cols).map(|_| Block::new(BlockKind::TableCell)).collect();
    Block {
        kind: BlockKind::TableRow,
        indent: 0,
        lines: Vec::new(),
        children: cells,
        meta: Default::default(),
    }
}

/// Recompute column-count-dependent metadata after a column change.
fn refresh_column_meta(table: &mut Block, aligns: Vec<ColAlign>) {
    let cols = table.col_count();
    table.set_meta(meta::COLWIDTHS, Some(join_nums(&even_widths(cols))));
    let align: Vec<&str> = aligns.iter().map(|a| a.as_str()).collect();
    table.set_meta(meta::ALIGN, Some(SmolStr::new(align.join(","))));
}

/// Insert an empty row before `at_row` (`at_row == row_count` appends).
pub fn insert_row(state: &EditorState, table_index: usize, at_row: usize) -> Option<Transaction> {
    let table = table_at(state, table_index)?;
    if at_row > table.row_count() {
        return None;
    }
    let mut updated = table.clone();
    let row = empty_row(updated.col_count());
    updated.children.insert(at_row, row);
    Some(replace_table(state, table_index, updated))
}

/// Delete a row. The last remaining row cannot be deleted.
pub fn delete_row(state: &EditorState, table_index: usize, row: usize) -> Option<Transaction> {
    let table = table_at(state, table_index)?;
    if row >= table.row_count() || table.row_count() == 1 {
        return None;
    }
    let mut updated = table.clone();
    updated.children.remove(row);
    Some(replace_table(state, table_index, updated))
}

/// Insert an empty column before `at_col` in every row; widths reset to an
/// even split and the new column is left-aligned.
pub fn insert_column(
    state: &EditorState,
    table_index: usize,
    at_col: usize,
) -> Option<Transaction> {
    let table = table_at(state, table_index)?;
    if at_col > table.col_count() {
        return None;
    }
    let mut updated = table.clone();
    for row in &mut updated.children {
        row.children.insert(at_col, Block::new(BlockKind::TableCell));
    }
    let mut aligns = table.alignments();
    aligns.insert(at_col, ColAlign::Left);
    refresh_column_meta(&mut updated, aligns);
    Some(replace_table(state, table_index, updated))
}

/// Delete a column from every row. The last remaining column cannot be
/// deleted; widths reset to an even split.
pub fn delete_column(state: &EditorState, table_index: usize, col: usize) -> Option<Transaction> {
    let table = table_at(state, table_index)?;
    if col >= table.col_count() || table.col_count() == 1 {
        return None;
    }
    let mut updated = table.clone();
    for row in &mut updated.children {
        if col < row.children.len() {
            row.children.remove(col);
        }
    }
    let mut aligns = table.alignments();
    aligns.remove(col);
    refresh_column_meta(&mut updated, aligns);
    Some(replace_table(state, table_index, updated))
}

/// Toggle the header row on or off.
pub fn toggle_header_row(state: &EditorState, table_index: usize) -> Option<Transaction> {
    let table = table_at(state, table_index)?;
    let next = if table.header_rows() > 0 { "0" } else { "1" };
    Some(
        Transaction::new(state.selection()).step(Step::SetMeta {
            index: table_index,
            key: SmolStr::new(meta::HEADERS),
            value: Some(SmolStr::new(next)),
        }),
    )
}

/// Set or clear the caption.
pub fn set_caption(
    state: &EditorState,
    block_index: usize,
    caption: Option<&str>,
) -> Option<Transaction> {
    state.doc().block(block_index)?;
    Some(
        Transaction::new(state.selection()).step(Step::SetMeta {
            index: block_index,
            key: SmolStr::new(meta::CAPTION),
            value: caption.map(SmolStr::new),
        }),
    )
}

/// Persist integer column width percentages. The width list must match
/// the column count.
pub fn set_column_widths(
    state: &EditorState,
    table_index: usize,
    widths: &[u32],
) -> Option<Transaction> {
    let table = table_at(state, table_index)?;
    if widths.len() != table.col_count() {
        return None;
    }
    Some(
        Transaction::new(state.selection()).step(Step::SetMeta {
            index: table_index,
            key: SmolStr::new(meta::COLWIDTHS),
            value: Some(join_nums(widths)),
        }),
    )
}

/// Set one column's alignment.
pub fn set_alignment(
    state: &EditorState,
    table_index: usize,
    col: usize,
    align: ColAlign,
) -> Option<Transaction> {
    let table = table_at(state, table_index)?;
    if col >= table.col_count() {
        return None;
    }
    let mut aligns = table.alignments();
    aligns[col] = align;
    let value: Vec<&str> = aligns.iter().map(|a| a.as_str()).collect();
    Some(
        Transaction::new(state.selection()).step(Step::SetMeta {
            index: table_index,
            key: SmolStr::new(meta::ALIGN),
            value: Some(SmolStr::new(value.join(","))),
        }),
    )
}

/// Replace a cell's content with a single line (cell edit sync, cell
/// format toggles).
pub fn replace_cell_line(
    state: &EditorState,
    table_index: usize,
    row: usize,
    col: usize,
    line: Line,
) -> Option<Transaction> {
    let table = table_at(state, table_index)?;
    table.cell(row, col)?;
    let mut updated = table.clone();
    if let Some(cell) = updated.cell_mut(row, col) {
        cell.lines = vec![line];
    }
    Some(replace_table(state, table_index, updated))
}
