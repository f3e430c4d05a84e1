//! Block-level commands: kind changes, indentation, block insertion.

use crate::block::{Block, BlockKind, MAX_INDENT};
use crate::state::EditorState;
use crate::step::Step;
use crate::transaction::Transaction;

/// Textual blocks covered by the current selection.
fn selected_textual_blocks(state: &EditorState) -> Vec<usize> {
    let sel = state.selection();
    let (start, end) = (sel.start().block, sel.end().block);
    (start..=end)
        .filter(|&i| {
            state
                .doc()
                .block(i)
                .is_some_and(|b| b.kind.is_textual())
        })
        .collect()
}

/// Set the kind of every textual block in the selection. Only textual
/// kinds are valid targets.
pub fn set_block_kind(state: &EditorState, kind: BlockKind) -> Option<Transaction> {
    if !kind.is_textual() {
        return None;
    }
    let targets = selected_textual_blocks(state);
    let steps: Vec<Step> = targets
        .into_iter()
        .filter(|&i| state.doc().block(i).map(|b| b.kind) != Some(kind))
        .map(|index| Step::SetBlockKind { index, kind })
        .collect();
    if steps.is_empty() {
        return None;
    }
    Some(Transaction::with_steps(steps, state.selection()))
}

/// Toggle a block kind: if every selected textual block already has the
/// kind, revert to paragraph; otherwise apply the kind.
pub fn toggle_block_kind(state: &EditorState, kind: BlockKind) -> Option<Transaction> {
    if !kind.is_textual() {
        return None;
    }
    let targets = selected_textual_blocks(state);
    if targets.is_empty() {
        return None;
    }
    let all_match = targets
        .iter()
        .all(|&i| state.doc().block(i).map(|b| b.kind) == Some(kind));
    let target_kind = if all_match { BlockKind::Paragraph } else { kind };
    let steps: Vec<Step> = targets
        .into_iter()
        .filter(|&i| state.doc().block(i).map(|b| b.kind) != Some(target_kind))
        .map(|index| Step::SetBlockKind {
            index,
            kind: target_kind,
        })
        .collect();
    if steps.is_empty() {
        return None;
    }
    Some(Transaction::with_steps(steps, state.selection()))
}

fn shift_indent(state: &EditorState, delta: i8) -> Option<Transaction> {
    let steps: Vec<Step> = selected_textual_blocks(state)
        .into_iter()
        .filter_map(|index| {
            let block = state.doc().block(index)?;
            let indent = (block.indent as i8 + delta).clamp(0, MAX_INDENT as i8) as u8;
            (indent != block.indent).then_some(Step::SetIndent { index, indent })
        })
        .collect();
    if steps.is_empty() {
        return None;
    }
    Some(Transaction::with_steps(steps, state.selection()))
}

/// Increase indent of the selected blocks (clamped to the maximum).
pub fn indent(state: &EditorState) -> Option<Transaction> {
    shift_indent(state, 1)
}

/// Decrease indent of the selected blocks (clamped to zero).
pub fn outdent(state: &EditorState) -> Option<Transaction> {
    shift_indent(state, -1)
}

fn insert_after_cursor(state: &EditorState, block: Block) -> Transaction {
    let index = state.selection().start().block + 1;
    Transaction::new(state.selection()).step(Step::InsertBlock { index, block })
}

/// Insert a `rows` × `cols` table after the current block. Focus placement
/// in the first cell is the table handler's job (`focus_block`).
pub fn insert_table(state: &EditorState, rows: usize, cols: usize) -> Option<Transaction> {
    if rows == 0 || cols == 0 {
        return None;
    }
    Some(insert_after_cursor(state, Block::table(rows, cols)))
}

/// Insert an empty equation block after the current block.
pub fn insert_equation(state: &EditorState) -> Transaction {
    insert_after_cursor(state, Block::new(BlockKind::Equation))
}

/// Insert an empty diagram block after the current block.
pub fn insert_diagram(state: &EditorState) -> Transaction {
    insert_after_cursor(state, Block::new(BlockKind::Diagram))
}
