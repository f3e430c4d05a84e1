//! Text-editing commands: insertion, deletion, block splitting/merging.

use crate::block::{Block, BlockKind};
use crate::line::Line;
use crate::selection::{Position, Selection};
use crate::state::EditorState;
use crate::step::Step;
use crate::transaction::Transaction;

/// The merged block resulting from deleting the text between two
/// positions, possibly spanning several blocks. Returns the delete steps
/// (not including the final replace) plus the merged block.
fn merge_for_delete(
    state: &EditorState,
    start: Position,
    end: Position,
) -> Option<(Vec<Step>, Block)> {
    let doc = state.doc();
    let first = doc.block(start.block)?;
    if !first.kind.is_textual() {
        return None;
    }

    if start.block == end.block {
        let mut merged = first.clone();
        merged.delete_range(start.offset..end.offset);
        return Some((Vec::new(), merged));
    }

    let last = doc.block(end.block)?;
    if !last.kind.is_textual() {
        return None;
    }

    let (left_lines, _) = first.split_lines_at(start.offset);
    let (_, right_lines) = last.split_lines_at(end.offset);

    let mut lines = left_lines;
    let mut right = right_lines.into_iter();
    if let (Some(seam), Some(tail)) = (lines.last_mut(), right.next()) {
        seam.append(tail);
    }
    lines.extend(right);

    let mut merged = first.clone();
    merged.lines = if lines.is_empty() {
        vec![Line::empty()]
    } else {
        lines
    };

    // Drop everything after the first block, up to and including the last.
    let steps = (start.block + 1..=end.block)
        .map(|_| Step::DeleteBlock {
            index: start.block + 1,
        })
        .collect();
    Some((steps, merged))
}

/// Replace the current selection with plain text (empty text = delete).
pub fn replace_selection(state: &EditorState, text: &str) -> Option<Transaction> {
    let sel = state.selection();
    let (start, end) = (sel.start(), sel.end());
    let (mut steps, mut merged) = merge_for_delete(state, start, end)?;
    merged.insert_text(start.offset, text);
    steps.push(Step::ReplaceBlock {
        index: start.block,
        block: merged,
    });
    let cursor = Position::new(start.block, start.offset + text.chars().count());
    Some(Transaction::with_steps(steps, Selection::cursor(cursor)))
}

/// Insert text at the cursor, replacing the selection if one exists.
pub fn insert_text(state: &EditorState, text: &str) -> Option<Transaction> {
    if text.is_empty() {
        return None;
    }
    replace_selection(state, text)
}

/// Split the current block at the cursor (Enter). A range selection is
/// deleted first; headings split into a fresh paragraph, other kinds
/// continue as themselves.
pub fn split_block(state: &EditorState) -> Option<Transaction> {
    let sel = state.selection();
    let (start, end) = (sel.start(), sel.end());
    let (mut steps, merged) = merge_for_delete(state, start, end)?;

    let (left_lines, right_lines) = merged.split_lines_at(start.offset);
    let mut left = merged.clone();
    left.lines = left_lines;

    let right_kind = if merged.kind.is_heading() {
        BlockKind::Paragraph
    } else {
        merged.kind
    };
    let mut right = Block::from_lines(right_kind, right_lines);
    right.indent = merged.indent;

    steps.push(Step::ReplaceBlock {
        index: start.block,
        block: left,
    });
    steps.push(Step::InsertBlock {
        index: start.block + 1,
        block: right,
    });
    let cursor = Position::new(start.block + 1, 0);
    Some(Transaction::with_steps(steps, Selection::cursor(cursor)))
}

/// Backspace: delete the selection, the char before the cursor, or merge
/// with the previous block at a block start.
pub fn delete_backward(state: &EditorState) -> Option<Transaction> {
    let sel = state.selection();
    if sel.is_range() {
        return replace_selection(state, "");
    }
    let pos = sel.head;
    let doc = state.doc();
    let block = doc.block(pos.block)?;
    if !block.kind.is_textual() {
        return None;
    }

    if pos.offset > 0 {
        let mut updated = block.clone();
        updated.delete_range(pos.offset - 1..pos.offset);
        let cursor = Position::new(pos.block, pos.offset - 1);
        return Some(
            Transaction::new(Selection::cursor(cursor)).step(Step::ReplaceBlock {
                index: pos.block,
                block: updated,
            }),
        );
    }

    // At block start: merge into the previous textual block.
    if pos.block == 0 {
        return None;
    }
    let prev = doc.block(pos.block - 1)?;
    if !prev.kind.is_textual() {
        return None;
    }
    let join_at = prev.char_len();
    let start = Position::new(pos.block - 1, join_at);
    let end = Position::new(pos.block, 0);
    let (mut steps, merged) = merge_for_delete(state, start, end)?;
    steps.push(Step::ReplaceBlock {
        index: start.block,
        block: merged,
    });
    Some(Transaction::with_steps(steps, Selection::cursor(start)))
}

/// Delete key: forward deletion, merging with the next block at the end.
pub fn delete_forward(state: &EditorState) -> Option<Transaction> {
    let sel = state.selection();
    if sel.is_range() {
        return replace_selection(state, "");
    }
    let pos = sel.head;
    let doc = state.doc();
    let block = doc.block(pos.block)?;
    if !block.kind.is_textual() {
        return None;
    }

    if pos.offset < block.char_len() {
        let mut updated = block.clone();
        updated.delete_range(pos.offset..pos.offset + 1);
        return Some(
            Transaction::new(Selection::cursor(pos)).step(Step::ReplaceBlock {
                index: pos.block,
                block: updated,
            }),
        );
    }

    if pos.block + 1 >= doc.len() {
        return None;
    }
    let next = doc.block(pos.block + 1)?;
    if !next.kind.is_textual() {
        return None;
    }
    let end = Position::new(pos.block + 1, 0);
    let (mut steps, merged) = merge_for_delete(state, pos, end)?;
    steps.push(Step::ReplaceBlock {
        index: pos.block,
        block: merged,
    });
    Some(Transaction::with_steps(steps, Selection::cursor(pos)))
}
