//! Inline formatting commands: format toggles, links, variables.

use smol_str::SmolStr;
use std::ops::Range;

use crate::block::Block;
use crate::line::{Format, FormatSet, Span};
use crate::selection::{Position, Selection};
use crate::state::EditorState;
use crate::step::Step;
use crate::transaction::Transaction;

/// Per-block flattened sub-ranges covered by the selection, textual
/// blocks only.
fn selected_ranges(state: &EditorState) -> Vec<(usize, Range<usize>)> {
    let sel = state.selection();
    let (start, end) = (sel.start(), sel.end());
    (start.block..=end.block)
        .filter_map(|i| {
            let block = state.doc().block(i)?;
            if !block.kind.is_textual() {
                return None;
            }
            let from = if i == start.block { start.offset } else { 0 };
            let to = if i == end.block {
                end.offset
            } else {
                block.char_len()
            };
            (from < to).then_some((i, from..to))
        })
        .collect()
}

/// Whether the format is active over the whole selection. A cursor
/// reports the format of the character before it (what typing would
/// continue).
pub fn is_format_active(state: &EditorState, fmt: Format) -> bool {
    let sel = state.selection();
    if sel.is_cursor() {
        let pos = sel.head;
        let Some(block) = state.doc().block(pos.block) else {
            return false;
        };
        if pos.offset == 0 {
            return false;
        }
        return block.format_active(pos.offset - 1..pos.offset, fmt);
    }
    let ranges = selected_ranges(state);
    !ranges.is_empty()
        && ranges.iter().all(|(i, r)| {
            state
                .doc()
                .block(*i)
                .is_some_and(|b| b.format_active(r.clone(), fmt))
        })
}

/// Formats active across the whole selection (intersection).
pub fn active_formats(state: &EditorState) -> FormatSet {
    let sel = state.selection();
    if sel.is_cursor() {
        let pos = sel.head;
        let Some(block) = state.doc().block(pos.block) else {
            return FormatSet::EMPTY;
        };
        if pos.offset == 0 {
            return FormatSet::EMPTY;
        }
        return block.formats_in(pos.offset - 1..pos.offset);
    }
    let ranges = selected_ranges(state);
    if ranges.is_empty() {
        return FormatSet::EMPTY;
    }
    let mut acc = FormatSet::all();
    for (i, r) in ranges {
        let Some(block) = state.doc().block(i) else {
            return FormatSet::EMPTY;
        };
        acc = acc.intersection(block.formats_in(r));
    }
    acc
}

/// Toggle a format over the selection: off if active everywhere, on
/// otherwise. Cursor selections have no range to format.
pub fn toggle_format(state: &EditorState, fmt: Format) -> Option<Transaction> {
    let sel = state.selection();
    if sel.is_cursor() {
        return None;
    }
    let ranges = selected_ranges(state);
    if ranges.is_empty() {
        return None;
    }
    let on = !is_format_active(state, fmt);
    let steps = ranges
        .into_iter()
        .filter_map(|(index, r)| {
            let mut block = state.doc().block(index)?.clone();
            block.set_format(r, fmt, on);
            Some(Step::ReplaceBlock { index, block })
        })
        .collect();
    Some(Transaction::with_steps(steps, sel))
}

/// Flattened char range of the whole span under a position.
fn span_range_at(block: &Block, offset: usize) -> Option<Range<usize>> {
    let (li, lo) = block.locate(offset);
    let line = block.lines.get(li)?;
    let within = line.span_range_at(lo)?;
    // Flattened start of this line: preceding lines plus virtual newlines.
    let line_start: usize = block.lines[..li]
        .iter()
        .map(|l| l.char_len() + 1)
        .sum();
    Some(line_start + within.start..line_start + within.end)
}

/// Link under the selection start, if any.
pub fn current_link(state: &EditorState) -> Option<SmolStr> {
    let pos = state.selection().start();
    state.doc().block(pos.block)?.link_at(pos.offset)
}

/// Apply a link to the selected range, or to the whole span under the
/// cursor.
pub fn apply_link(state: &EditorState, url: &str) -> Option<Transaction> {
    let sel = state.selection();
    if sel.is_range() {
        let steps = selected_ranges(state)
            .into_iter()
            .filter_map(|(index, r)| {
                let mut block = state.doc().block(index)?.clone();
                block.set_link(r, Some(url));
                Some(Step::ReplaceBlock { index, block })
            })
            .collect::<Vec<_>>();
        if steps.is_empty() {
            return None;
        }
        return Some(Transaction::with_steps(steps, sel));
    }
    let pos = sel.head;
    let block = state.doc().block(pos.block)?;
    if !block.kind.is_textual() {
        return None;
    }
    let range = span_range_at(block, pos.offset)?;
    if range.is_empty() {
        return None;
    }
    let mut updated = block.clone();
    updated.set_link(range, Some(url));
    Some(Transaction::new(sel).step(Step::ReplaceBlock {
        index: pos.block,
        block: updated,
    }))
}

/// Remove the link from the selected range, or from the whole link span
/// under the cursor.
pub fn remove_link(state: &EditorState) -> Option<Transaction> {
    let sel = state.selection();
    if sel.is_range() {
        let steps = selected_ranges(state)
            .into_iter()
            .filter_map(|(index, r)| {
                let block = state.doc().block(index)?;
                let mut updated = block.clone();
                updated.set_link(r, None);
                (updated != *block).then_some(Step::ReplaceBlock {
                    index,
                    block: updated,
                })
            })
            .collect::<Vec<_>>();
        if steps.is_empty() {
            return None;
        }
        return Some(Transaction::with_steps(steps, sel));
    }
    let pos = sel.head;
    let block = state.doc().block(pos.block)?;
    block.link_at(pos.offset)?;
    let range = span_range_at(block, pos.offset)?;
    let mut updated = block.clone();
    updated.set_link(range, None);
    Some(Transaction::new(sel).step(Step::ReplaceBlock {
        index: pos.block,
        block: updated,
    }))
}

/// Insert a variable placeholder at the cursor: a span showing `label`
/// and carrying `name` as its variable marker. Replaces a single-block
/// range selection.
pub fn apply_variable(state: &EditorState, name: &str, label: &str) -> Option<Transaction> {
    let sel = state.selection();
    let (start, end) = (sel.start(), sel.end());
    if start.block != end.block {
        return None;
    }
    let block = state.doc().block(start.block)?;
    if !block.kind.is_textual() {
        return None;
    }
    let mut updated = block.clone();
    if sel.is_range() {
        updated.delete_range(start.offset..end.offset);
    }
    let span = Span {
        text: SmolStr::new(label),
        formats: FormatSet::EMPTY,
        link: None,
        variable: Some(SmolStr::new(name)),
    };
    updated.insert_span(start.offset, span);
    let cursor = Position::new(start.block, start.offset + label.chars().count());
    Some(
        Transaction::new(Selection::cursor(cursor)).step(Step::ReplaceBlock {
            index: start.block,
            block: updated,
        }),
    )
}
