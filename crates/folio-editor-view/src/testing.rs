//! A recording in-memory host for driving the editor in tests.

use std::collections::HashMap;

use folio_editor_core::{Line, Position, Selection};
use smol_str::format_smolstr;

use crate::dom::Element;
use crate::host::{CaretPlacement, CellAddress, EditorHost};

/// `EditorHost` double: records every call and serves canned answers set
/// by the test.
#[derive(Debug, Default)]
pub struct RecordingHost {
    /// Every full mount, newest last.
    pub mounts: Vec<Vec<Element>>,
    /// Answer for `read_selection`.
    pub selection: Option<Selection>,
    /// Selections and cursors pushed back into the host.
    pub set_selections: Vec<Selection>,
    /// Answer for `cursor_offset_in_cell`.
    pub cursor_offset: Option<usize>,
    /// Answer for `selection_range_in_cell`.
    pub cell_selection: Option<(usize, usize)>,
    /// Answer for `cell_from_selection`.
    pub selected_cell: Option<CellAddress>,
    /// Live cell text by address; unset cells read as empty.
    pub cells: HashMap<CellAddress, String>,
    /// Formatted-line answers for `cell_line`; falls back to a plain line
    /// built from `cells`.
    pub cell_lines: HashMap<CellAddress, Line>,
    /// Every `focus_cell` call, in order.
    pub focused: Vec<(CellAddress, CaretPlacement)>,
    pub blurs: usize,
    /// Every `patch_cell` call.
    pub patched: Vec<(CellAddress, Element)>,
    /// Every `set_selection_in_cell` call.
    pub cell_selections: Vec<(CellAddress, usize, usize)>,
    /// Every live width update during resize drags.
    pub visual_widths: Vec<(usize, Vec<f32>)>,
    pub scrolls: usize,
    pub latex_calls: usize,
    /// When set, `latex` reports this parse error.
    pub latex_error: Option<String>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EditorHost for RecordingHost {
    fn mount(&mut self, blocks: Vec<Element>) {
        self.mounts.push(blocks);
    }

    fn read_selection(&mut self) -> Option<Selection> {
        self.selection
    }

    fn set_cursor(&mut self, pos: Position) {
        self.set_selections.push(Selection::cursor(pos));
    }

    fn set_selection(&mut self, sel: Selection) {
        self.set_selections.push(sel);
    }

    fn cursor_offset_in_cell(&mut self) -> Option<usize> {
        self.cursor_offset
    }

    fn cell_from_selection(&mut self) -> Option<CellAddress> {
        self.selected_cell
    }

    fn selection_in_cell(&mut self, addr: CellAddress) -> bool {
        self.selected_cell == Some(addr)
    }

    fn selection_range_in_cell(&mut self) -> Option<(usize, usize)> {
        self.cell_selection
    }

    fn set_selection_in_cell(&mut self, addr: CellAddress, start: usize, end: usize) {
        self.cell_selections.push((addr, start, end));
    }

    fn cell_text(&mut self, addr: CellAddress) -> Option<String> {
        Some(self.cells.get(&addr).cloned().unwrap_or_default())
    }

    fn cell_line(&mut self, addr: CellAddress) -> Option<Line> {
        if let Some(line) = self.cell_lines.get(&addr) {
            return Some(line.clone());
        }
        let text = self.cells.get(&addr).cloned().unwrap_or_default();
        Some(Line::plain(text))
    }

    fn patch_cell(&mut self, addr: CellAddress, content: Element) {
        self.patched.push((addr, content));
    }

    fn blur_cell(&mut self) {
        self.blurs += 1;
        self.selected_cell = None;
    }

    fn focus_cell(&mut self, addr: CellAddress, placement: CaretPlacement) {
        self.focused.push((addr, placement));
        self.selected_cell = Some(addr);
        self.cursor_offset = Some(match placement {
            CaretPlacement::Start => 0,
            CaretPlacement::End => self
                .cells
                .get(&addr)
                .map_or(0, |t| t.chars().count()),
        });
    }

    fn set_column_widths_visual(&mut self, table_index: usize, widths: &[f32]) {
        self.visual_widths.push((table_index, widths.to_vec()));
    }

    fn scroll_caret_into_view(&mut self) {
        self.scrolls += 1;
    }

    fn latex(&mut self, _text: &str, _display_mode: bool) -> Option<String> {
        self.latex_calls += 1;
        self.latex_error.clone()
    }

    fn diagram_url(&mut self, base_url: &str, text: &str) -> String {
        format_smolstr!("{base_url}?src={text}").to_string()
    }
}
