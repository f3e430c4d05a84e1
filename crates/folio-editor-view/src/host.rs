//! The host bridge: everything the editor needs from the native
//! selection/DOM layer, as a black-box trait.
//!
//! Range and caret algorithms live behind this trait; the editor core
//! only issues intents and reads back positions. Tests drive the editor
//! with a recording fake instead of a real view layer.

use folio_editor_core::{Line, Position, Selection};

use crate::dom::Element;

/// Identifies one cell of one table block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddress {
    /// Block index of the table in the document.
    pub table_index: usize,
    pub row: usize,
    pub col: usize,
}

impl CellAddress {
    pub fn new(table_index: usize, row: usize, col: usize) -> Self {
        Self {
            table_index,
            row,
            col,
        }
    }
}

/// Where the caret lands when focus moves into a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaretPlacement {
    Start,
    End,
}

/// Native view-layer services consumed by the editor.
///
/// Implementations translate between document positions and whatever the
/// platform uses for carets, ranges, and focus. Every method is expected
/// to be cheap and synchronous.
pub trait EditorHost {
    /// Replace the mounted block elements with a freshly rendered list.
    fn mount(&mut self, blocks: Vec<Element>);

    /// Current document-level selection, if one can be resolved.
    fn read_selection(&mut self) -> Option<Selection>;

    fn set_cursor(&mut self, pos: Position);

    fn set_selection(&mut self, sel: Selection);

    /// Char offset of the caret within the focused cell's text.
    fn cursor_offset_in_cell(&mut self) -> Option<usize>;

    /// Cell containing the current native selection, if any.
    fn cell_from_selection(&mut self) -> Option<CellAddress>;

    /// Whether the native selection currently sits inside the given cell.
    fn selection_in_cell(&mut self, addr: CellAddress) -> bool;

    /// In-cell selection as (start, end) char offsets.
    fn selection_range_in_cell(&mut self) -> Option<(usize, usize)>;

    fn set_selection_in_cell(&mut self, addr: CellAddress, start: usize, end: usize);

    /// Plain text currently shown in a cell (live edits included).
    fn cell_text(&mut self, addr: CellAddress) -> Option<String>;

    /// Reconstruct a formatted line from a cell's live content.
    fn cell_line(&mut self, addr: CellAddress) -> Option<Line>;

    /// Swap a cell's rendered content in place, without a full re-render.
    fn patch_cell(&mut self, addr: CellAddress, content: Element);

    fn blur_cell(&mut self);

    fn focus_cell(&mut self, addr: CellAddress, placement: CaretPlacement);

    /// Live column widths during a resize drag (float percentages).
    fn set_column_widths_visual(&mut self, table_index: usize, widths: &[f32]);

    fn scroll_caret_into_view(&mut self);

    /// Typeset LaTeX into the current equation target. Returns the parse
    /// error text on failure, `None` on success.
    fn latex(&mut self, text: &str, display_mode: bool) -> Option<String>;

    /// URL of the rendered diagram for the given source text.
    fn diagram_url(&mut self, base_url: &str, text: &str) -> String;
}
