//! Table blocks: cell rendering, cell navigation, and column resize.
//!
//! Cells are native editable regions outside the transaction flow; edits
//! are committed to the model on blur, before any transaction, and on
//! format toggles, detected via a plain-text diff against the content
//! captured when the cell took focus. Structural lookups that miss
//! silently no-op (handlers run inside platform event callbacks).

use folio_editor_core::{Block, BlockKind, Format, commands};
use smol_str::format_smolstr;
use tracing::trace;

use crate::dom::Element;
use crate::editor::{Editor, RenderMode};
use crate::event::{Key, KeyEvent, PointerEvent, PointerTarget};
use crate::handler::BlockHandler;
use crate::host::{CaretPlacement, CellAddress, EditorHost};
use crate::standard::render_line;

/// Minimum width of a column during a resize, in percent.
const MIN_COL_PCT: f32 = 5.0;

/// The focused cell plus the plain text it held when focus arrived.
#[derive(Debug, Clone)]
struct CellFocus {
    addr: CellAddress,
    initial: String,
}

/// An in-progress drag on the divider between two adjacent columns.
#[derive(Debug, Clone, Copy)]
struct ResizeDrag {
    table_index: usize,
    left_col: usize,
    start_x: f64,
    table_px_width: f64,
    left_start: f32,
    right_start: f32,
}

impl ResizeDrag {
    /// Live (left, right) widths for a pointer position. The pair always
    /// sums to `left_start + right_start` with each side >= the minimum.
    fn widths_at(&self, x: f64) -> (f32, f32) {
        let sum = self.left_start + self.right_start;
        let delta = ((x - self.start_x) / self.table_px_width * 100.0) as f32;
        let mut left = self.left_start + delta;
        let mut right = sum - left;
        if left < MIN_COL_PCT {
            left = MIN_COL_PCT;
            right = sum - MIN_COL_PCT;
        } else if right < MIN_COL_PCT {
            right = MIN_COL_PCT;
            left = sum - MIN_COL_PCT;
        }
        (left, right)
    }
}

/// Handler for table blocks.
#[derive(Debug, Default)]
pub struct TableHandler {
    focus: Option<CellFocus>,
    drag: Option<ResizeDrag>,
}

impl TableHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit the focused cell's live content to the model if it changed
    /// since focus arrived. Uses a silent transaction so the cell's DOM
    /// (and caret) is left alone.
    fn sync_focused_cell<H: EditorHost>(&mut self, editor: &mut Editor<H>) {
        let Some(focus) = &self.focus else {
            return;
        };
        let addr = focus.addr;
        let Some(live) = editor.host_mut().cell_text(addr) else {
            return;
        };
        if live == focus.initial {
            return;
        }
        let Some(line) = editor.host_mut().cell_line(addr) else {
            return;
        };
        let Some(tr) =
            commands::replace_cell_line(editor.state(), addr.table_index, addr.row, addr.col, line)
        else {
            return;
        };
        trace!(?addr, "syncing dirty cell");
        editor.apply_transaction(&tr, RenderMode::Silent);
        if let Some(focus) = &mut self.focus {
            focus.initial = live;
        }
    }

    /// Move cell focus, committing the old cell first.
    fn move_focus<H: EditorHost>(
        &mut self,
        editor: &mut Editor<H>,
        addr: CellAddress,
        placement: CaretPlacement,
    ) {
        self.sync_focused_cell(editor);
        editor.host_mut().focus_cell(addr, placement);
        let initial = editor.host_mut().cell_text(addr).unwrap_or_default();
        self.focus = Some(CellFocus { addr, initial });
    }

    /// Dimensions of the table under the focused cell.
    fn focused_table_dims<H: EditorHost>(
        &self,
        editor: &Editor<H>,
    ) -> Option<(CellAddress, usize, usize)> {
        let addr = self.focus.as_ref()?.addr;
        let table = editor.state().doc().block(addr.table_index)?;
        if table.kind != BlockKind::Table {
            return None;
        }
        Some((addr, table.row_count(), table.col_count()))
    }

    fn navigate<H: EditorHost>(&mut self, editor: &mut Editor<H>, ev: &KeyEvent) -> bool {
        let Some((addr, rows, cols)) = self.focused_table_dims(editor) else {
            return false;
        };
        if rows == 0 || cols == 0 {
            return false;
        }
        let cell = |row, col| CellAddress::new(addr.table_index, row, col);
        match ev.key {
            // Enter moves down a row; claimed even at the bottom so the
            // platform never splits a cell.
            Key::Enter => {
                if addr.row + 1 < rows {
                    self.move_focus(editor, cell(addr.row + 1, addr.col), CaretPlacement::Start);
                }
                true
            }
            Key::Tab if ev.modifiers.shift => {
                if addr.col > 0 {
                    self.move_focus(editor, cell(addr.row, addr.col - 1), CaretPlacement::End);
                } else if addr.row > 0 {
                    self.move_focus(editor, cell(addr.row - 1, cols - 1), CaretPlacement::End);
                }
                true
            }
            Key::Tab => {
                if addr.col + 1 < cols {
                    self.move_focus(editor, cell(addr.row, addr.col + 1), CaretPlacement::Start);
                } else if addr.row + 1 < rows {
                    self.move_focus(editor, cell(addr.row + 1, 0), CaretPlacement::Start);
                }
                true
            }
            Key::ArrowDown => {
                if addr.row + 1 < rows {
                    self.move_focus(editor, cell(addr.row + 1, addr.col), CaretPlacement::Start);
                    return true;
                }
                false
            }
            Key::ArrowUp => {
                if addr.row > 0 {
                    self.move_focus(editor, cell(addr.row - 1, addr.col), CaretPlacement::End);
                    return true;
                }
                false
            }
            // Left/right cross cells only from the text edge; anywhere
            // else the native caret movement proceeds.
            Key::ArrowLeft => {
                if editor.host_mut().cursor_offset_in_cell() != Some(0) {
                    return false;
                }
                if addr.col > 0 {
                    self.move_focus(editor, cell(addr.row, addr.col - 1), CaretPlacement::End);
                    return true;
                }
                if addr.row > 0 {
                    self.move_focus(editor, cell(addr.row - 1, cols - 1), CaretPlacement::End);
                    return true;
                }
                false
            }
            Key::ArrowRight => {
                let len = editor
                    .host_mut()
                    .cell_text(addr)
                    .map_or(0, |t| t.chars().count());
                if editor.host_mut().cursor_offset_in_cell() != Some(len) {
                    return false;
                }
                if addr.col + 1 < cols {
                    self.move_focus(editor, cell(addr.row, addr.col + 1), CaretPlacement::Start);
                    return true;
                }
                if addr.row + 1 < rows {
                    self.move_focus(editor, cell(addr.row + 1, 0), CaretPlacement::Start);
                    return true;
                }
                false
            }
            _ => false,
        }
    }

    /// Commit the drag's final widths, rounded to integer percent, via a
    /// silent transaction so the gesture is never interrupted by a
    /// rebuild.
    fn commit_resize<H: EditorHost>(&mut self, editor: &mut Editor<H>, drag: ResizeDrag, x: f64) {
        let (left, _) = drag.widths_at(x);
        let sum = (drag.left_start + drag.right_start).round() as u32;
        if sum < 2 * MIN_COL_PCT as u32 {
            return;
        }
        let left_i = (left.round() as u32).clamp(MIN_COL_PCT as u32, sum - MIN_COL_PCT as u32);
        let right_i = sum - left_i;

        let Some(table) = editor.state().doc().block(drag.table_index) else {
            return;
        };
        let mut widths = table.col_widths();
        if drag.left_col + 1 >= widths.len() {
            return;
        }
        widths[drag.left_col] = left_i;
        widths[drag.left_col + 1] = right_i;
        if let Some(tr) = commands::set_column_widths(editor.state(), drag.table_index, &widths) {
            editor.apply_transaction(&tr, RenderMode::Silent);
        }
    }
}

fn render_cell(cell: &Block, row: usize, col: usize, header: bool) -> Element {
    let tag = if header { "th" } else { "td" };
    Element::new(tag)
        .attr("data-row", format_smolstr!("{row}"))
        .attr("data-col", format_smolstr!("{col}"))
        .editable()
        .children(cell.lines.iter().map(render_line))
}

impl<H: EditorHost> BlockHandler<H> for TableHandler {
    fn accepts(&self, kind: BlockKind) -> bool {
        kind == BlockKind::Table
    }

    fn render(&mut self, block: &Block, index: usize, _host: &mut H) -> Element {
        let mut table = Element::new("table").attr("data-block", format_smolstr!("{index}"));
        if let Some(caption) = block.caption() {
            table = table.child(Element::new("caption").text(caption));
        }
        let colgroup = Element::new("colgroup").children(block.col_widths().iter().map(|w| {
            Element::new("col").attr("style", format_smolstr!("width:{w}%"))
        }));
        table = table.child(colgroup);
        let header_rows = block.header_rows();
        for (r, row) in block.children.iter().enumerate() {
            let header = r < header_rows;
            let tr = Element::new("tr").children(
                row.children
                    .iter()
                    .enumerate()
                    .map(|(c, cell)| render_cell(cell, r, c, header)),
            );
            table = table.child(tr);
        }
        table
    }

    fn handle_key_down(&mut self, editor: &mut Editor<H>, ev: &KeyEvent) -> bool {
        self.navigate(editor, ev)
    }

    fn before_apply_transaction(&mut self, editor: &mut Editor<H>) {
        self.sync_focused_cell(editor);
    }

    fn handle_cell_blur(&mut self, editor: &mut Editor<H>) {
        self.sync_focused_cell(editor);
        self.focus = None;
    }

    fn focus_block(&mut self, editor: &mut Editor<H>, index: usize) {
        let addr = CellAddress::new(index, 0, 0);
        editor.host_mut().focus_cell(addr, CaretPlacement::Start);
        let initial = editor.host_mut().cell_text(addr).unwrap_or_default();
        self.focus = Some(CellFocus { addr, initial });
    }

    /// Claims selection changes that land inside a cell, keeping cell
    /// focus state current; a selection outside any cell commits and
    /// releases focus.
    fn handle_selection_change(&mut self, editor: &mut Editor<H>) -> bool {
        match editor.host_mut().cell_from_selection() {
            Some(addr) => {
                if self.focus.as_ref().map(|f| f.addr) != Some(addr) {
                    self.sync_focused_cell(editor);
                    let initial = editor.host_mut().cell_text(addr).unwrap_or_default();
                    self.focus = Some(CellFocus { addr, initial });
                }
                true
            }
            None => {
                if self.focus.is_some() {
                    self.sync_focused_cell(editor);
                    self.focus = None;
                }
                false
            }
        }
    }

    /// Format toggles inside a cell mutate a line rebuilt from the live
    /// cell content, commit it silently, then patch the cell in place
    /// and restore the in-cell selection.
    fn handle_format_toggle(&mut self, editor: &mut Editor<H>, fmt: Format) -> bool {
        let Some(focus) = &self.focus else {
            return false;
        };
        let addr = focus.addr;
        let Some((start, end)) = editor.host_mut().selection_range_in_cell() else {
            return true;
        };
        let Some(mut line) = editor.host_mut().cell_line(addr) else {
            return true;
        };
        if start < end {
            let on = !line.format_active(start..end, fmt);
            line.set_format(start..end, fmt, on);
        }
        let Some(tr) =
            commands::replace_cell_line(editor.state(), addr.table_index, addr.row, addr.col, line.clone())
        else {
            return true;
        };
        editor.apply_transaction(&tr, RenderMode::Silent);
        editor.host_mut().patch_cell(addr, render_line(&line));
        editor.host_mut().set_selection_in_cell(addr, start, end);
        if let Some(focus) = &mut self.focus {
            focus.initial = line.text();
        }
        true
    }

    fn handle_pointer_down(&mut self, editor: &mut Editor<H>, ev: &PointerEvent) -> bool {
        let PointerTarget::ColumnDivider {
            table_index,
            left_col,
            table_px_width,
        } = ev.target
        else {
            return false;
        };
        if table_px_width <= 0.0 {
            return false;
        }
        let Some(table) = editor.state().doc().block(table_index) else {
            return false;
        };
        let widths = table.col_widths();
        if table.kind != BlockKind::Table || left_col + 1 >= widths.len() {
            return false;
        }
        // Caret and drag do not mix; commit and release any focused cell.
        self.sync_focused_cell(editor);
        editor.host_mut().blur_cell();
        self.focus = None;
        self.drag = Some(ResizeDrag {
            table_index,
            left_col,
            start_x: ev.x,
            table_px_width,
            left_start: widths[left_col] as f32,
            right_start: widths[left_col + 1] as f32,
        });
        true
    }

    fn handle_pointer_move(&mut self, editor: &mut Editor<H>, ev: &PointerEvent) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        let (left, right) = drag.widths_at(ev.x);
        let Some(table) = editor.state().doc().block(drag.table_index) else {
            return false;
        };
        // The table may have shrunk or been replaced since pointer-down.
        let mut widths: Vec<f32> = table.col_widths().iter().map(|&w| w as f32).collect();
        if table.kind != BlockKind::Table || drag.left_col + 1 >= widths.len() {
            return false;
        }
        widths[drag.left_col] = left;
        widths[drag.left_col + 1] = right;
        editor
            .host_mut()
            .set_column_widths_visual(drag.table_index, &widths);
        true
    }

    fn handle_pointer_up(&mut self, editor: &mut Editor<H>, ev: &PointerEvent) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        self.commit_resize(editor, drag, ev.x);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{InputEvent, Modifiers, PasteEvent};
    use crate::testing::RecordingHost;
    use folio_editor_core::{Document, Step, Transaction, meta};

    fn editor_with_table(rows: usize, cols: usize) -> Editor<RecordingHost> {
        let mut editor = Editor::new(RecordingHost::new(), "/diagram");
        editor.load(Document::from_blocks(vec![
            Block::with_text(BlockKind::Paragraph, "intro"),
            Block::table(rows, cols),
        ]));
        editor
    }

    /// Drive Tab presses from the first cell and report the visit order.
    fn tab_walk(editor: &mut Editor<RecordingHost>, presses: usize) -> Vec<(usize, usize)> {
        editor.host_mut().selected_cell = Some(CellAddress::new(1, 0, 0));
        editor.on_selection_change();
        let tab = KeyEvent::new(Key::Tab);
        for _ in 0..presses {
            assert!(editor.on_key_down(&tab));
        }
        editor
            .host()
            .focused
            .iter()
            .map(|(addr, _)| (addr.row, addr.col))
            .collect()
    }

    #[test]
    fn test_tab_visits_all_cells_row_major() {
        let (rows, cols) = (3, 4);
        let mut editor = editor_with_table(rows, cols);
        // First cell is entered by selection; R*C - 1 tabs reach the last
        // cell, visiting every cell exactly once in row-major order.
        let visited = tab_walk(&mut editor, rows * cols - 1);

        let expected: Vec<(usize, usize)> = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| (r, c)))
            .skip(1)
            .collect();
        assert_eq!(visited, expected);

        // One more Tab at the last cell: claimed, but no further move.
        assert!(editor.on_key_down(&KeyEvent::new(Key::Tab)));
        assert_eq!(editor.host().focused.len(), rows * cols - 1);
    }

    #[test]
    fn test_shift_tab_reverses_landing_at_end() {
        let mut editor = editor_with_table(2, 2);
        editor.host_mut().selected_cell = Some(CellAddress::new(1, 1, 0));
        editor.on_selection_change();

        let shift_tab = KeyEvent::with_modifiers(Key::Tab, Modifiers::SHIFT);
        assert!(editor.on_key_down(&shift_tab));
        let (addr, placement) = *editor.host().focused.last().unwrap();
        // Wraps to the last column of the previous row, caret at the end.
        assert_eq!((addr.row, addr.col), (0, 1));
        assert_eq!(placement, CaretPlacement::End);
    }

    #[test]
    fn test_enter_moves_down_and_claims_at_last_row() {
        let mut editor = editor_with_table(2, 2);
        editor.host_mut().selected_cell = Some(CellAddress::new(1, 0, 1));
        editor.on_selection_change();

        let enter = KeyEvent::new(Key::Enter);
        assert!(editor.on_key_down(&enter));
        let (addr, placement) = *editor.host().focused.last().unwrap();
        assert_eq!((addr.row, addr.col), (1, 1));
        assert_eq!(placement, CaretPlacement::Start);

        // Last row: still claimed (no cell split), but no move.
        let before = editor.host().focused.len();
        assert!(editor.on_key_down(&enter));
        assert_eq!(editor.host().focused.len(), before);
        // The document gained no blocks either.
        assert_eq!(editor.state().doc().len(), 2);
    }

    #[test]
    fn test_arrow_left_right_only_at_text_edges() {
        let mut editor = editor_with_table(1, 3);
        let addr = CellAddress::new(1, 0, 1);
        editor.host_mut().cells.insert(addr, "ab".into());
        editor.host_mut().selected_cell = Some(addr);
        editor.on_selection_change();

        // Mid-text: native movement proceeds.
        editor.host_mut().cursor_offset = Some(1);
        assert!(!editor.on_key_down(&KeyEvent::new(Key::ArrowRight)));
        assert!(!editor.on_key_down(&KeyEvent::new(Key::ArrowLeft)));

        // At the end of the text: crosses to the next cell.
        editor.host_mut().cursor_offset = Some(2);
        assert!(editor.on_key_down(&KeyEvent::new(Key::ArrowRight)));
        let (next, placement) = *editor.host().focused.last().unwrap();
        assert_eq!((next.row, next.col), (0, 2));
        assert_eq!(placement, CaretPlacement::Start);
    }

    #[test]
    fn test_arrow_up_down_at_boundaries_fall_through() {
        let mut editor = editor_with_table(2, 1);
        editor.host_mut().selected_cell = Some(CellAddress::new(1, 0, 0));
        editor.on_selection_change();

        assert!(!editor.on_key_down(&KeyEvent::new(Key::ArrowUp)));
        assert!(editor.on_key_down(&KeyEvent::new(Key::ArrowDown)));
        assert!(!editor.on_key_down(&KeyEvent::new(Key::ArrowDown)));
    }

    #[test]
    fn test_dirty_cell_synced_on_navigation() {
        let mut editor = editor_with_table(2, 2);
        let addr = CellAddress::new(1, 0, 0);
        editor.host_mut().selected_cell = Some(addr);
        editor.on_selection_change();
        let mounts = editor.host().mounts.len();

        // Native editing changed the cell after focus arrived.
        editor.host_mut().cells.insert(addr, "edited".into());
        assert!(editor.on_key_down(&KeyEvent::new(Key::Tab)));

        let table = editor.state().doc().block(1).unwrap();
        assert_eq!(table.cell(0, 0).unwrap().content(), "edited");
        // Committed silently: no rebuild, no history entry.
        assert_eq!(editor.host().mounts.len(), mounts);
        assert_eq!(editor.history().depth(), 0);
    }

    #[test]
    fn test_editing_in_cell_stays_native() {
        let mut editor = editor_with_table(1, 1);
        editor.host_mut().selected_cell = Some(CellAddress::new(1, 0, 0));
        editor.on_selection_change();

        // The generic pipelines stand down while a cell holds the
        // selection; the platform edits the cell directly.
        assert!(!editor.on_before_input(&InputEvent::insert_text("x")));
        assert!(!editor.on_key_down(&KeyEvent::new(Key::Backspace)));
        assert!(!editor.on_key_down(&KeyEvent::new(Key::Delete)));
        assert!(!editor.on_paste(&PasteEvent { text: "p".into() }));

        assert_eq!(editor.state().doc().block(0).unwrap().content(), "intro");
        assert_eq!(editor.history().depth(), 0);
    }

    #[test]
    fn test_structural_edit_keeps_dirty_cell() {
        let mut editor = editor_with_table(2, 2);
        let addr = CellAddress::new(1, 0, 0);
        editor.host_mut().selected_cell = Some(addr);
        editor.on_selection_change();
        editor.host_mut().cells.insert(addr, "edited".into());

        assert!(editor.insert_table_row(1, 1));

        // The cell was committed before the command cloned the table.
        let table = editor.state().doc().block(1).unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.cell(0, 0).unwrap().content(), "edited");
    }

    #[test]
    fn test_navigation_in_table_with_empty_rows_falls_through() {
        let mut editor = Editor::new(RecordingHost::new(), "/diagram");
        let mut table = Block::table(2, 1);
        for row in &mut table.children {
            row.children.clear();
        }
        editor.load(Document::from_blocks(vec![
            Block::with_text(BlockKind::Paragraph, "intro"),
            table,
        ]));
        editor.host_mut().selected_cell = Some(CellAddress::new(1, 1, 0));
        editor.on_selection_change();

        let shift_tab = KeyEvent::with_modifiers(Key::Tab, Modifiers::SHIFT);
        assert!(!editor.on_key_down(&shift_tab));
        assert!(!editor.on_key_down(&KeyEvent::new(Key::Tab)));
        assert!(editor.host().focused.is_empty());
    }

    #[test]
    fn test_resize_preserves_sum_and_minimum() {
        let mut editor = editor_with_table(2, 2);
        let down = PointerEvent {
            x: 300.0,
            target: PointerTarget::ColumnDivider {
                table_index: 1,
                left_col: 0,
                table_px_width: 600.0,
            },
        };
        assert!(editor.on_pointer_down(&down));

        // Drag 60px right: +10% to the left column.
        assert!(editor.on_pointer_move(&PointerEvent {
            x: 360.0,
            target: PointerTarget::Other,
        }));
        let (_, widths) = editor.host().visual_widths.last().unwrap().clone();
        assert!((widths[0] - 60.0).abs() < 0.01);
        assert!((widths[0] + widths[1] - 100.0).abs() < 0.01);

        // Drag far past the right edge: clamped to the 5% minimum.
        assert!(editor.on_pointer_move(&PointerEvent {
            x: 900.0,
            target: PointerTarget::Other,
        }));
        let (_, widths) = editor.host().visual_widths.last().unwrap().clone();
        assert!((widths[1] - 5.0).abs() < 0.01);
        assert!((widths[0] - 95.0).abs() < 0.01);

        let mounts = editor.host().mounts.len();
        assert!(editor.on_pointer_up(&PointerEvent {
            x: 360.0,
            target: PointerTarget::Other,
        }));
        // Committed as integers, silently.
        let table = editor.state().doc().block(1).unwrap();
        assert_eq!(table.col_widths(), vec![60, 40]);
        assert_eq!(table.meta_get(meta::COLWIDTHS).unwrap(), "60,40");
        assert_eq!(editor.host().mounts.len(), mounts);
        assert_eq!(editor.history().depth(), 0);
    }

    #[test]
    fn test_resize_blurs_focused_cell_first() {
        let mut editor = editor_with_table(1, 2);
        let addr = CellAddress::new(1, 0, 0);
        editor.host_mut().selected_cell = Some(addr);
        editor.on_selection_change();
        editor.host_mut().cells.insert(addr, "typed".into());

        assert!(editor.on_pointer_down(&PointerEvent {
            x: 100.0,
            target: PointerTarget::ColumnDivider {
                table_index: 1,
                left_col: 0,
                table_px_width: 400.0,
            },
        }));
        assert_eq!(editor.host().blurs, 1);
        // The dirty cell was committed before the drag began.
        let table = editor.state().doc().block(1).unwrap();
        assert_eq!(table.cell(0, 0).unwrap().content(), "typed");
    }

    #[test]
    fn test_pointer_move_survives_table_replacement() {
        let mut editor = editor_with_table(1, 2);
        assert!(editor.on_pointer_down(&PointerEvent {
            x: 100.0,
            target: PointerTarget::ColumnDivider {
                table_index: 1,
                left_col: 0,
                table_px_width: 400.0,
            },
        }));

        // The table vanished mid-gesture (an undo, a silent edit).
        let tr = Transaction::new(editor.selection()).step(Step::ReplaceBlock {
            index: 1,
            block: Block::with_text(BlockKind::Paragraph, "gone"),
        });
        assert!(editor.apply_transaction(&tr, RenderMode::Silent));

        assert!(!editor.on_pointer_move(&PointerEvent {
            x: 160.0,
            target: PointerTarget::Other,
        }));
        assert!(editor.host().visual_widths.is_empty());
        // Releasing the gesture leaves the replacement untouched.
        assert!(editor.on_pointer_up(&PointerEvent {
            x: 160.0,
            target: PointerTarget::Other,
        }));
        assert_eq!(editor.state().doc().block(1).unwrap().content(), "gone");
    }

    #[test]
    fn test_cell_format_toggle_patches_in_place() {
        let mut editor = editor_with_table(1, 1);
        let addr = CellAddress::new(1, 0, 0);
        editor.host_mut().cells.insert(addr, "hello".into());
        editor.host_mut().selected_cell = Some(addr);
        editor.on_selection_change();
        editor.host_mut().cell_selection = Some((0, 5));
        let mounts = editor.host().mounts.len();

        assert!(editor.toggle_format(Format::Bold));

        let table = editor.state().doc().block(1).unwrap();
        let cell = table.cell(0, 0).unwrap();
        assert!(cell.format_active(0..5, Format::Bold));
        // Patched directly: one patch, no rebuild, selection restored.
        assert_eq!(editor.host().patched.len(), 1);
        assert_eq!(editor.host().mounts.len(), mounts);
        assert_eq!(editor.host().cell_selections.last(), Some(&(addr, 0, 5)));
    }

    #[test]
    fn test_render_table_structure() {
        let mut handler = TableHandler::new();
        let mut host = RecordingHost::new();
        let block = Block::table(2, 2);

        let el = BlockHandler::<RecordingHost>::render(&mut handler, &block, 1, &mut host);
        assert_eq!(el.tag, "table");
        assert_eq!(el.find_tag("colgroup").unwrap().children.len(), 2);
        // One header row of th, one body row of td.
        assert!(el.find_tag("th").is_some());
        assert!(el.find_tag("td").is_some());
        assert!(el.find_tag("th").unwrap().editable);
    }

    #[test]
    fn test_blur_commits_and_releases_focus() {
        let mut editor = editor_with_table(1, 1);
        let addr = CellAddress::new(1, 0, 0);
        editor.host_mut().selected_cell = Some(addr);
        editor.on_selection_change();
        editor.host_mut().cells.insert(addr, "final".into());

        editor.on_cell_blur();
        let table = editor.state().doc().block(1).unwrap();
        assert_eq!(table.cell(0, 0).unwrap().content(), "final");
    }
}
