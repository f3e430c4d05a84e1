//! Block handler capability interface and registry order.
//!
//! Each block kind is rendered and driven by the first registered handler
//! that accepts it. Specialized handlers (equation, diagram, table) are
//! registered before the standard catch-all, so registration order is
//! part of the dispatch contract.

use folio_editor_core::{Block, BlockKind, Format};

use crate::diagram::DiagramHandler;
use crate::dom::Element;
use crate::editor::Editor;
use crate::equation::EquationHandler;
use crate::event::{InputEvent, KeyEvent, PasteEvent, PointerEvent};
use crate::host::EditorHost;
use crate::standard::StandardHandler;
use crate::table::TableHandler;

/// Per-block-kind behavior: rendering, event claims, lifecycle hooks.
///
/// Event hooks return `true` to claim the event, which suppresses the
/// editor's default processing (and the platform default). All hooks
/// default to no-ops so handlers implement only what they need.
pub trait BlockHandler<H: EditorHost> {
    /// Whether this handler drives blocks of the given kind.
    fn accepts(&self, kind: BlockKind) -> bool;

    /// Build the detached element tree for one block.
    fn render(&mut self, block: &Block, index: usize, host: &mut H) -> Element;

    fn handle_key_down(&mut self, editor: &mut Editor<H>, ev: &KeyEvent) -> bool {
        let _ = (editor, ev);
        false
    }

    fn handle_before_input(&mut self, editor: &mut Editor<H>, ev: &InputEvent) -> bool {
        let _ = (editor, ev);
        false
    }

    fn handle_paste(&mut self, editor: &mut Editor<H>, ev: &PasteEvent) -> bool {
        let _ = (editor, ev);
        false
    }

    fn handle_pointer_down(&mut self, editor: &mut Editor<H>, ev: &PointerEvent) -> bool {
        let _ = (editor, ev);
        false
    }

    fn handle_pointer_move(&mut self, editor: &mut Editor<H>, ev: &PointerEvent) -> bool {
        let _ = (editor, ev);
        false
    }

    fn handle_pointer_up(&mut self, editor: &mut Editor<H>, ev: &PointerEvent) -> bool {
        let _ = (editor, ev);
        false
    }

    /// Called on every handler before a full render rebuild starts.
    fn begin_render(&mut self, editor: &mut Editor<H>) {
        let _ = editor;
    }

    /// Called on every handler after a full render rebuild finishes.
    fn after_render(&mut self, editor: &mut Editor<H>) {
        let _ = editor;
    }

    /// Called on every handler before any transaction applies; the hook
    /// for committing out-of-model edits (native cell editing).
    fn before_apply_transaction(&mut self, editor: &mut Editor<H>) {
        let _ = editor;
    }

    /// A cell-editable region lost focus; commit any out-of-model edits
    /// and drop cell focus state.
    fn handle_cell_blur(&mut self, editor: &mut Editor<H>) {
        let _ = editor;
    }

    /// A block of an accepted kind was just inserted and should take
    /// focus (open its popup editor, focus its first cell).
    fn focus_block(&mut self, editor: &mut Editor<H>, index: usize) {
        let _ = (editor, index);
    }

    /// Claim a native selection change that the document-level selection
    /// model cannot express (selection inside a table cell).
    fn handle_selection_change(&mut self, editor: &mut Editor<H>) -> bool {
        let _ = editor;
        false
    }

    /// Claim a format toggle aimed at an internal editable region.
    fn handle_format_toggle(&mut self, editor: &mut Editor<H>, fmt: Format) -> bool {
        let _ = (editor, fmt);
        false
    }

    /// An external renderer this handler depends on became available.
    fn renderer_ready(&mut self, editor: &mut Editor<H>) {
        let _ = editor;
    }
}

/// The default handler chain: equation, diagram, table, then the
/// standard catch-all. First `accepts` match wins.
pub fn default_handlers<H: EditorHost>(diagram_base_url: &str) -> Vec<Box<dyn BlockHandler<H>>> {
    vec![
        Box::new(EquationHandler::new()),
        Box::new(DiagramHandler::new(diagram_base_url)),
        Box::new(TableHandler::new()),
        Box::new(StandardHandler::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingHost;

    #[test]
    fn test_registry_order_and_first_match() {
        let handlers = default_handlers::<RecordingHost>("/diagram");
        let first_for = |kind: BlockKind| {
            handlers
                .iter()
                .position(|h| h.accepts(kind))
                .unwrap()
        };
        assert_eq!(first_for(BlockKind::Equation), 0);
        assert_eq!(first_for(BlockKind::Diagram), 1);
        assert_eq!(first_for(BlockKind::Table), 2);
        assert_eq!(first_for(BlockKind::Paragraph), 3);
        assert_eq!(first_for(BlockKind::Heading2), 3);
    }
}
