//! Equation blocks: LaTeX source typeset by an external renderer.

use folio_editor_core::{Block, BlockKind};
use smol_str::format_smolstr;

use crate::dom::Element;
use crate::editor::Editor;
use crate::external::ExternalRenderer;
use crate::handler::BlockHandler;
use crate::host::EditorHost;
use crate::popup::PopupKind;

/// Renders equation blocks and opens the equation popup on focus.
/// Typesetting errors are shown inline in the block, never thrown.
#[derive(Debug, Default)]
pub struct EquationHandler {
    renderer: ExternalRenderer,
}

impl EquationHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn renderer_mut(&mut self) -> &mut ExternalRenderer {
        &mut self.renderer
    }
}

impl<H: EditorHost> BlockHandler<H> for EquationHandler {
    fn accepts(&self, kind: BlockKind) -> bool {
        kind == BlockKind::Equation
    }

    fn render(&mut self, block: &Block, index: usize, host: &mut H) -> Element {
        let el = Element::new("div")
            .class("equation")
            .attr("data-block", format_smolstr!("{index}"));
        let source = block.content();
        if source.is_empty() {
            return el.child(Element::new("span").class("placeholder").text("equation"));
        }
        if !self.renderer.request(index) {
            return el.child(Element::new("span").class("loading").text(source));
        }
        match host.latex(&source, true) {
            Some(error) => el.child(Element::new("span").class("error").text(error)),
            None => el.child(Element::new("span").class("katex-output")),
        }
    }

    fn focus_block(&mut self, editor: &mut Editor<H>, _index: usize) {
        editor.open_popup(PopupKind::Equation);
    }

    fn renderer_ready(&mut self, editor: &mut Editor<H>) {
        if !self.renderer.ready().is_empty() {
            editor.request_render();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingHost;

    fn render(handler: &mut EquationHandler, host: &mut RecordingHost, block: &Block) -> Element {
        BlockHandler::<RecordingHost>::render(handler, block, 0, host)
    }

    #[test]
    fn test_empty_source_placeholder() {
        let mut handler = EquationHandler::new();
        let mut host = RecordingHost::new();
        let el = render(&mut handler, &mut host, &Block::new(BlockKind::Equation));
        assert!(el.find_class("placeholder").is_some());
    }

    #[test]
    fn test_queues_until_renderer_ready() {
        let mut handler = EquationHandler::new();
        let mut host = RecordingHost::new();
        let block = Block::with_text(BlockKind::Equation, "x^2");

        let el = render(&mut handler, &mut host, &block);
        assert!(el.find_class("loading").is_some());
        assert_eq!(host.latex_calls, 0);

        handler.renderer_mut().ready();
        let el = render(&mut handler, &mut host, &block);
        assert!(el.find_class("katex-output").is_some());
        assert_eq!(host.latex_calls, 1);
    }

    #[test]
    fn test_parse_error_shown_inline() {
        let mut handler = EquationHandler::new();
        handler.renderer_mut().ready();
        let mut host = RecordingHost::new();
        host.latex_error = Some("unexpected brace".into());

        let block = Block::with_text(BlockKind::Equation, "\\frac{");
        let el = render(&mut handler, &mut host, &block);
        assert_eq!(el.find_class("error").unwrap().deep_text(), "unexpected brace");
    }
}
