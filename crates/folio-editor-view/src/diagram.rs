//! Diagram blocks: source text rendered by an external diagram service.

use folio_editor_core::{Block, BlockKind};
use smol_str::{SmolStr, format_smolstr};

use crate::dom::Element;
use crate::editor::Editor;
use crate::external::ExternalRenderer;
use crate::handler::BlockHandler;
use crate::host::EditorHost;
use crate::popup::PopupKind;

/// Renders diagram blocks as an image pointing at the rendered-diagram
/// URL, with a placeholder when there is no source text yet.
#[derive(Debug, Default)]
pub struct DiagramHandler {
    base_url: SmolStr,
    renderer: ExternalRenderer,
}

impl DiagramHandler {
    pub fn new(base_url: impl Into<SmolStr>) -> Self {
        Self {
            base_url: base_url.into(),
            renderer: ExternalRenderer::new(),
        }
    }

    pub fn renderer_mut(&mut self) -> &mut ExternalRenderer {
        &mut self.renderer
    }
}

impl<H: EditorHost> BlockHandler<H> for DiagramHandler {
    fn accepts(&self, kind: BlockKind) -> bool {
        kind == BlockKind::Diagram
    }

    fn render(&mut self, block: &Block, index: usize, host: &mut H) -> Element {
        let el = Element::new("div")
            .class("diagram")
            .attr("data-block", format_smolstr!("{index}"));
        let source = block.content();
        if source.is_empty() {
            return el.child(Element::new("span").class("placeholder").text("diagram"));
        }
        if !self.renderer.request(index) {
            return el.child(Element::new("span").class("loading").text(source));
        }
        let url = host.diagram_url(&self.base_url, &source);
        let mut img = Element::new("img").attr("src", url);
        if let Some(caption) = block.caption() {
            img = img.attr("alt", caption);
            return el
                .child(img)
                .child(Element::new("figcaption").text(caption));
        }
        el.child(img)
    }

    fn focus_block(&mut self, editor: &mut Editor<H>, _index: usize) {
        editor.open_popup(PopupKind::Diagram);
    }

    fn renderer_ready(&mut self, editor: &mut Editor<H>) {
        if !self.renderer.ready().is_empty() {
            editor.request_render();
        }
    }
}
