//! The catch-all handler for textual blocks: paragraphs, headings, lists.

use folio_editor_core::{Block, BlockKind, Format, Line, Span};
use smol_str::format_smolstr;

use crate::dom::Element;
use crate::handler::BlockHandler;
use crate::host::EditorHost;

/// Renders paragraph, heading, and list blocks. Editing events fall
/// through to the editor's default processing.
#[derive(Debug, Default)]
pub struct StandardHandler;

impl StandardHandler {
    pub fn new() -> Self {
        Self
    }
}

fn format_tag(fmt: Format) -> &'static str {
    match fmt {
        Format::Bold => "b",
        Format::Italic => "i",
        Format::Underline => "u",
        Format::Strikethrough => "s",
        Format::Superscript => "sup",
        Format::Subscript => "sub",
        Format::Code => "code",
        Format::Highlight => "mark",
    }
}

fn block_tag(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Heading1 => "h1",
        BlockKind::Heading2 => "h2",
        BlockKind::Heading3 => "h3",
        BlockKind::BulletList | BlockKind::OrderedList => "li",
        _ => "p",
    }
}

/// Render one span: text wrapped innermost-out by its formats, then the
/// variable chip or link anchor.
pub fn render_span(span: &Span) -> Element {
    let mut el = Element::new("span").text(span.text.clone());
    for fmt in span.formats.iter() {
        el = Element::new(format_tag(fmt)).child(el);
    }
    if let Some(name) = &span.variable {
        el = Element::new("span")
            .class("variable")
            .attr("data-variable", name.clone())
            .child(el);
    }
    if let Some(url) = &span.link {
        el = Element::new("a").attr("href", url.clone()).child(el);
    }
    el
}

/// Render a formatted line as a flat run of span elements.
pub fn render_line(line: &Line) -> Element {
    Element::new("span")
        .class("line")
        .children(line.spans().iter().map(render_span))
}

impl<H: EditorHost> BlockHandler<H> for StandardHandler {
    fn accepts(&self, kind: BlockKind) -> bool {
        kind.is_textual()
    }

    fn render(&mut self, block: &Block, index: usize, _host: &mut H) -> Element {
        let mut el = Element::new(block_tag(block.kind))
            .attr("data-block", format_smolstr!("{index}"))
            .editable();
        if block.indent > 0 {
            el = el.class(format_smolstr!("indent-{}", block.indent));
        }
        match block.kind {
            BlockKind::BulletList => el = el.class("bullet"),
            BlockKind::OrderedList => el = el.class("ordered"),
            _ => {}
        }
        el.children(block.lines.iter().map(render_line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingHost;
    use folio_editor_core::FormatSet;
    use smol_str::SmolStr;

    #[test]
    fn test_render_formatted_span() {
        let mut formats = FormatSet::single(Format::Bold);
        formats.insert(Format::Italic);
        let span = Span::formatted("hi", formats);

        let el = render_span(&span);
        // Italic wraps bold wraps the text span.
        assert_eq!(el.tag, "i");
        assert_eq!(el.children[0].tag, "b");
        assert_eq!(el.deep_text(), "hi");
    }

    #[test]
    fn test_render_link_and_variable() {
        let mut span = Span::plain("docs");
        span.link = Some(SmolStr::new("https://example.com"));
        let el = render_span(&span);
        assert_eq!(el.tag, "a");
        assert_eq!(el.attr_value("href"), Some("https://example.com"));

        let mut span = Span::plain("{x}");
        span.variable = Some(SmolStr::new("x"));
        let el = render_span(&span);
        assert!(el.has_class("variable"));
        assert_eq!(el.attr_value("data-variable"), Some("x"));
    }

    #[test]
    fn test_render_block_kinds() {
        let mut handler = StandardHandler::new();
        let mut host = RecordingHost::new();

        let el = BlockHandler::<RecordingHost>::render(
            &mut handler,
            &Block::with_text(BlockKind::Heading2, "title"),
            0,
            &mut host,
        );
        assert_eq!(el.tag, "h2");
        assert!(el.editable);
        assert_eq!(el.deep_text(), "title");

        let mut list = Block::with_text(BlockKind::BulletList, "item");
        list.indent = 2;
        let el = BlockHandler::<RecordingHost>::render(&mut handler, &list, 3, &mut host);
        assert_eq!(el.tag, "li");
        assert!(el.has_class("bullet"));
        assert!(el.has_class("indent-2"));
        assert_eq!(el.attr_value("data-block"), Some("3"));
    }
}
