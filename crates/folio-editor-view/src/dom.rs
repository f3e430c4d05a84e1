//! Detached element trees built by block handlers.
//!
//! Handlers describe what a block looks like; the host attaches the tree
//! to its real view layer. Keeping the tree as plain data makes render
//! output assertable in tests.

use smol_str::SmolStr;

/// One node of a detached element tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: SmolStr,
    pub classes: Vec<SmolStr>,
    pub attrs: Vec<(SmolStr, SmolStr)>,
    pub text: Option<SmolStr>,
    pub children: Vec<Element>,
    pub editable: bool,
}

impl Element {
    pub fn new(tag: impl Into<SmolStr>) -> Self {
        Self {
            tag: tag.into(),
            classes: Vec::new(),
            attrs: Vec::new(),
            text: None,
            children: Vec::new(),
            editable: false,
        }
    }

    pub fn class(mut self, class: impl Into<SmolStr>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, name: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn text(mut self, text: impl Into<SmolStr>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn editable(mut self) -> Self {
        self.editable = true;
        self
    }

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Concatenated text of this node and its descendants, in order.
    pub fn deep_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Depth-first search for the first descendant with the given tag.
    pub fn find_tag(&self, tag: &str) -> Option<&Element> {
        if self.tag == tag {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_tag(tag))
    }

    /// Depth-first search for the first descendant with the given class.
    pub fn find_class(&self, class: &str) -> Option<&Element> {
        if self.has_class(class) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_class(class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_queries() {
        let el = Element::new("div")
            .class("outer")
            .attr("data-index", "3")
            .child(Element::new("p").text("hello ").child(Element::new("b").text("world")));

        assert_eq!(el.attr_value("data-index"), Some("3"));
        assert!(el.has_class("outer"));
        assert_eq!(el.deep_text(), "hello world");
        assert_eq!(el.find_tag("b").unwrap().deep_text(), "world");
        assert!(el.find_tag("table").is_none());
    }

    #[test]
    fn test_editable_flag() {
        let el = Element::new("td").editable();
        assert!(el.editable);
        assert!(!Element::new("td").editable);
    }
}
