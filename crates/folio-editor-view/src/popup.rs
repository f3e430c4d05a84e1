//! Floating popup panels with singleton discipline.

/// The floating panels the editor can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupKind {
    Equation,
    Diagram,
    Link,
    Variable,
}

/// At most one popup is open at a time; opening another closes the prior
/// one, and Escape closes whatever is open.
#[derive(Debug, Default)]
pub struct PopupSlot {
    open: Option<PopupKind>,
}

impl PopupSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a popup, returning the one it displaced, if any.
    pub fn open(&mut self, kind: PopupKind) -> Option<PopupKind> {
        self.open.replace(kind)
    }

    /// Close the open popup. Returns true if one was open.
    pub fn close(&mut self) -> bool {
        self.open.take().is_some()
    }

    pub fn current(&self) -> Option<PopupKind> {
        self.open
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singleton_discipline() {
        let mut slot = PopupSlot::new();
        assert!(!slot.is_open());

        assert_eq!(slot.open(PopupKind::Equation), None);
        assert_eq!(slot.current(), Some(PopupKind::Equation));

        // Opening another closes the prior one.
        assert_eq!(slot.open(PopupKind::Link), Some(PopupKind::Equation));
        assert_eq!(slot.current(), Some(PopupKind::Link));

        assert!(slot.close());
        assert!(!slot.close());
        assert_eq!(slot.current(), None);
    }
}
