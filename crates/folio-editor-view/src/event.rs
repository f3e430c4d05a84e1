//! Platform-agnostic input events.
//!
//! The host converts native keyboard/input/pointer events into these
//! types before handing them to the editor; no platform event object
//! crosses this boundary.

use smol_str::SmolStr;

/// Key values for keyboard input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key.
    Character(SmolStr),
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    Unidentified,
}

/// Modifier key state for a key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        alt: false,
        shift: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        ctrl: false,
        alt: false,
        shift: true,
        meta: false,
    };

    pub const CTRL_SHIFT: Self = Self {
        ctrl: true,
        alt: false,
        shift: true,
        meta: false,
    };

    /// Primary shortcut modifier (Cmd on macOS, Ctrl elsewhere).
    pub fn primary(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A keydown with its modifier state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn character(ch: char) -> Self {
        Self::new(Key::Character(SmolStr::new(ch.to_string())))
    }
}

/// Semantic beforeinput categories the editor distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    InsertText,
    InsertParagraph,
    InsertFromPaste,
    DeleteContentBackward,
    DeleteContentForward,
    Other,
}

/// A beforeinput event: what kind of edit the platform is about to make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    pub kind: InputKind,
    pub data: Option<SmolStr>,
    /// True while an IME composition is in progress.
    pub composing: bool,
}

impl InputEvent {
    pub fn insert_text(data: impl Into<SmolStr>) -> Self {
        Self {
            kind: InputKind::InsertText,
            data: Some(data.into()),
            composing: false,
        }
    }

    pub fn of_kind(kind: InputKind) -> Self {
        Self {
            kind,
            data: None,
            composing: false,
        }
    }
}

/// A paste with its extracted plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteEvent {
    pub text: String,
}

/// What a pointer event hit, as resolved by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerTarget {
    /// The divider between column `left_col` and `left_col + 1` of the
    /// table at `table_index`; `table_px_width` is the table's rendered
    /// pixel width at gesture start.
    ColumnDivider {
        table_index: usize,
        left_col: usize,
        table_px_width: f64,
    },
    Other,
}

/// A pointer event with its horizontal position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub target: PointerTarget,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_modifier() {
        assert!(Modifiers::CTRL.primary());
        assert!(
            Modifiers {
                meta: true,
                ..Modifiers::NONE
            }
            .primary()
        );
        assert!(!Modifiers::SHIFT.primary());
    }

    #[test]
    fn test_character_event() {
        let ev = KeyEvent::character('a');
        assert_eq!(ev.key, Key::Character(SmolStr::new("a")));
        assert_eq!(ev.modifiers, Modifiers::NONE);
    }
}
