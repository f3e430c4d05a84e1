//! Cursor and range selection addressed by (block, offset) pairs.

use serde::{Deserialize, Serialize};

/// A position in the document: a block index plus a char offset into that
/// block's flattened content.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub block: usize,
    pub offset: usize,
}

impl Position {
    pub fn new(block: usize, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// A selection with anchor (where it started) and head (where the cursor
/// is). Anchor and head may be in either order; use `start()`/`end()` for
/// document-ordered bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Position,
    pub head: Position,
}

impl Selection {
    pub fn new(anchor: Position, head: Position) -> Self {
        Self { anchor, head }
    }

    /// A collapsed selection (caret).
    pub fn cursor(pos: Position) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    pub fn is_cursor(&self) -> bool {
        self.anchor == self.head
    }

    pub fn is_range(&self) -> bool {
        !self.is_cursor()
    }

    /// Document-ordered lower bound.
    pub fn start(&self) -> Position {
        self.anchor.min(self.head)
    }

    /// Document-ordered upper bound.
    pub fn end(&self) -> Position {
        self.anchor.max(self.head)
    }

    /// Whether the selection spans more than one block.
    pub fn crosses_blocks(&self) -> bool {
        self.anchor.block != self.head.block
    }
}
