//! The document: an ordered sequence of blocks, never empty.

use serde::{Deserialize, Serialize};

use crate::block::Block;

/// A document is an ordered block sequence with the invariant that it
/// always contains at least one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// A document containing a single empty paragraph.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::paragraph()],
        }
    }

    /// Build from blocks; an empty input yields the empty document.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        if blocks.is_empty() {
            Self::new()
        } else {
            Self { blocks }
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: the never-empty invariant holds by construction.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn block(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    pub(crate) fn block_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.blocks.get_mut(index)
    }

    pub(crate) fn insert_block(&mut self, index: usize, block: Block) {
        self.blocks.insert(index, block);
    }

    pub(crate) fn remove_block(&mut self, index: usize) -> Block {
        self.blocks.remove(index)
    }

    pub(crate) fn replace_block(&mut self, index: usize, block: Block) -> Block {
        std::mem::replace(&mut self.blocks[index], block)
    }
}
