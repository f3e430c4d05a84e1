//! Atomic, invertible document mutations.
//!
//! A `Step` is the smallest unit of change. Applying a step mutates the
//! document and returns the inverse step; indices are validated before any
//! mutation so a malformed step can never leave the document corrupt.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::block::{Block, BlockKind, MAX_INDENT};
use crate::document::Document;

/// Structural failure while applying a step. These indicate a programming
/// error in the transaction builder, not a user-input condition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    #[error("block index {index} out of bounds (document has {len} blocks)")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("insert index {index} past end (document has {len} blocks)")]
    InsertPastEnd { index: usize, len: usize },

    #[error("indent {0} exceeds maximum {MAX_INDENT}")]
    IndentOutOfRange(u8),
}

/// One atomic document mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Step {
    /// Insert a block so that it ends up at `index`.
    InsertBlock { index: usize, block: Block },
    /// Remove the block at `index`. Removing the last remaining block
    /// replaces it with an empty paragraph instead (documents are never
    /// empty).
    DeleteBlock { index: usize },
    /// Swap the block at `index` for a new one.
    ReplaceBlock { index: usize, block: Block },
    /// Change the kind of the block at `index`.
    SetBlockKind { index: usize, kind: BlockKind },
    /// Change the indent level of the block at `index`.
    SetIndent { index: usize, indent: u8 },
    /// Set (`Some`) or remove (`None`) a metadata entry on the block.
    SetMeta {
        index: usize,
        key: SmolStr,
        value: Option<SmolStr>,
    },
}

impl Step {
    /// Apply this step to the document, returning the inverse step.
    pub fn apply(&self, doc: &mut Document) -> Result<Step, StepError> {
        let len = doc.len();
        match self {
            Step::InsertBlock { index, block } => {
                if *index > len {
                    return Err(StepError::InsertPastEnd { index: *index, len });
                }
                doc.insert_block(*index, block.clone());
                Ok(Step::DeleteBlock { index: *index })
            }
            Step::DeleteBlock { index } => {
                if *index >= len {
                    return Err(StepError::IndexOutOfBounds { index: *index, len });
                }
                if len == 1 {
                    // Never-empty invariant: converting instead of removing.
                    let old = doc.replace_block(*index, Block::paragraph());
                    return Ok(Step::ReplaceBlock {
                        index: *index,
                        block: old,
                    });
                }
                let old = doc.remove_block(*index);
                Ok(Step::InsertBlock {
                    index: *index,
                    block: old,
                })
            }
            Step::ReplaceBlock { index, block } => {
                if *index >= len {
                    return Err(StepError::IndexOutOfBounds { index: *index, len });
                }
                let old = doc.replace_block(*index, block.clone());
                Ok(Step::ReplaceBlock {
                    index: *index,
                    block: old,
                })
            }
            Step::SetBlockKind { index, kind } => {
                let block = doc
                    .block_mut(*index)
                    .ok_or(StepError::IndexOutOfBounds { index: *index, len })?;
                let old = std::mem::replace(&mut block.kind, *kind);
                Ok(Step::SetBlockKind {
                    index: *index,
                    kind: old,
                })
            }
            Step::SetIndent { index, indent } => {
                if *indent > MAX_INDENT {
                    return Err(StepError::IndentOutOfRange(*indent));
                }
                let block = doc
                    .block_mut(*index)
                    .ok_or(StepError::IndexOutOfBounds { index: *index, len })?;
                let old = std::mem::replace(&mut block.indent, *indent);
                Ok(Step::SetIndent {
                    index: *index,
                    indent: old,
                })
            }
            Step::SetMeta { index, key, value } => {
                let block = doc
                    .block_mut(*index)
                    .ok_or(StepError::IndexOutOfBounds { index: *index, len })?;
                let old = block.set_meta(key, value.clone());
                Ok(Step::SetMeta {
                    index: *index,
                    key: key.clone(),
                    value: old,
                })
            }
        }
    }
}
