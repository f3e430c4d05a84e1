//! folio-editor-core: Pure Rust block-document editing logic without
//! framework dependencies.
//!
//! This crate provides:
//! - `Document`/`Block`/`Line`/`Span` - the block document model
//! - `Step`/`Transaction` - atomic, invertible document mutations
//! - `EditorState::apply` - the single mutation point, returning inverses
//! - `History` - undo/redo stacks of inverse transactions
//! - `commands` - pure intent-to-transaction functions

pub mod block;
pub mod commands;
pub mod document;
pub mod history;
pub mod line;
pub mod selection;
pub mod state;
pub mod step;
pub mod transaction;

pub use block::{Block, BlockKind, ColAlign, MAX_INDENT, even_widths, join_nums, meta};
pub use document::Document;
pub use history::{DEFAULT_MAX_DEPTH, History};
pub use line::{Format, FormatSet, Line, Span};
pub use selection::{Position, Selection};
pub use smol_str::SmolStr;
pub use state::EditorState;
pub use step::{Step, StepError};
pub use transaction::Transaction;
