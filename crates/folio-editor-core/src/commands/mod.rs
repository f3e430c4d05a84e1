//! Commands: pure functions from high-level editing intents to
//! transactions.
//!
//! Commands read the current [`EditorState`](crate::state::EditorState)
//! but never mutate it; only `EditorState::apply` mutates. A command
//! returns `None` when the intent does not apply to the current state
//! (wrong block kind, boundary condition, nothing to do).

mod block;
mod format;
mod table;
mod text;

pub use block::{
    indent, insert_diagram, insert_equation, insert_table, outdent, set_block_kind,
    toggle_block_kind,
};
pub use format::{
    active_formats, apply_link, apply_variable, current_link, is_format_active, remove_link,
    toggle_format,
};
pub use table::{
    delete_column, delete_row, insert_column, insert_row, replace_cell_line, set_alignment,
    set_caption, set_column_widths, toggle_header_row,
};
pub use text::{delete_backward, delete_forward, insert_text, replace_selection, split_block};
