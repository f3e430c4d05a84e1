//! folio-editor-view: block handlers, event dispatch, and the editor
//! loop on top of `folio-editor-core`.
//!
//! The native view layer is abstracted behind the [`EditorHost`] trait;
//! everything here is plain Rust and runs under `cargo test` with the
//! recording host in [`testing`].

pub mod diagram;
pub mod dom;
pub mod editor;
pub mod equation;
pub mod event;
pub mod external;
pub mod handler;
pub mod host;
pub mod popup;
pub mod standard;
pub mod table;
pub mod testing;

pub use diagram::DiagramHandler;
pub use dom::Element;
pub use editor::{Editor, RenderMode, ToolbarStatus};
pub use equation::EquationHandler;
pub use event::{
    InputEvent, InputKind, Key, KeyEvent, Modifiers, PasteEvent, PointerEvent, PointerTarget,
};
pub use external::{ExternalRenderer, RendererState};
pub use handler::{BlockHandler, default_handlers};
pub use host::{CaretPlacement, CellAddress, EditorHost};
pub use popup::{PopupKind, PopupSlot};
pub use standard::StandardHandler;
pub use table::TableHandler;
