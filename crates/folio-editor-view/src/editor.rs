//! The editor loop: event dispatch, transaction application, rendering.

use folio_editor_core::{
    BlockKind, Document, EditorState, Format, FormatSet, History, Selection, SmolStr, Transaction,
    commands,
};
use tracing::{debug, warn};

use crate::event::{InputEvent, InputKind, Key, KeyEvent, PasteEvent, PointerEvent};
use crate::handler::{BlockHandler, default_handlers};
use crate::host::EditorHost;
use crate::popup::{PopupKind, PopupSlot};

/// How a transaction reaches the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// Push the inverse onto history, rebuild the view, notify the
    /// toolbar.
    Full,
    /// Apply to state only: no history entry, no rebuild. Used for edits
    /// the view has already made natively (cell sync, resize commit).
    Silent,
}

/// Snapshot pushed to the toolbar listener after every visible change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarStatus {
    pub block_kind: Option<BlockKind>,
    pub formats: FormatSet,
    pub is_range: bool,
    pub can_undo: bool,
    pub can_redo: bool,
}

type ToolbarListener = Box<dyn FnMut(&ToolbarStatus)>;

/// One editor instance: state, history, handler chain, and the host it
/// renders through.
///
/// Every event entry point runs the handler chain first (first claim
/// wins) and falls back to generic default processing. Step errors are
/// logged and dropped rather than propagated, since entry points run
/// inside platform event callbacks.
pub struct Editor<H: EditorHost> {
    host: H,
    state: EditorState,
    history: History,
    handlers: Vec<Box<dyn BlockHandler<H>>>,
    popup: PopupSlot,
    rendering: bool,
    render_requested: bool,
    toolbar: Option<ToolbarListener>,
}

impl<H: EditorHost> Editor<H> {
    pub fn new(host: H, diagram_base_url: &str) -> Self {
        Self::with_handlers(host, default_handlers(diagram_base_url))
    }

    pub fn with_handlers(host: H, handlers: Vec<Box<dyn BlockHandler<H>>>) -> Self {
        Self {
            host,
            state: EditorState::default(),
            history: History::new(),
            handlers,
            popup: PopupSlot::new(),
            rendering: false,
            render_requested: false,
            toolbar: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Replace the document, dropping all history.
    pub fn load(&mut self, doc: Document) {
        self.state = EditorState::new(doc);
        self.history.clear();
        self.render();
        self.notify_toolbar();
    }

    // === Transactions ===

    /// Apply a transaction. Returns false when a step fails; the state is
    /// untouched in that case.
    pub fn apply_transaction(&mut self, tr: &Transaction, mode: RenderMode) -> bool {
        self.run_before_apply();
        let inverse = match self.state.apply(tr) {
            Ok(inverse) => inverse,
            Err(err) => {
                warn!(%err, "transaction rejected");
                return false;
            }
        };
        if mode == RenderMode::Full {
            self.history.push(inverse);
            self.render();
            self.notify_toolbar();
        }
        true
    }

    fn apply_command(&mut self, tr: Option<Transaction>) -> bool {
        match tr {
            Some(tr) => self.apply_transaction(&tr, RenderMode::Full),
            None => false,
        }
    }

    /// Commit pending native state (dirty cells) first, then build the
    /// command against the synced document and apply it. Commands that
    /// clone blocks must never see stale content.
    fn command(
        &mut self,
        build: impl FnOnce(&EditorState) -> Option<Transaction>,
    ) -> bool {
        self.run_before_apply();
        let tr = build(&self.state);
        self.apply_command(tr)
    }

    pub fn undo(&mut self) -> bool {
        self.run_before_apply();
        let done = self.history.undo(&mut self.state);
        if done {
            self.render();
            self.notify_toolbar();
        }
        done
    }

    pub fn redo(&mut self) -> bool {
        self.run_before_apply();
        let done = self.history.redo(&mut self.state);
        if done {
            self.render();
            self.notify_toolbar();
        }
        done
    }

    // === Rendering ===

    /// Rebuild the whole block list through the handler chain, restore
    /// the selection, and scroll the caret into view.
    pub fn render(&mut self) {
        self.rendering = true;
        self.each_handler(|ed, h| h.begin_render(ed));
        let blocks = self.state.doc().blocks().to_vec();
        let rendered = self.with_taken_handlers(|ed, handlers| {
            blocks
                .iter()
                .enumerate()
                .filter_map(|(index, block)| {
                    handlers
                        .iter_mut()
                        .find(|h| h.accepts(block.kind))
                        .map(|h| h.render(block, index, &mut ed.host))
                })
                .collect::<Vec<_>>()
        });
        self.host.mount(rendered);
        let sel = self.state.selection();
        if sel.is_cursor() {
            self.host.set_cursor(sel.head);
        } else {
            self.host.set_selection(sel);
        }
        self.host.scroll_caret_into_view();
        self.each_handler(|ed, h| h.after_render(ed));
        self.rendering = false;
        self.render_requested = false;
    }

    /// Ask for a render after the current dispatch finishes (for hooks
    /// that run mid-dispatch and must not rebuild re-entrantly).
    pub fn request_render(&mut self) {
        self.render_requested = true;
    }

    fn flush_render_request(&mut self) {
        if std::mem::take(&mut self.render_requested) {
            self.render();
        }
    }

    // === Popups ===

    pub fn open_popup(&mut self, kind: PopupKind) {
        if let Some(prior) = self.popup.open(kind) {
            debug!(?prior, ?kind, "popup displaced");
        }
    }

    pub fn close_popup(&mut self) -> bool {
        self.popup.close()
    }

    pub fn popup(&self) -> Option<PopupKind> {
        self.popup.current()
    }

    // === Toolbar surface ===

    pub fn set_toolbar_listener(&mut self, listener: ToolbarListener) {
        self.toolbar = Some(listener);
        self.notify_toolbar();
    }

    pub fn toggle_format(&mut self, fmt: Format) -> bool {
        if self.dispatch(|ed, h| h.handle_format_toggle(ed, fmt)) {
            self.flush_render_request();
            self.notify_toolbar();
            return true;
        }
        let done = self.command(|s| commands::toggle_format(s, fmt));
        self.notify_toolbar();
        done
    }

    pub fn set_block_kind(&mut self, kind: BlockKind) -> bool {
        self.command(|s| commands::set_block_kind(s, kind))
    }

    pub fn toggle_block_kind(&mut self, kind: BlockKind) -> bool {
        self.command(|s| commands::toggle_block_kind(s, kind))
    }

    pub fn insert_table(&mut self, rows: usize, cols: usize) -> bool {
        let index = self.state.selection().start().block + 1;
        if self.command(|s| commands::insert_table(s, rows, cols)) {
            self.focus_new_block(index);
            return true;
        }
        false
    }

    pub fn insert_table_row(&mut self, table_index: usize, at_row: usize) -> bool {
        self.command(|s| commands::insert_row(s, table_index, at_row))
    }

    pub fn delete_table_row(&mut self, table_index: usize, row: usize) -> bool {
        self.command(|s| commands::delete_row(s, table_index, row))
    }

    pub fn insert_table_column(&mut self, table_index: usize, at_col: usize) -> bool {
        self.command(|s| commands::insert_column(s, table_index, at_col))
    }

    pub fn delete_table_column(&mut self, table_index: usize, col: usize) -> bool {
        self.command(|s| commands::delete_column(s, table_index, col))
    }

    pub fn insert_equation(&mut self) -> bool {
        let index = self.state.selection().start().block + 1;
        let tr = commands::insert_equation(&self.state);
        if self.apply_transaction(&tr, RenderMode::Full) {
            self.focus_new_block(index);
            return true;
        }
        false
    }

    pub fn insert_diagram(&mut self) -> bool {
        let index = self.state.selection().start().block + 1;
        let tr = commands::insert_diagram(&self.state);
        if self.apply_transaction(&tr, RenderMode::Full) {
            self.focus_new_block(index);
            return true;
        }
        false
    }

    pub fn insert_text(&mut self, text: &str) -> bool {
        self.command(|s| commands::insert_text(s, text))
    }

    /// Pull the native selection into the state (no transaction).
    pub fn sync_selection(&mut self) {
        if let Some(sel) = self.host.read_selection() {
            self.state.set_selection(sel);
            self.notify_toolbar();
        }
    }

    pub fn current_link(&self) -> Option<SmolStr> {
        commands::current_link(&self.state)
    }

    pub fn apply_link(&mut self, url: &str) -> bool {
        self.command(|s| commands::apply_link(s, url))
    }

    pub fn remove_link(&mut self) -> bool {
        self.command(commands::remove_link)
    }

    pub fn apply_variable(&mut self, name: &str, label: &str) -> bool {
        self.command(|s| commands::apply_variable(s, name, label))
    }

    // === Event entry points ===

    /// Keydown. Returns true when the event was consumed and the platform
    /// default must be suppressed.
    pub fn on_key_down(&mut self, ev: &KeyEvent) -> bool {
        if ev.key == Key::Escape && self.popup.is_open() {
            self.popup.close();
            return true;
        }
        if self.dispatch(|ed, h| h.handle_key_down(ed, ev)) {
            self.flush_render_request();
            return true;
        }
        if self.in_cell() {
            return false;
        }
        self.default_key_down(ev)
    }

    fn default_key_down(&mut self, ev: &KeyEvent) -> bool {
        let mods = ev.modifiers;
        match &ev.key {
            Key::Enter if !mods.shift && !mods.primary() => {
                self.command(commands::split_block);
                true
            }
            Key::Backspace => {
                self.command(commands::delete_backward);
                true
            }
            Key::Delete => {
                self.command(commands::delete_forward);
                true
            }
            Key::Tab => {
                if mods.shift {
                    self.command(commands::outdent);
                } else {
                    self.command(commands::indent);
                }
                true
            }
            Key::Character(c) if mods.primary() && !mods.alt => match c.as_str() {
                "b" => {
                    self.toggle_format(Format::Bold);
                    true
                }
                "i" => {
                    self.toggle_format(Format::Italic);
                    true
                }
                "u" => {
                    self.toggle_format(Format::Underline);
                    true
                }
                "z" if mods.shift => {
                    self.redo();
                    true
                }
                "z" => {
                    self.undo();
                    true
                }
                "y" => {
                    self.redo();
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }

    /// Beforeinput. A handler claim suppresses the platform default even
    /// for composed input; the editor's own default lets compositions
    /// proceed natively.
    pub fn on_before_input(&mut self, ev: &InputEvent) -> bool {
        if self.dispatch(|ed, h| h.handle_before_input(ed, ev)) {
            self.flush_render_request();
            return true;
        }
        if self.in_cell() || ev.composing {
            return false;
        }
        match ev.kind {
            InputKind::InsertText | InputKind::InsertFromPaste => {
                if let Some(data) = &ev.data {
                    self.command(|s| commands::insert_text(s, data));
                }
                true
            }
            InputKind::InsertParagraph => {
                self.command(commands::split_block);
                true
            }
            InputKind::DeleteContentBackward => {
                self.command(commands::delete_backward);
                true
            }
            InputKind::DeleteContentForward => {
                self.command(commands::delete_forward);
                true
            }
            InputKind::Other => false,
        }
    }

    pub fn on_paste(&mut self, ev: &PasteEvent) -> bool {
        if self.dispatch(|ed, h| h.handle_paste(ed, ev)) {
            self.flush_render_request();
            return true;
        }
        if self.in_cell() || ev.text.is_empty() {
            return false;
        }
        self.command(|s| commands::insert_text(s, &ev.text));
        true
    }

    /// Native selection moved. Ignored while a render rebuild is in
    /// progress (the rebuild itself moves the selection).
    pub fn on_selection_change(&mut self) {
        if self.rendering {
            return;
        }
        if self.dispatch(|ed, h| h.handle_selection_change(ed)) {
            self.flush_render_request();
            return;
        }
        self.sync_selection();
    }

    /// A cell-editable region lost focus.
    pub fn on_cell_blur(&mut self) {
        self.each_handler(|ed, h| h.handle_cell_blur(ed));
        self.flush_render_request();
    }

    pub fn on_pointer_down(&mut self, ev: &PointerEvent) -> bool {
        self.dispatch(|ed, h| h.handle_pointer_down(ed, ev))
    }

    pub fn on_pointer_move(&mut self, ev: &PointerEvent) -> bool {
        self.dispatch(|ed, h| h.handle_pointer_move(ed, ev))
    }

    pub fn on_pointer_up(&mut self, ev: &PointerEvent) -> bool {
        let claimed = self.dispatch(|ed, h| h.handle_pointer_up(ed, ev));
        self.flush_render_request();
        claimed
    }

    /// An external renderer for the given block kind finished loading.
    pub fn on_renderer_ready(&mut self, kind: BlockKind) {
        self.with_taken_handlers(|ed, handlers| {
            if let Some(h) = handlers.iter_mut().find(|h| h.accepts(kind)) {
                h.renderer_ready(ed);
            }
        });
        self.flush_render_request();
    }

    // === Dispatch plumbing ===

    /// Run a closure with the handler chain temporarily taken out, so
    /// hooks can borrow the editor mutably. Hooks that re-enter see an
    /// empty chain and skip, which is the intended re-entrancy behavior.
    fn with_taken_handlers<R>(
        &mut self,
        f: impl FnOnce(&mut Self, &mut Vec<Box<dyn BlockHandler<H>>>) -> R,
    ) -> R {
        let mut handlers = std::mem::take(&mut self.handlers);
        let result = f(self, &mut handlers);
        self.handlers = handlers;
        result
    }

    /// First handler to claim wins.
    fn dispatch(&mut self, mut f: impl FnMut(&mut Self, &mut dyn BlockHandler<H>) -> bool) -> bool {
        self.with_taken_handlers(|ed, handlers| {
            handlers.iter_mut().any(|h| f(ed, h.as_mut()))
        })
    }

    fn each_handler(&mut self, mut f: impl FnMut(&mut Self, &mut dyn BlockHandler<H>)) {
        self.with_taken_handlers(|ed, handlers| {
            for h in handlers.iter_mut() {
                f(ed, h.as_mut());
            }
        });
    }

    fn run_before_apply(&mut self) {
        self.each_handler(|ed, h| h.before_apply_transaction(ed));
    }

    /// Whether the native selection sits inside an editable cell. Cell
    /// content is edited natively; the generic pipelines must not touch
    /// the stale document selection behind it.
    fn in_cell(&mut self) -> bool {
        self.host.cell_from_selection().is_some()
    }

    fn focus_new_block(&mut self, index: usize) {
        let Some(kind) = self.state.doc().block(index).map(|b| b.kind) else {
            return;
        };
        self.with_taken_handlers(|ed, handlers| {
            if let Some(h) = handlers.iter_mut().find(|h| h.accepts(kind)) {
                h.focus_block(ed, index);
            }
        });
        self.flush_render_request();
    }

    fn notify_toolbar(&mut self) {
        let Some(mut listener) = self.toolbar.take() else {
            return;
        };
        let sel = self.state.selection();
        let status = ToolbarStatus {
            block_kind: self.state.doc().block(sel.head.block).map(|b| b.kind),
            formats: commands::active_formats(&self.state),
            is_range: sel.is_range(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        };
        listener(&status);
        self.toolbar = Some(listener);
    }

    /// Current selection convenience for handlers.
    pub fn selection(&self) -> Selection {
        self.state.selection()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Modifiers;
    use crate::testing::RecordingHost;
    use folio_editor_core::{Block, Position};

    fn editor_with(texts: &[&str]) -> Editor<RecordingHost> {
        let mut editor = Editor::new(RecordingHost::new(), "/diagram");
        editor.load(Document::from_blocks(
            texts
                .iter()
                .map(|t| Block::with_text(BlockKind::Paragraph, *t))
                .collect(),
        ));
        editor
            .state
            .set_selection(Selection::cursor(Position::new(0, 0)));
        editor
    }

    #[test]
    fn test_insert_text_scenario() {
        let mut editor = editor_with(&[""]);

        let claimed = editor.on_before_input(&InputEvent::insert_text("hi"));
        assert!(claimed);
        assert_eq!(editor.state().doc().block(0).unwrap().content(), "hi");
        assert_eq!(
            editor.state().selection(),
            Selection::cursor(Position::new(0, 2))
        );
        // Exactly one inverse recorded.
        assert_eq!(editor.history().depth(), 1);
    }

    #[test]
    fn test_enter_splits_and_backspace_merges() {
        let mut editor = editor_with(&["hello"]);
        editor
            .state
            .set_selection(Selection::cursor(Position::new(0, 3)));

        assert!(editor.on_key_down(&KeyEvent::new(Key::Enter)));
        assert_eq!(editor.state().doc().len(), 2);

        assert!(editor.on_key_down(&KeyEvent::new(Key::Backspace)));
        assert_eq!(editor.state().doc().len(), 1);
        assert_eq!(editor.state().doc().block(0).unwrap().content(), "hello");
    }

    #[test]
    fn test_ctrl_z_undoes() {
        let mut editor = editor_with(&[""]);
        editor.on_before_input(&InputEvent::insert_text("x"));
        assert_eq!(editor.state().doc().block(0).unwrap().content(), "x");

        let ctrl_z = KeyEvent::with_modifiers(Key::Character("z".into()), Modifiers::CTRL);
        assert!(editor.on_key_down(&ctrl_z));
        assert_eq!(editor.state().doc().block(0).unwrap().content(), "");

        let ctrl_y = KeyEvent::with_modifiers(Key::Character("y".into()), Modifiers::CTRL);
        assert!(editor.on_key_down(&ctrl_y));
        assert_eq!(editor.state().doc().block(0).unwrap().content(), "x");
    }

    #[test]
    fn test_full_renders_silent_does_not() {
        let mut editor = editor_with(&["abc"]);
        let mounts = editor.host().mounts.len();

        let tr = commands::insert_text(editor.state(), "x").unwrap();
        editor.apply_transaction(&tr, RenderMode::Silent);
        assert_eq!(editor.host().mounts.len(), mounts);
        assert_eq!(editor.history().depth(), 0);

        let tr = commands::insert_text(editor.state(), "y").unwrap();
        editor.apply_transaction(&tr, RenderMode::Full);
        assert_eq!(editor.host().mounts.len(), mounts + 1);
        assert_eq!(editor.history().depth(), 1);
    }

    #[test]
    fn test_toolbar_notified_with_status() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen: Rc<RefCell<Vec<ToolbarStatus>>> = Rc::default();
        let sink = seen.clone();

        let mut editor = editor_with(&["hi"]);
        editor.set_toolbar_listener(Box::new(move |status| {
            sink.borrow_mut().push(status.clone());
        }));

        editor
            .state
            .set_selection(Selection::new(Position::new(0, 0), Position::new(0, 2)));
        editor.toggle_format(Format::Bold);

        let last = seen.borrow().last().cloned().unwrap();
        assert_eq!(last.block_kind, Some(BlockKind::Paragraph));
        assert!(last.formats.contains(Format::Bold));
        assert!(last.is_range);
        assert!(last.can_undo);
    }

    #[test]
    fn test_escape_closes_popup() {
        let mut editor = editor_with(&["x"]);
        editor.open_popup(PopupKind::Link);
        assert!(editor.on_key_down(&KeyEvent::new(Key::Escape)));
        assert_eq!(editor.popup(), None);
        // No popup open: Escape falls through.
        assert!(!editor.on_key_down(&KeyEvent::new(Key::Escape)));
    }

    #[test]
    fn test_insert_equation_opens_popup() {
        let mut editor = editor_with(&["intro"]);
        assert!(editor.insert_equation());
        assert_eq!(
            editor.state().doc().block(1).unwrap().kind,
            BlockKind::Equation
        );
        assert_eq!(editor.popup(), Some(PopupKind::Equation));
    }

    #[test]
    fn test_handler_claim_suppresses_default_input() {
        struct Claiming;
        impl BlockHandler<RecordingHost> for Claiming {
            fn accepts(&self, _kind: BlockKind) -> bool {
                false
            }
            fn render(
                &mut self,
                _block: &Block,
                _index: usize,
                _host: &mut RecordingHost,
            ) -> crate::dom::Element {
                crate::dom::Element::new("div")
            }
            fn handle_before_input(
                &mut self,
                _editor: &mut Editor<RecordingHost>,
                _ev: &InputEvent,
            ) -> bool {
                true
            }
        }

        let mut editor = Editor::with_handlers(RecordingHost::new(), vec![Box::new(Claiming)]);
        editor.load(Document::from_blocks(vec![Block::with_text(
            BlockKind::Paragraph,
            "",
        )]));
        // Claimed even mid-composition; nothing reaches the document.
        let composed = InputEvent {
            kind: InputKind::InsertText,
            data: Some("日".into()),
            composing: true,
        };
        assert!(editor.on_before_input(&composed));
        assert_eq!(editor.state().doc().block(0).unwrap().content(), "");
    }

    #[test]
    fn test_invalid_transaction_is_dropped() {
        let mut editor = editor_with(&["x"]);
        let tr = Transaction::new(Selection::default()).step(
            folio_editor_core::Step::DeleteBlock { index: 42 },
        );
        assert!(!editor.apply_transaction(&tr, RenderMode::Full));
        assert_eq!(editor.state().doc().len(), 1);
        assert_eq!(editor.history().depth(), 0);
    }

    #[test]
    fn test_selection_change_syncs_from_host() {
        let mut editor = editor_with(&["hello"]);
        editor.host_mut().selection =
            Some(Selection::cursor(Position::new(0, 4)));
        editor.on_selection_change();
        assert_eq!(
            editor.state().selection(),
            Selection::cursor(Position::new(0, 4))
        );
    }

    #[test]
    fn test_n_edits_undo_redo_via_keys() {
        let mut editor = editor_with(&[""]);
        for ch in ["a", "b", "c"] {
            editor.on_before_input(&InputEvent::insert_text(ch));
        }
        let final_state = editor.state().clone();

        let ctrl_z = KeyEvent::with_modifiers(Key::Character("z".into()), Modifiers::CTRL);
        for _ in 0..3 {
            editor.on_key_down(&ctrl_z);
        }
        assert_eq!(editor.state().doc().block(0).unwrap().content(), "");

        let ctrl_y = KeyEvent::with_modifiers(Key::Character("y".into()), Modifiers::CTRL);
        for _ in 0..3 {
            editor.on_key_down(&ctrl_y);
        }
        assert_eq!(*editor.state(), final_state);
    }
}
