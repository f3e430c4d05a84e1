//! End-to-end flows through the public editor surface with the default
//! handler chain and the recording host.

use folio_editor_core::{Block, BlockKind, Document, Position, Selection};
use folio_editor_view::testing::RecordingHost;
use folio_editor_view::{CaretPlacement, CellAddress, Editor, Key, KeyEvent, PopupKind};

fn editor_with_table() -> Editor<RecordingHost> {
    let mut editor = Editor::new(RecordingHost::new(), "/render/plantuml");
    editor.load(Document::from_blocks(vec![Block::with_text(
        BlockKind::Paragraph,
        "intro",
    )]));
    editor.host_mut().selection = Some(Selection::cursor(Position::new(0, 5)));
    editor.sync_selection();
    assert!(editor.insert_table(2, 2));
    editor
}

#[test]
fn test_insert_table_focuses_first_cell() {
    let editor = editor_with_table();
    assert_eq!(editor.state().doc().len(), 2);
    assert_eq!(
        editor.state().doc().block(1).unwrap().kind,
        BlockKind::Table
    );
    assert_eq!(
        editor.host().focused.last(),
        Some(&(CellAddress::new(1, 0, 0), CaretPlacement::Start))
    );
}

#[test]
fn test_selection_into_cell_then_tab_moves_focus() {
    let mut editor = editor_with_table();
    editor.host_mut().selected_cell = Some(CellAddress::new(1, 0, 0));
    editor.on_selection_change();

    assert!(editor.on_key_down(&KeyEvent::new(Key::Tab)));
    assert_eq!(
        editor.host().focused.last(),
        Some(&(CellAddress::new(1, 0, 1), CaretPlacement::Start))
    );
    // Document untouched by pure navigation.
    assert_eq!(editor.state().doc().block(0).unwrap().content(), "intro");
}

#[test]
fn test_escape_dismisses_equation_popup() {
    let mut editor = Editor::new(RecordingHost::new(), "/render/plantuml");
    editor.load(Document::from_blocks(vec![Block::with_text(
        BlockKind::Paragraph,
        "x",
    )]));
    assert!(editor.insert_equation());
    assert_eq!(editor.popup(), Some(PopupKind::Equation));
    assert!(editor.on_key_down(&KeyEvent::new(Key::Escape)));
    assert_eq!(editor.popup(), None);
}
