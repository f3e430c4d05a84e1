//! Undo/redo stacks of inverse transactions.

use tracing::warn;

use crate::state::EditorState;
use crate::transaction::Transaction;

/// Default cap on stored undo entries; oldest entries are evicted.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Stack-based history of inverse transactions.
///
/// `push` records the inverse of an applied transaction and clears the
/// redo stack. `undo` applies the most recent inverse and moves the
/// resulting (re-do) inverse onto the redo stack; `redo` is symmetric.
#[derive(Debug, Default)]
pub struct History {
    undo: Vec<Transaction>,
    redo: Vec<Transaction>,
    max_depth: usize,
}

impl History {
    pub fn new() -> Self {
        Self::with_max_depth(DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            undo: Vec::new(),
            redo: Vec::new(),
            max_depth,
        }
    }

    /// Record the inverse of a freshly applied transaction.
    pub fn push(&mut self, inverse: Transaction) {
        self.redo.clear();
        self.undo.push(inverse);
        if self.undo.len() > self.max_depth {
            self.undo.remove(0);
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Undo the most recent transaction. Returns true on success.
    pub fn undo(&mut self, state: &mut EditorState) -> bool {
        let Some(tr) = self.undo.pop() else {
            return false;
        };
        match state.apply(&tr) {
            Ok(inverse) => {
                self.redo.push(inverse);
                true
            }
            Err(err) => {
                // Should not happen for inverses recorded from valid
                // applies; keep the entry so state and history agree.
                warn!(%err, "undo transaction failed to apply");
                self.undo.push(tr);
                false
            }
        }
    }

    /// Redo the most recently undone transaction. Returns true on success.
    pub fn redo(&mut self, state: &mut EditorState) -> bool {
        let Some(tr) = self.redo.pop() else {
            return false;
        };
        match state.apply(&tr) {
            Ok(inverse) => {
                self.undo.push(inverse);
                true
            }
            Err(err) => {
                warn!(%err, "redo transaction failed to apply");
                self.redo.push(tr);
                false
            }
        }
    }

    /// Drop all history (document load).
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn depth(&self) -> usize {
        self.undo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Block, BlockKind};
    use crate::document::Document;
    use crate::selection::{Position, Selection};
    use crate::step::Step;
    use crate::transaction::Transaction;

    fn insert_tr(index: usize, text: &str) -> Transaction {
        Transaction::new(Selection::cursor(Position::new(index, 0))).step(Step::InsertBlock {
            index,
            block: Block::with_text(BlockKind::Paragraph, text),
        })
    }

    fn apply_and_record(state: &mut EditorState, history: &mut History, tr: &Transaction) {
        let inverse = state.apply(tr).unwrap();
        history.push(inverse);
    }

    #[test]
    fn test_undo_redo_cycle() {
        let mut state = EditorState::new(Document::new());
        let mut history = History::new();

        apply_and_record(&mut state, &mut history, &insert_tr(1, "one"));
        apply_and_record(&mut state, &mut history, &insert_tr(2, "two"));
        assert_eq!(state.doc().len(), 3);

        assert!(history.undo(&mut state));
        assert_eq!(state.doc().len(), 2);
        assert!(history.can_redo());

        assert!(history.redo(&mut state));
        assert_eq!(state.doc().len(), 3);
        assert_eq!(state.doc().block(2).unwrap().content(), "two");
    }

    #[test]
    fn test_n_edits_n_undos_n_redos() {
        let mut state = EditorState::new(Document::new());
        let mut history = History::new();

        for i in 0..5 {
            apply_and_record(&mut state, &mut history, &insert_tr(i + 1, "x"));
        }
        let edited = state.clone();

        for _ in 0..5 {
            assert!(history.undo(&mut state));
        }
        assert_eq!(state.doc().len(), 1);

        for _ in 0..5 {
            assert!(history.redo(&mut state));
        }
        assert_eq!(state, edited);
    }

    #[test]
    fn test_push_clears_redo() {
        let mut state = EditorState::new(Document::new());
        let mut history = History::new();

        apply_and_record(&mut state, &mut history, &insert_tr(1, "one"));
        assert!(history.undo(&mut state));
        assert!(history.can_redo());

        apply_and_record(&mut state, &mut history, &insert_tr(1, "other"));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_max_depth_eviction() {
        let mut state = EditorState::new(Document::new());
        let mut history = History::with_max_depth(3);

        for i in 0..5 {
            apply_and_record(&mut state, &mut history, &insert_tr(i + 1, "x"));
        }
        assert_eq!(history.depth(), 3);

        assert!(history.undo(&mut state));
        assert!(history.undo(&mut state));
        assert!(history.undo(&mut state));
        assert!(!history.undo(&mut state));
        assert_eq!(state.doc().len(), 3);
    }

    #[test]
    fn test_clear() {
        let mut state = EditorState::new(Document::new());
        let mut history = History::new();
        apply_and_record(&mut state, &mut history, &insert_tr(1, "one"));
        history.clear();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(!history.undo(&mut state));
    }
}
