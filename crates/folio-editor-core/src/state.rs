//! Editor state: the current document plus selection, mutated only
//! through transactions.

use tracing::trace;

use crate::document::Document;
use crate::selection::Selection;
use crate::step::StepError;
use crate::transaction::Transaction;

/// Owns the document and selection for one editor instance.
///
/// Created once per editor (or on load); all mutation goes through
/// [`EditorState::apply`], which returns the inverse transaction for the
/// undo history.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    doc: Document,
    selection: Selection,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new(Document::new())
    }
}

impl EditorState {
    pub fn new(doc: Document) -> Self {
        Self {
            doc,
            selection: Selection::default(),
        }
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Move the selection without a transaction (selection sync from the
    /// host UI; selection-only moves are not undoable edits).
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    /// Apply a transaction: execute each step in order, set the selection
    /// to the transaction's target, and return the inverse transaction.
    ///
    /// The inverse's steps are the per-step inverses in reverse order and
    /// its target selection is the pre-apply selection, so applying the
    /// inverse immediately afterwards restores document and selection
    /// exactly.
    ///
    /// If a step fails, every step applied so far is rolled back and the
    /// error is returned; the document is never left in a partial state.
    pub fn apply(&mut self, tr: &Transaction) -> Result<Transaction, StepError> {
        let mut inverses = Vec::with_capacity(tr.steps.len());
        for step in &tr.steps {
            match step.apply(&mut self.doc) {
                Ok(inv) => inverses.push(inv),
                Err(err) => {
                    // Roll back the applied prefix, most recent first.
                    // Inverses of successfully applied steps cannot fail.
                    while let Some(inv) = inverses.pop() {
                        let _ = inv.apply(&mut self.doc);
                    }
                    trace!(%err, "transaction aborted and rolled back");
                    return Err(err);
                }
            }
        }
        inverses.reverse();
        let inverse = Transaction::with_steps(inverses, self.selection);
        self.selection = tr.selection;
        trace!(steps = tr.steps.len(), "transaction applied");
        Ok(inverse)
    }
}
