//! Transactions: atomic batches of steps plus a target selection.

use serde::{Deserialize, Serialize};

use crate::selection::Selection;
use crate::step::Step;

/// An atomic, invertible batch of document mutations. The selection is
/// what the editor selection becomes after the transaction applies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub steps: Vec<Step>,
    pub selection: Selection,
}

impl Transaction {
    /// An empty transaction targeting the given selection.
    pub fn new(selection: Selection) -> Self {
        Self {
            steps: Vec::new(),
            selection,
        }
    }

    pub fn with_steps(steps: Vec<Step>, selection: Selection) -> Self {
        Self { steps, selection }
    }

    /// Builder-style step append.
    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
