//! Stacking confirmation stage.
//!
//! Re-checks the whole EMA stack locally: for Long each average must sit
//! strictly above the next longer one, for Short strictly below. The remote
//! query already asks for this; the stage catches rows where the provider's
//! pairwise encoding let something through.

use crate::domain::{CandidateRow, DirectionRules, EMA_STACK};

use super::{require, FilterStage, StageVerdict};

#[derive(Debug, Clone)]
pub struct StackConfirmation {
    rules: DirectionRules,
}

impl StackConfirmation {
    pub fn new(rules: DirectionRules) -> Self {
        Self { rules }
    }
}

impl FilterStage for StackConfirmation {
    fn name(&self) -> &str {
        "stacking_confirmation"
    }

    fn evaluate(&self, row: &CandidateRow) -> StageVerdict {
        let mut stack = [0.0; EMA_STACK.len()];
        for (slot, col) in stack.iter_mut().zip(EMA_STACK) {
            match require(row, col) {
                Ok(v) => *slot = v,
                Err(reason) => return StageVerdict::Rejected(reason),
            }
        }
        if self.rules.stack_holds(&stack) {
            StageVerdict::Passed
        } else {
            StageVerdict::Rejected(super::RejectReason::StackBroken)
        }
    }
}
