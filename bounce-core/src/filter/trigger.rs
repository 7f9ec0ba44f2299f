//! Trigger confirmation stage.
//!
//! The momentum oscillator must have crossed the trigger level on the latest
//! bar: for Long, prior <= level < today; for Short, prior >= level > today.

use crate::domain::{CandidateRow, Column, DirectionRules};

use super::{require, FilterStage, RejectReason, StageVerdict};

#[derive(Debug, Clone)]
pub struct TriggerConfirmation {
    rules: DirectionRules,
}

impl TriggerConfirmation {
    pub fn new(rules: DirectionRules) -> Self {
        Self { rules }
    }
}

impl FilterStage for TriggerConfirmation {
    fn name(&self) -> &str {
        "trigger_confirmation"
    }

    fn evaluate(&self, row: &CandidateRow) -> StageVerdict {
        let today = match require(row, Column::Momentum) {
            Ok(v) => v,
            Err(reason) => return StageVerdict::Rejected(reason),
        };
        let prior = match require(row, Column::MomentumPrev) {
            Ok(v) => v,
            Err(reason) => return StageVerdict::Rejected(reason),
        };
        if self.rules.trigger_fired(today, prior) {
            StageVerdict::Passed
        } else {
            StageVerdict::Rejected(RejectReason::TriggerNotFired)
        }
    }
}
