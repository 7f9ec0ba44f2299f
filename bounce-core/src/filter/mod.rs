//! Local filter engine for the rules the remote scanner cannot evaluate.
//!
//! Each stage is a pure predicate over a single row. `FilterPipeline` runs
//! the stages in a fixed order, drops every row the moment it fails a stage,
//! and records a `(stage, before, after)` entry per stage in the trail.

pub mod earnings;
pub mod stacking;
pub mod trigger;
pub mod zone;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace};

use crate::config::ScanConfig;
use crate::domain::{CandidateRow, Column};

pub use earnings::EarningsExclusion;
pub use stacking::StackConfirmation;
pub use trigger::TriggerConfirmation;
pub use zone::ZoneMembership;

/// Why a stage dropped a row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    MissingColumn(Column),
    EarningsInWindow,
    StackBroken,
    OutsideZone,
    TriggerNotFired,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MissingColumn(c) => write!(f, "missing column {c}"),
            RejectReason::EarningsInWindow => f.write_str("earnings inside blackout window"),
            RejectReason::StackBroken => f.write_str("moving-average stack out of order"),
            RejectReason::OutsideZone => f.write_str("close outside action zone"),
            RejectReason::TriggerNotFired => f.write_str("momentum trigger did not fire"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StageVerdict {
    Passed,
    Rejected(RejectReason),
}

impl StageVerdict {
    pub fn is_passed(&self) -> bool {
        matches!(self, StageVerdict::Passed)
    }
}

/// One entry of the diagnostic trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    pub stage: String,
    pub before: usize,
    pub after: usize,
}

impl StageResult {
    pub fn new(stage: impl Into<String>, before: usize, after: usize) -> Self {
        Self {
            stage: stage.into(),
            before,
            after,
        }
    }

    pub fn dropped(&self) -> usize {
        self.before.saturating_sub(self.after)
    }
}

/// Ordered, append-only record of stage counts for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTrail(Vec<StageResult>);

impl StageTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: StageResult) {
        self.0.push(result);
    }

    pub fn entries(&self) -> &[StageResult] {
        &self.0
    }

    pub fn get(&self, stage: &str) -> Option<&StageResult> {
        self.0.iter().find(|r| r.stage == stage)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Counts never grow within a stage, and each stage starts from the
    /// previous stage's output.
    pub fn is_monotonic(&self) -> bool {
        self.0.iter().all(|r| r.after <= r.before)
            && self.0.windows(2).all(|w| w[1].before == w[0].after)
    }
}

/// A single local filter stage.
pub trait FilterStage: Send + Sync {
    /// Stage name as it appears in the trail (e.g. "zone_membership").
    fn name(&self) -> &str;

    fn evaluate(&self, row: &CandidateRow) -> StageVerdict;

    /// Append derived fields to a row that passed. Default: none.
    fn annotate(&self, _row: &mut CandidateRow) {}

    /// Filter a working set. Empty input comes back empty with `0 -> 0`.
    fn apply(&self, rows: Vec<CandidateRow>) -> (Vec<CandidateRow>, StageResult) {
        let before = rows.len();
        let kept: Vec<CandidateRow> = rows
            .into_iter()
            .filter_map(|mut row| match self.evaluate(&row) {
                StageVerdict::Passed => {
                    self.annotate(&mut row);
                    Some(row)
                }
                StageVerdict::Rejected(reason) => {
                    trace!(stage = self.name(), symbol = %row.symbol, %reason, "row dropped");
                    None
                }
            })
            .collect();
        let result = StageResult::new(self.name(), before, kept.len());
        (kept, result)
    }
}

/// Stages in their fixed run order.
pub struct FilterPipeline {
    stages: Vec<Box<dyn FilterStage>>,
}

impl FilterPipeline {
    pub fn new(stages: Vec<Box<dyn FilterStage>>) -> Self {
        Self { stages }
    }

    /// The Bounce 2.0 local stages: earnings exclusion, stacking
    /// confirmation, zone membership, trigger confirmation.
    pub fn bounce(cfg: &ScanConfig, scan_time: DateTime<Utc>) -> Self {
        let rules = cfg.rules();
        Self::new(vec![
            Box::new(EarningsExclusion::new(scan_time, cfg.earnings_window_days)),
            Box::new(StackConfirmation::new(rules)),
            Box::new(ZoneMembership::default()),
            Box::new(TriggerConfirmation::new(rules)),
        ])
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn run(&self, rows: Vec<CandidateRow>) -> (Vec<CandidateRow>, StageTrail) {
        let mut trail = StageTrail::new();
        let mut working = rows;
        for stage in &self.stages {
            let (kept, result) = stage.apply(working);
            debug!(
                stage = %result.stage,
                before = result.before,
                after = result.after,
                "filter stage complete"
            );
            trail.push(result);
            working = kept;
        }
        (working, trail)
    }
}

/// Read a column or reject with `MissingColumn`.
pub(crate) fn require(row: &CandidateRow, column: Column) -> Result<f64, RejectReason> {
    row.get(column).ok_or(RejectReason::MissingColumn(column))
}
