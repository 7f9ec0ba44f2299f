//! Earnings exclusion stage.
//!
//! Drops rows whose next earnings release falls in `[scan_time, scan_time + N days)`.
//! A row with no known earnings date passes.

use chrono::{DateTime, Duration, Utc};

use crate::domain::CandidateRow;

use super::{FilterStage, RejectReason, StageVerdict};

#[derive(Debug, Clone)]
pub struct EarningsExclusion {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
}

impl EarningsExclusion {
    pub fn new(scan_time: DateTime<Utc>, days: u32) -> Self {
        Self {
            window_start: scan_time,
            window_end: scan_time + Duration::days(i64::from(days)),
        }
    }

    pub fn in_window(&self, date: DateTime<Utc>) -> bool {
        date >= self.window_start && date < self.window_end
    }
}

impl FilterStage for EarningsExclusion {
    fn name(&self) -> &str {
        "earnings_exclusion"
    }

    fn evaluate(&self, row: &CandidateRow) -> StageVerdict {
        match row.earnings_date() {
            Some(date) if self.in_window(date) => {
                StageVerdict::Rejected(RejectReason::EarningsInWindow)
            }
            _ => StageVerdict::Passed,
        }
    }
}
