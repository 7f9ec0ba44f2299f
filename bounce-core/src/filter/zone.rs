//! Zone membership stage.
//!
//! Keeps rows with `|close - baseline| <= width * volatility`. This is the
//! cross-column rule the remote scanner cannot express. Survivors get the
//! distance appended as `dist_from_mean`.

use crate::domain::{CandidateRow, Column, BASELINE, VOLATILITY};

use super::{require, FilterStage, RejectReason, StageVerdict};

pub const DIST_FROM_MEAN: &str = "dist_from_mean";

/// Slack for values that land on the zone edge after float rounding.
const EDGE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct ZoneMembership {
    /// Zone half-width in volatility units.
    pub width: f64,
}

impl Default for ZoneMembership {
    fn default() -> Self {
        Self { width: 1.0 }
    }
}

impl ZoneMembership {
    fn distance(row: &CandidateRow) -> Result<(f64, f64), RejectReason> {
        let close = require(row, Column::Close)?;
        let baseline = require(row, BASELINE)?;
        let volatility = require(row, VOLATILITY)?;
        Ok(((close - baseline).abs(), volatility))
    }
}

impl FilterStage for ZoneMembership {
    fn name(&self) -> &str {
        "zone_membership"
    }

    fn evaluate(&self, row: &CandidateRow) -> StageVerdict {
        match Self::distance(row) {
            Ok((dist, vol)) if dist <= self.width * vol + EDGE_TOLERANCE => StageVerdict::Passed,
            Ok(_) => StageVerdict::Rejected(RejectReason::OutsideZone),
            Err(reason) => StageVerdict::Rejected(reason),
        }
    }

    fn annotate(&self, row: &mut CandidateRow) {
        if let Ok((dist, _)) = Self::distance(row) {
            row.append_derived(DIST_FROM_MEAN, dist);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(close: f64, ema21: f64, atr: f64) -> CandidateRow {
        CandidateRow::new("NYSE:CAT")
            .with(Column::Close, close)
            .with(Column::Ema21, ema21)
            .with(Column::Atr, atr)
    }

    #[test]
    fn boundary_is_inside() {
        // close 700, EMA21 670, ATR 30: distance equals one ATR.
        assert!(ZoneMembership::default().evaluate(&row(700.0, 670.0, 30.0)).is_passed());
    }

    #[test]
    fn just_outside_rejects() {
        let v = ZoneMembership::default().evaluate(&row(700.0, 670.0, 29.0));
        assert_eq!(v, StageVerdict::Rejected(RejectReason::OutsideZone));
    }

    #[test]
    fn below_baseline_counts_by_absolute_distance() {
        assert!(ZoneMembership::default().evaluate(&row(98.5, 100.0, 2.0)).is_passed());
        assert!(!ZoneMembership::default().evaluate(&row(97.0, 100.0, 2.0)).is_passed());
    }

    #[test]
    fn missing_atr_rejects() {
        let r = CandidateRow::new("NYSE:CAT")
            .with(Column::Close, 1.0)
            .with(Column::Ema21, 1.0);
        assert_eq!(
            ZoneMembership::default().evaluate(&r),
            StageVerdict::Rejected(RejectReason::MissingColumn(Column::Atr))
        );
    }

    #[test]
    fn survivors_carry_distance() {
        let (kept, result) = ZoneMembership::default().apply(vec![row(101.0, 100.0, 2.0)]);
        assert_eq!(result.after, 1);
        assert_eq!(kept[0].derived(DIST_FROM_MEAN), Some(1.0));
    }
}
