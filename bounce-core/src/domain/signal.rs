//! Trade metadata attached to surviving candidates.

use serde::{Deserialize, Serialize};

use super::direction::Direction;
use super::row::CandidateRow;

/// Direction label and price targets for one candidate.
///
/// Computed once by the enricher and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub direction: Direction,
    /// "Bullish" or "Bearish".
    pub signal_direction: String,
    pub baseline: f64,
    pub volatility: f64,
    /// Baseline ± 2 volatility units.
    pub target_conservative: f64,
    /// Baseline ± 3 volatility units.
    pub target_stretch: f64,
}

/// A row that survived every stage, paired with its signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedCandidate {
    pub row: CandidateRow,
    pub signal: Signal,
}

impl EnrichedCandidate {
    pub fn symbol(&self) -> &str {
        &self.row.symbol
    }
}
