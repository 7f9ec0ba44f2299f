//! Signal enrichment for rows that survived every filter stage.
//!
//! Each survivor gets a direction label and two price targets measured in
//! volatility units from the baseline average. A row missing the baseline or
//! the volatility measure at this point is a data-integrity defect: it is
//! dropped with a warning and reported, never carried with an empty target.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::domain::{
    CandidateRow, Column, DirectionRules, EnrichedCandidate, Signal, BASELINE, VOLATILITY,
};
use crate::filter::StageResult;

/// Volatility multiple for the conservative target.
pub const CONSERVATIVE_MULTIPLE: f64 = 2.0;
/// Volatility multiple for the stretch target.
pub const STRETCH_MULTIPLE: f64 = 3.0;

/// A surviving row lacked a field the enricher needs.
#[derive(Debug, Clone, Error, PartialEq, Serialize, Deserialize)]
#[error("{symbol}: missing {column} at enrichment")]
pub struct DataIntegrityError {
    pub symbol: String,
    pub column: Column,
}

/// Output of one enrichment pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    pub candidates: Vec<EnrichedCandidate>,
    pub dropped: Vec<DataIntegrityError>,
    pub stage: StageResult,
}

/// Compute the signal for a single row.
pub fn signal_for(row: &CandidateRow, rules: &DirectionRules) -> Result<Signal, DataIntegrityError> {
    let missing = |column: Column| DataIntegrityError {
        symbol: row.symbol.clone(),
        column,
    };
    let baseline = row.get(BASELINE).ok_or_else(|| missing(BASELINE))?;
    let volatility = row.get(VOLATILITY).ok_or_else(|| missing(VOLATILITY))?;

    Ok(Signal {
        direction: rules.direction,
        signal_direction: rules.direction.label().to_string(),
        baseline,
        volatility,
        target_conservative: rules.target(baseline, volatility, CONSERVATIVE_MULTIPLE),
        target_stretch: rules.target(baseline, volatility, STRETCH_MULTIPLE),
    })
}

/// Enrich every row, keeping input order.
pub fn enrich(rows: Vec<CandidateRow>, rules: &DirectionRules) -> Enrichment {
    let before = rows.len();
    let mut candidates = Vec::with_capacity(before);
    let mut dropped = Vec::new();

    for row in rows {
        match signal_for(&row, rules) {
            Ok(signal) => candidates.push(EnrichedCandidate { row, signal }),
            Err(err) => {
                warn!(symbol = %err.symbol, column = %err.column, "dropping row: {err}");
                dropped.push(err);
            }
        }
    }

    let stage = StageResult::new("enrichment", before, candidates.len());
    Enrichment {
        candidates,
        dropped,
        stage,
    }
}
