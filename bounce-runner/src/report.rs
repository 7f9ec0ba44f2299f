//! Run report: what one scan produced and how it got there.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bounce_core::domain::{CandidateTable, Direction, EnrichedCandidate};
use bounce_core::enrich::DataIntegrityError;
use bounce_core::filter::StageTrail;
use bounce_core::query::PeriodFallback;
use bounce_core::{IndicatorPeriods, ScanConfig};

/// Current schema version for serialized reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Content-addressed identifier of a run.
pub type RunId = String;

/// Compute the run id: BLAKE3 over the scan config, the scan time and the
/// fetched table. Identical inputs give identical ids.
pub fn run_id(
    config: &ScanConfig,
    scanned_at: DateTime<Utc>,
    table: &CandidateTable,
) -> Result<RunId, serde_json::Error> {
    let mut hasher = blake3::Hasher::new();
    serde_json::to_writer(&mut hasher, config)?;
    hasher.update(scanned_at.to_rfc3339().as_bytes());
    serde_json::to_writer(&mut hasher, table)?;
    Ok(hasher.finalize().to_hex().to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub direction: Direction,
    pub scanned_at: DateTime<Utc>,
    /// Provider that produced the fetched table.
    pub provider: String,
    /// Rows returned by the provider.
    pub fetched: usize,
    /// Total matches the provider reported before the limit.
    pub total_matches: usize,
    /// Indicator periods the query actually requested.
    #[serde(default)]
    pub periods: IndicatorPeriods,
    /// Requested periods the provider could not serve.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub period_fallbacks: Vec<PeriodFallback>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Everything a sink needs, and everything needed to retry a sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub metadata: RunMetadata,
    pub trail: StageTrail,
    pub candidates: Vec<EnrichedCandidate>,
    pub integrity_drops: Vec<DataIntegrityError>,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn direction(&self) -> Direction {
        self.metadata.direction
    }

    /// One line per stage: `name: before -> after`.
    pub fn trail_summary(&self) -> String {
        self.trail
            .entries()
            .iter()
            .map(|e| format!("{}: {} -> {}", e.stage, e.before, e.after))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bounce_core::domain::{CandidateRow, Column};
    use chrono::TimeZone;

    fn t() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 3, 14, 0, 0).unwrap()
    }

    fn table(close: f64) -> CandidateTable {
        CandidateTable::new(vec![CandidateRow::new("NYSE:A").with(Column::Close, close)], 1)
    }

    #[test]
    fn run_id_is_deterministic() {
        let cfg = ScanConfig::default();
        assert_eq!(
            run_id(&cfg, t(), &table(1.0)).unwrap(),
            run_id(&cfg, t(), &table(1.0)).unwrap()
        );
    }

    #[test]
    fn run_id_changes_with_any_input() {
        let cfg = ScanConfig::default();
        let base = run_id(&cfg, t(), &table(1.0)).unwrap();
        assert_ne!(base, run_id(&cfg, t(), &table(2.0)).unwrap());
        assert_ne!(
            base,
            run_id(&cfg, t() + chrono::Duration::seconds(1), &table(1.0)).unwrap()
        );
        let short = ScanConfig::for_direction(Direction::Short);
        assert_ne!(base, run_id(&short, t(), &table(1.0)).unwrap());
        assert_eq!(base.len(), 64);
    }
}
