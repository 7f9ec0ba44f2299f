//! Local half of a scan: filter stages then enrichment, over one fetched table.
//!
//! Pure with respect to its inputs. Running it twice on the same table, config
//! and scan time gives the same candidates and the same trail.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::ScanConfig;
use crate::domain::{CandidateTable, EnrichedCandidate};
use crate::enrich::{enrich, DataIntegrityError};
use crate::filter::{FilterPipeline, StageResult, StageTrail};

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutcome {
    pub candidates: Vec<EnrichedCandidate>,
    pub trail: StageTrail,
    pub integrity_drops: Vec<DataIntegrityError>,
}

/// Run the Bounce stages and the enricher over `table`.
pub fn process(table: CandidateTable, cfg: &ScanConfig, scan_time: DateTime<Utc>) -> PipelineOutcome {
    let fetched = table.len();
    let pipeline = FilterPipeline::bounce(cfg, scan_time);

    let mut trail = StageTrail::new();
    trail.push(StageResult::new("fetched", fetched, fetched));

    let (survivors, stages) = pipeline.run(table.into_rows());
    for entry in stages.entries() {
        trail.push(entry.clone());
    }

    let enrichment = enrich(survivors, &cfg.rules());
    trail.push(enrichment.stage);

    info!(
        direction = %cfg.direction,
        fetched,
        signals = enrichment.candidates.len(),
        integrity_drops = enrichment.dropped.len(),
        "local pipeline complete"
    );

    PipelineOutcome {
        candidates: enrichment.candidates,
        trail,
        integrity_drops: enrichment.dropped,
    }
}
