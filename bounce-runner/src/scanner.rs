//! Scan orchestrator: wires query builder, provider, local pipeline and sink.
//!
//! Entry points:
//! - `Scanner::scan_at()`: build query, fetch, filter, enrich. No output.
//! - `Scanner::run_at()`: `scan_at()` then publish to a sink.
//! - `scan_from_table()`: the local half over an already-fetched table. Used
//!   by replay and by tests.
//!
//! A failed fetch aborts the run before anything is published. A failed
//! publish returns the finished report inside the error so the caller can
//! retry just the sink.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use bounce_core::domain::CandidateTable;
use bounce_core::provider::{CandidateProvider, RemoteQueryError, Snapshot, SnapshotError};
use bounce_core::query::{bounce_query, ScanQuery};
use bounce_core::{process, InvalidScanConfig, ScanConfig};

use crate::report::{run_id, RunMetadata, ScanReport, SCHEMA_VERSION};
use crate::sink::{SignalSink, SinkError};

/// Errors from a scan run.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid scan configuration: {0}")]
    Config(#[from] InvalidScanConfig),

    #[error("remote query failed: {0}")]
    Remote(#[from] RemoteQueryError),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("cannot fingerprint run: {0}")]
    Fingerprint(#[from] serde_json::Error),

    #[error("sink '{sink}' failed after the scan completed: {source}")]
    Sink {
        sink: String,
        /// The finished report, ready for another publish attempt.
        report: Box<ScanReport>,
        #[source]
        source: SinkError,
    },
}

impl ScanError {
    /// The completed report, if the failure happened after filtering.
    pub fn report(&self) -> Option<&ScanReport> {
        match self {
            ScanError::Sink { report, .. } => Some(report.as_ref()),
            _ => None,
        }
    }
}

pub struct Scanner<P> {
    provider: P,
    config: ScanConfig,
    snapshot_path: Option<PathBuf>,
}

impl<P: CandidateProvider> Scanner<P> {
    pub fn new(provider: P, config: ScanConfig) -> Result<Self, InvalidScanConfig> {
        config.validate()?;
        Ok(Self {
            provider,
            config,
            snapshot_path: None,
        })
    }

    /// Save every fetched table to `path` before filtering.
    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The remote query this scanner would send at `scan_time`.
    pub fn query_at(&self, scan_time: DateTime<Utc>) -> ScanQuery {
        bounce_query(&self.config, scan_time, &self.provider.capabilities())
    }

    pub fn scan(&self) -> Result<ScanReport, ScanError> {
        self.scan_at(Utc::now())
    }

    pub fn scan_at(&self, scan_time: DateTime<Utc>) -> Result<ScanReport, ScanError> {
        let query = self.query_at(scan_time);
        info!(
            provider = self.provider.name(),
            direction = %self.config.direction,
            predicates = query.predicates().len(),
            limit = query.limit(),
            "fetching candidates"
        );
        let table = self.provider.fetch(&query)?;

        if let Some(path) = &self.snapshot_path {
            Snapshot::new(scan_time, self.provider.name(), table.clone()).save(path)?;
            info!(path = %path.display(), "snapshot saved");
        }

        let mut report = scan_from_table(&self.config, self.provider.name(), scan_time, table)?;
        report.metadata.periods = query.names().periods();
        report.metadata.period_fallbacks = query.names().fallbacks().to_vec();
        Ok(report)
    }

    pub fn run(&self, sink: &dyn SignalSink) -> Result<ScanReport, ScanError> {
        self.run_at(Utc::now(), sink)
    }

    pub fn run_at(
        &self,
        scan_time: DateTime<Utc>,
        sink: &dyn SignalSink,
    ) -> Result<ScanReport, ScanError> {
        let report = self.scan_at(scan_time)?;
        publish(report, sink)
    }
}

/// Filter and enrich an already-fetched table.
///
/// The report records the configured indicator periods; [`Scanner::scan_at`]
/// overwrites them with what the provider actually served.
pub fn scan_from_table(
    config: &ScanConfig,
    provider: &str,
    scan_time: DateTime<Utc>,
    table: CandidateTable,
) -> Result<ScanReport, ScanError> {
    let run_id = run_id(config, scan_time, &table)?;
    let metadata = RunMetadata {
        schema_version: SCHEMA_VERSION,
        run_id,
        direction: config.direction,
        scanned_at: scan_time,
        provider: provider.to_string(),
        fetched: table.len(),
        total_matches: table.total_count,
        periods: config.periods,
        period_fallbacks: Vec::new(),
    };

    let outcome = process(table, config, scan_time);
    for entry in outcome.trail.entries() {
        info!(
            stage = %entry.stage,
            before = entry.before,
            after = entry.after,
            "stage"
        );
    }

    Ok(ScanReport {
        metadata,
        trail: outcome.trail,
        candidates: outcome.candidates,
        integrity_drops: outcome.integrity_drops,
    })
}

/// Hand a finished report to a sink. On failure the report comes back in the error.
pub fn publish(report: ScanReport, sink: &dyn SignalSink) -> Result<ScanReport, ScanError> {
    match sink.publish(&report) {
        Ok(()) => Ok(report),
        Err(source) => {
            warn!(sink = sink.name(), error = %source, "publish failed, report retained");
            Err(ScanError::Sink {
                sink: sink.name().to_string(),
                report: Box::new(report),
                source,
            })
        }
    }
}
