//! CSV file sink: one file per direction per day.

use std::fs;
use std::path::PathBuf;

use tracing::info;

use bounce_core::domain::{Column, EnrichedCandidate, OUTPUT_COLUMNS};
use bounce_core::filter::zone::DIST_FROM_MEAN;

use super::{SignalSink, SinkError};
use crate::report::ScanReport;

pub struct CsvFileSink {
    dir: PathBuf,
}

impl CsvFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `bounce_scan_{direction}_{YYYYMMDD}.csv` inside the sink directory.
    pub fn path_for(&self, report: &ScanReport) -> PathBuf {
        self.dir.join(format!(
            "bounce_scan_{}_{}.csv",
            report.direction(),
            report.metadata.scanned_at.format("%Y%m%d")
        ))
    }

    fn header() -> Vec<String> {
        let mut h = vec!["symbol".to_string(), "name".to_string()];
        h.extend(OUTPUT_COLUMNS.iter().map(|c| c.key().to_string()));
        h.extend(
            [
                DIST_FROM_MEAN,
                "signal_direction",
                "target_conservative",
                "target_stretch",
            ]
            .map(String::from),
        );
        h
    }

    fn record(c: &EnrichedCandidate) -> Vec<String> {
        let mut r = vec![c.symbol().to_string(), c.row.name.clone().unwrap_or_default()];
        for col in OUTPUT_COLUMNS {
            let cell = match col {
                Column::EarningsNextDate => c
                    .row
                    .earnings_date()
                    .map(|d| d.format("%Y-%m-%d").to_string()),
                _ => c.row.get(col).map(|v| format!("{v:.6}")),
            };
            r.push(cell.unwrap_or_default());
        }
        r.push(
            c.row
                .derived(DIST_FROM_MEAN)
                .map(|v| format!("{v:.6}"))
                .unwrap_or_default(),
        );
        r.push(c.signal.signal_direction.clone());
        r.push(format!("{:.6}", c.signal.target_conservative));
        r.push(format!("{:.6}", c.signal.target_stretch));
        r
    }
}

impl SignalSink for CsvFileSink {
    fn name(&self) -> &str {
        "csv_file"
    }

    /// Writes the header even when there are no candidates.
    fn publish(&self, report: &ScanReport) -> Result<(), SinkError> {
        fs::create_dir_all(&self.dir).map_err(|source| SinkError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(report);

        let mut wtr = csv::Writer::from_path(&path)?;
        wtr.write_record(Self::header())?;
        for c in &report.candidates {
            wtr.write_record(Self::record(c))?;
        }
        wtr.flush().map_err(|source| SinkError::Io {
            path: path.clone(),
            source,
        })?;

        info!(path = %path.display(), rows = report.len(), "scan written");
        Ok(())
    }
}
