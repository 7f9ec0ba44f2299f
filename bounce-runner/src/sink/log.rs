//! Log sink: the table goes to the tracing output.

use tracing::info;

use bounce_core::domain::Column;

use super::{SignalSink, SinkError};
use crate::report::ScanReport;

pub struct LogSink;

impl SignalSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    fn publish(&self, report: &ScanReport) -> Result<(), SinkError> {
        let meta = &report.metadata;
        info!(
            run_id = %meta.run_id,
            direction = %meta.direction,
            scanned_at = %meta.scanned_at,
            candidates = report.len(),
            "scan results"
        );
        for c in &report.candidates {
            info!(
                symbol = c.symbol(),
                name = c.row.name.as_deref().unwrap_or(""),
                close = c.row.get(Column::Close),
                signal = %c.signal.signal_direction,
                target_conservative = c.signal.target_conservative,
                target_stretch = c.signal.target_stretch,
                "candidate"
            );
        }
        Ok(())
    }
}
