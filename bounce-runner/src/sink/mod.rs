//! Output sinks.
//!
//! A sink receives the finished [`ScanReport`] and either persists it (CSV
//! file) or formats and publishes it (log, webhook). A sink failure never
//! loses the report: the orchestrator hands it back with the error so only
//! the publish step needs retrying.

pub mod csv_file;
pub mod log;
pub mod webhook;

use std::path::PathBuf;

use thiserror::Error;

use bounce_core::domain::{Column, EnrichedCandidate};
use bounce_core::filter::zone::DIST_FROM_MEAN;

use crate::config::OutputConfig;
use crate::report::ScanReport;

pub use csv_file::CsvFileSink;
pub use log::LogSink;
pub use webhook::WebhookSink;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("notification transport failed: {0}")]
    Transport(String),

    #[error("notification endpoint returned HTTP {status}")]
    HttpStatus { status: u16 },
}

/// Destination for a finished scan.
pub trait SignalSink: Send + Sync {
    fn name(&self) -> &str;

    fn publish(&self, report: &ScanReport) -> Result<(), SinkError>;
}

/// Construct the sink an output config names.
pub fn build_sink(output: &OutputConfig) -> Result<Box<dyn SignalSink>, SinkError> {
    Ok(match output {
        OutputConfig::Log => Box::new(LogSink),
        OutputConfig::File { dir } => Box::new(CsvFileSink::new(dir.clone())),
        OutputConfig::Webhook { url } => Box::new(WebhookSink::new(url.clone())?),
    })
}

/// Plain-text rendering of the candidate table, shared by the text sinks.
pub fn render_table(report: &ScanReport) -> String {
    let mut out = format!(
        "{:<16} {:>10} {:>10} {:>8} {:>8} {:>12} {:>12}\n",
        "symbol", "close", "ema21", "atr", "dist", "target_2x", "target_3x"
    );
    for c in &report.candidates {
        out.push_str(&render_line(c));
        out.push('\n');
    }
    out
}

fn render_line(c: &EnrichedCandidate) -> String {
    let num = |v: Option<f64>| v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into());
    format!(
        "{:<16} {:>10} {:>10} {:>8} {:>8} {:>12.2} {:>12.2}",
        c.symbol(),
        num(c.row.get(Column::Close)),
        num(Some(c.signal.baseline)),
        num(Some(c.signal.volatility)),
        num(c.row.derived(DIST_FROM_MEAN)),
        c.signal.target_conservative,
        c.signal.target_stretch,
    )
}
