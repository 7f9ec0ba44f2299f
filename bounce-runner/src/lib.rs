//! Bounce Runner: scan orchestration, configuration, reports, sinks.
//!
//! This crate builds on `bounce-core` to provide:
//! - TOML scanner configuration with output selection
//! - The orchestrator (query, fetch, filter, enrich, publish)
//! - Content-addressed run reports
//! - CSV file, log and webhook sinks
//! - Logging initialisation for the binary

pub mod config;
pub mod logging;
pub mod report;
pub mod scanner;
pub mod sink;

pub use config::{ConfigError, OutputConfig, ScannerConfig};
pub use logging::init_logging;
pub use report::{run_id, RunId, RunMetadata, ScanReport};
pub use scanner::{publish, scan_from_table, ScanError, Scanner};
pub use sink::{build_sink, CsvFileSink, LogSink, SignalSink, SinkError, WebhookSink};
