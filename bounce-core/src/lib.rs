//! Bounce Core: the scan domain.
//!
//! This crate contains everything between a scan configuration and a list of
//! trade candidates:
//! - Domain types (columns, candidate rows, direction rules, signals)
//! - Remote query builder with provider capability resolution
//! - Candidate provider trait, the HTTP scanner adapter and snapshot replay
//! - Local filter stages with a per-stage diagnostic trail
//! - Signal enrichment (direction label, volatility targets)

pub mod config;
pub mod domain;
pub mod enrich;
pub mod filter;
pub mod pipeline;
pub mod provider;
pub mod query;

pub use config::{IndicatorPeriods, InvalidScanConfig, ScanConfig};
pub use pipeline::{process, PipelineOutcome};
