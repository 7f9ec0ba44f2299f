//! Candidate provider trait and structured error types.
//!
//! A provider executes a [`ScanQuery`] and returns the matching rows. The
//! HTTP scanner and the snapshot replayer implement the same trait so the
//! orchestrator never knows which one it is talking to, and tests can swap in
//! a fake.

pub mod snapshot;
pub mod tradingview;

use thiserror::Error;

use crate::domain::CandidateTable;
use crate::query::{ProviderCapabilities, ScanQuery};

pub use snapshot::{Snapshot, SnapshotError, SnapshotProvider};
pub use tradingview::{TradingViewProvider, TradingViewSettings};

/// Remote fetch failed. Fatal to the run: nothing is filtered or published.
#[derive(Debug, Error)]
pub enum RemoteQueryError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("provider returned HTTP {status}: {detail}")]
    HttpStatus { status: u16, detail: String },

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("HTTP client error: {0}")]
    Client(String),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// A source of candidate rows.
pub trait CandidateProvider: Send + Sync {
    /// Short identifier recorded in run metadata.
    fn name(&self) -> &str;

    /// Indicator periods this provider can serve. The query builder falls
    /// back to provider defaults for anything not listed.
    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities::default()
    }

    /// Execute the query. An empty table is a valid answer.
    fn fetch(&self, query: &ScanQuery) -> Result<CandidateTable, RemoteQueryError>;
}

impl<P: CandidateProvider + ?Sized> CandidateProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn capabilities(&self) -> ProviderCapabilities {
        (**self).capabilities()
    }

    fn fetch(&self, query: &ScanQuery) -> Result<CandidateTable, RemoteQueryError> {
        (**self).fetch(query)
    }
}

impl<P: CandidateProvider + ?Sized> CandidateProvider for &P {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn capabilities(&self) -> ProviderCapabilities {
        (**self).capabilities()
    }

    fn fetch(&self, query: &ScanQuery) -> Result<CandidateTable, RemoteQueryError> {
        (**self).fetch(query)
    }
}
