//! Saved candidate tables and a provider that replays them.
//!
//! Filtering is deterministic given the same fetched table, so a snapshot
//! lets a run be reproduced (or its sink step retried) without touching the
//! network. Replay re-evaluates the query's numeric predicates against the
//! stored rows, so a snapshot taken under one configuration can be replayed
//! under another. Text predicates (type, exchange) cannot be checked locally
//! and are assumed to hold.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::CandidateTable;
use crate::query::ScanQuery;

use super::{CandidateProvider, RemoteQueryError};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid snapshot {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A fetched table plus when and where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub captured_at: DateTime<Utc>,
    pub provider: String,
    pub table: CandidateTable,
}

impl Snapshot {
    pub fn new(captured_at: DateTime<Utc>, provider: impl Into<String>, table: CandidateTable) -> Self {
        Self {
            captured_at,
            provider: provider.into(),
            table,
        }
    }

    /// Write as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), SnapshotError> {
        let io = |source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| SnapshotError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(io)
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let text = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| SnapshotError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Replays a saved [`Snapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotProvider {
    snapshot: Snapshot,
}

impl SnapshotProvider {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_file(path: &Path) -> Result<Self, SnapshotError> {
        let snapshot = Snapshot::load(path)?;
        info!(
            path = %path.display(),
            rows = snapshot.table.len(),
            captured_at = %snapshot.captured_at,
            "loaded snapshot"
        );
        Ok(Self::new(snapshot))
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

impl CandidateProvider for SnapshotProvider {
    fn name(&self) -> &str {
        "snapshot"
    }

    fn fetch(&self, query: &ScanQuery) -> Result<CandidateTable, RemoteQueryError> {
        let table = &self.snapshot.table;
        let matching: Vec<_> = table
            .rows()
            .iter()
            .filter(|row| {
                query
                    .predicates()
                    .iter()
                    .all(|p| p.matches(row) != Some(false))
            })
            .collect();
        debug!(
            stored = table.len(),
            matching = matching.len(),
            "re-applied query predicates to snapshot"
        );

        let total = matching.len();
        let rows = matching.into_iter().take(query.limit()).cloned().collect();
        Ok(CandidateTable::new(rows, total))
    }
}
