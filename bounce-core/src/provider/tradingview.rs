//! TradingView screener provider.
//!
//! Posts the query's wire JSON to the scanner endpoint and reads back a
//! positional table: each data entry carries the ticker in `s` and the
//! requested column values in `d`, in the same order as the query's columns.
//! One attempt per fetch; a failed call aborts the run.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::domain::{CandidateRow, CandidateTable, Column};
use crate::query::{ProviderCapabilities, ScanQuery};

use super::{CandidateProvider, RemoteQueryError};

pub const DEFAULT_ENDPOINT: &str = "https://scanner.tradingview.com";

/// Connection settings, usually read from the `[provider]` config table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingViewSettings {
    pub endpoint: String,
    pub timeout_secs: u64,
    pub capabilities: ProviderCapabilities,
}

impl Default for TradingViewSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 30,
            capabilities: ProviderCapabilities::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScanResponse {
    #[serde(rename = "totalCount", default)]
    total_count: usize,
    #[serde(default)]
    data: Vec<ScanEntry>,
}

#[derive(Debug, Deserialize)]
struct ScanEntry {
    s: String,
    d: Vec<Value>,
}

pub struct TradingViewProvider {
    client: reqwest::blocking::Client,
    settings: TradingViewSettings,
}

impl TradingViewProvider {
    pub fn new(settings: TradingViewSettings) -> Result<Self, RemoteQueryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| RemoteQueryError::Client(e.to_string()))?;
        Ok(Self { client, settings })
    }

    /// Scanner URL for the query's first market.
    fn scan_url(&self, query: &ScanQuery) -> String {
        let market = query
            .markets()
            .first()
            .map(String::as_str)
            .unwrap_or("america");
        format!("{}/{market}/scan", self.settings.endpoint.trim_end_matches('/'))
    }

    /// Map the positional response onto candidate rows.
    fn parse_response(
        query: &ScanQuery,
        resp: ScanResponse,
    ) -> Result<CandidateTable, RemoteQueryError> {
        let columns = query.columns();
        let mut rows = Vec::with_capacity(resp.data.len());

        for entry in resp.data {
            if entry.d.len() != columns.len() {
                return Err(RemoteQueryError::MalformedResponse(format!(
                    "{}: expected {} values, got {}",
                    entry.s,
                    columns.len(),
                    entry.d.len()
                )));
            }

            let mut row = CandidateRow::new(entry.s.as_str());
            for (&column, value) in columns.iter().zip(entry.d) {
                row = match (column, value) {
                    (_, Value::Null) => row,
                    (Column::Name, Value::String(name)) => row.with_name(name),
                    (c, _) if c.is_text() => row,
                    (c, Value::Number(n)) => match n.as_f64() {
                        Some(v) => row.with(c, v),
                        None => row,
                    },
                    (c, other) => {
                        return Err(RemoteQueryError::MalformedResponse(format!(
                            "{}: column {c} is not numeric ({other})",
                            entry.s
                        )))
                    }
                };
            }
            rows.push(row);
        }

        let total = resp.total_count.max(rows.len());
        Ok(CandidateTable::new(rows, total))
    }
}

/// Seconds to wait when a 429 carries no usable `retry-after`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Map a non-success status onto the error the orchestrator sees.
///
/// `retry_after` is only read for 429; HTTP-date values fall back to the
/// default delay.
fn status_error(
    status: reqwest::StatusCode,
    retry_after: Option<&str>,
    body: &str,
) -> RemoteQueryError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = retry_after
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return RemoteQueryError::RateLimited { retry_after_secs };
    }
    RemoteQueryError::HttpStatus {
        status: status.as_u16(),
        detail: body.chars().take(200).collect(),
    }
}

impl CandidateProvider for TradingViewProvider {
    fn name(&self) -> &str {
        "tradingview"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        self.settings.capabilities.clone()
    }

    fn fetch(&self, query: &ScanQuery) -> Result<CandidateTable, RemoteQueryError> {
        let url = self.scan_url(query);
        debug!(%url, predicates = query.predicates().len(), "posting scan query");

        let resp = self
            .client
            .post(&url)
            .json(&query.to_wire())
            .send()
            .map_err(|e| {
                if e.is_connect() || e.is_timeout() {
                    RemoteQueryError::NetworkUnreachable(e.to_string())
                } else {
                    RemoteQueryError::Client(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let retry_after = resp
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let body = resp.text().unwrap_or_default();
            return Err(status_error(status, retry_after.as_deref(), &body));
        }

        let body: ScanResponse = resp
            .json()
            .map_err(|e| RemoteQueryError::MalformedResponse(e.to_string()))?;
        let table = Self::parse_response(query, body)?;
        info!(
            rows = table.len(),
            total = table.total_count,
            "scanner returned candidates"
        );
        Ok(table)
    }
}
