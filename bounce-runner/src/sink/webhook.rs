//! Webhook notification sink.
//!
//! POSTs `{"subject": ..., "message": ...}` as JSON. An empty table is not
//! published.

use std::time::Duration;

use serde::Serialize;
use tracing::info;

use super::{render_table, SignalSink, SinkError};
use crate::report::ScanReport;

#[derive(Debug, Serialize)]
struct Notification {
    subject: String,
    message: String,
}

pub struct WebhookSink {
    client: reqwest::blocking::Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Result<Self, SinkError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SinkError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    fn notification(report: &ScanReport) -> Notification {
        let meta = &report.metadata;
        Notification {
            subject: format!(
                "Bounce 2.0 {} scan {}: {} candidates",
                meta.direction,
                meta.scanned_at.format("%Y-%m-%d"),
                report.len()
            ),
            message: format!(
                "{}\n\nrun {}\n{}",
                render_table(report),
                meta.run_id,
                report.trail_summary()
            ),
        }
    }
}

impl SignalSink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    fn publish(&self, report: &ScanReport) -> Result<(), SinkError> {
        if report.is_empty() {
            info!(direction = %report.direction(), "no candidates, notification skipped");
            return Ok(());
        }

        let resp = self
            .client
            .post(&self.url)
            .json(&Self::notification(report))
            .send()
            .map_err(|e| SinkError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SinkError::HttpStatus {
                status: status.as_u16(),
            });
        }
        info!(candidates = report.len(), "notification published");
        Ok(())
    }
}
