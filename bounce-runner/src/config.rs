//! Scanner configuration file.
//!
//! A TOML document with three tables:
//!
//! ```toml
//! [scan]            # thresholds, see bounce_core::ScanConfig
//! direction = "long"
//!
//! [output]
//! type = "file"     # "log" | "file" | "webhook"
//! dir = "scans"
//!
//! [provider]        # see bounce_core::provider::TradingViewSettings
//! timeout_secs = 30
//! ```
//!
//! Every field has a default except the output target's own settings. When
//! `[output]` is absent the scan is written to the log. Errors here are raised
//! before any network I/O.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use bounce_core::provider::TradingViewSettings;
use bounce_core::{InvalidScanConfig, ScanConfig};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("missing required config field '{0}'")]
    MissingField(&'static str),

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("unknown output type '{0}' (expected log, file or webhook)")]
    UnknownOutputType(String),

    #[error(transparent)]
    InvalidScan(#[from] InvalidScanConfig),
}

/// Where the final table goes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutputConfig {
    /// One log line per candidate.
    #[default]
    Log,
    /// CSV file per run in `dir`.
    File { dir: PathBuf },
    /// JSON notification POSTed to `url`.
    Webhook { url: String },
}

impl OutputConfig {
    /// Build from loosely-typed parts, as read from a file or the command line.
    pub fn from_parts(
        kind: Option<&str>,
        dir: Option<PathBuf>,
        url: Option<String>,
    ) -> Result<Self, ConfigError> {
        match kind {
            None => Err(ConfigError::MissingField("output.type")),
            Some("log") => Ok(OutputConfig::Log),
            Some("file") => dir
                .map(|dir| OutputConfig::File { dir })
                .ok_or(ConfigError::MissingField("output.dir")),
            Some("webhook") => url
                .filter(|u| !u.trim().is_empty())
                .map(|url| OutputConfig::Webhook { url })
                .ok_or(ConfigError::MissingField("output.url")),
            Some(other) => Err(ConfigError::UnknownOutputType(other.to_string())),
        }
    }
}

/// `[output]` as written, before the type tag is checked.
#[derive(Debug, Default, Deserialize)]
struct RawOutput {
    #[serde(rename = "type")]
    kind: Option<String>,
    dir: Option<PathBuf>,
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    scan: ScanConfig,
    output: Option<RawOutput>,
    #[serde(default)]
    provider: TradingViewSettings,
}

/// Validated configuration for one scanner invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScannerConfig {
    pub scan: ScanConfig,
    pub output: OutputConfig,
    pub provider: TradingViewSettings,
}

impl ScannerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(content)?;
        let output = match raw.output {
            None => OutputConfig::default(),
            Some(o) => OutputConfig::from_parts(o.kind.as_deref(), o.dir, o.url)?,
        };
        let cfg = Self {
            scan: raw.scan,
            output,
            provider: raw.provider,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scan.validate()?;
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "provider.timeout_secs",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bounce_core::domain::Direction;

    #[test]
    fn empty_document_is_all_defaults() {
        let cfg = ScannerConfig::from_toml("").unwrap();
        assert_eq!(cfg, ScannerConfig::default());
        assert_eq!(cfg.output, OutputConfig::Log);
    }

    #[test]
    fn full_document() {
        let cfg = ScannerConfig::from_toml(
            r#"
            [scan]
            direction = "short"
            limit = 100
            relative_volume_floor = 1.5

            [scan.periods]
            stoch = 5

            [output]
            type = "file"
            dir = "out/scans"

            [provider]
            endpoint = "http://localhost:8080"
            timeout_secs = 10
            "#,
        )
        .unwrap();

        assert_eq!(cfg.scan.direction, Direction::Short);
        assert_eq!(cfg.scan.limit, 100);
        assert_eq!(cfg.scan.relative_volume_floor, Some(1.5));
        assert_eq!(cfg.scan.periods.stoch, 5);
        assert_eq!(cfg.scan.periods.adx, 14);
        assert_eq!(
            cfg.output,
            OutputConfig::File {
                dir: PathBuf::from("out/scans")
            }
        );
        assert_eq!(cfg.provider.timeout_secs, 10);
    }

    #[test]
    fn output_without_type_is_rejected() {
        let err = ScannerConfig::from_toml("[output]\ndir = \"x\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("output.type")));
    }

    #[test]
    fn file_output_needs_dir() {
        let err = ScannerConfig::from_toml("[output]\ntype = \"file\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("output.dir")));
    }

    #[test]
    fn webhook_output_needs_url() {
        let err = ScannerConfig::from_toml("[output]\ntype = \"webhook\"\nurl = \" \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("output.url")));
    }

    #[test]
    fn unknown_output_type() {
        let err = ScannerConfig::from_toml("[output]\ntype = \"sms\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownOutputType(t) if t == "sms"));
    }

    #[test]
    fn invalid_thresholds_are_rejected() {
        let err = ScannerConfig::from_toml("[scan]\nlimit = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidScan(InvalidScanConfig::ZeroLimit)
        ));
    }

    #[test]
    fn empty_market_list_is_rejected() {
        let err = ScannerConfig::from_toml("[scan]\nmarkets = []\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidScan(InvalidScanConfig::NoMarkets)
        ));
    }

    #[test]
    fn bad_toml_is_parse_error() {
        let err = ScannerConfig::from_toml("[scan\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScannerConfig::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
