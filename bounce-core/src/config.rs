//! Scan configuration: direction, thresholds, limit.
//!
//! Defaults reproduce the Bounce 2.0 rule set. A `ScanConfig` is immutable for
//! the duration of a run; the orchestrator borrows it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Direction, DirectionRules};

/// Rejected scan configuration.
#[derive(Debug, Error, PartialEq)]
pub enum InvalidScanConfig {
    #[error("{field} must be a finite number (got {value})")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("limit must be at least 1")]
    ZeroLimit,

    #[error("earnings window must be at least 1 day")]
    ZeroEarningsWindow,

    #[error("at least one exchange is required")]
    NoExchanges,

    #[error("at least one market is required")]
    NoMarkets,

    #[error("indicator period for {indicator} must be at least 1")]
    ZeroPeriod { indicator: &'static str },
}

/// Indicator periods requested from the provider.
///
/// Whether the provider can actually serve a period is decided by the query
/// builder against [`crate::query::ProviderCapabilities`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorPeriods {
    pub adx: u32,
    pub stoch: u32,
    pub momentum: u32,
}

impl Default for IndicatorPeriods {
    fn default() -> Self {
        Self {
            adx: 14,
            stoch: 14,
            momentum: 2,
        }
    }
}

/// Thresholds and limits for one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub direction: Direction,
    pub market_cap_floor: f64,
    pub average_volume_floor: f64,
    /// Minimum ADX.
    pub trend_strength_floor: f64,
    /// Stoch %K ceiling for Long scans.
    pub pullback_long: f64,
    /// Stoch %K floor for Short scans.
    pub pullback_short: f64,
    /// Level momentum must cross upward for Long scans.
    pub trigger_long: f64,
    /// Level momentum must cross downward for Short scans.
    pub trigger_short: f64,
    pub earnings_window_days: u32,
    pub relative_volume_floor: Option<f64>,
    /// Minimum daily change in percent. Applied as `>= floor` for Long and
    /// `<= -floor` for Short.
    pub change_percent_floor: Option<f64>,
    /// Require close above (Long) or below (Short) the 200-day SMA.
    pub require_regime: bool,
    pub markets: Vec<String>,
    pub exchanges: Vec<String>,
    pub limit: usize,
    pub periods: IndicatorPeriods,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            direction: Direction::Long,
            market_cap_floor: 1_000_000_000.0,
            average_volume_floor: 500_000.0,
            trend_strength_floor: 20.0,
            pullback_long: 40.0,
            pullback_short: 60.0,
            trigger_long: 10.0,
            trigger_short: 90.0,
            earnings_window_days: 14,
            relative_volume_floor: None,
            change_percent_floor: None,
            require_regime: true,
            markets: vec!["america".into()],
            exchanges: vec!["NYSE".into(), "NASDAQ".into()],
            limit: 500,
            periods: IndicatorPeriods::default(),
        }
    }
}

impl ScanConfig {
    pub fn for_direction(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    /// The direction-dependent rule set for this configuration.
    pub fn rules(&self) -> DirectionRules {
        match self.direction {
            Direction::Long => {
                DirectionRules::new(Direction::Long, self.pullback_long, self.trigger_long)
            }
            Direction::Short => {
                DirectionRules::new(Direction::Short, self.pullback_short, self.trigger_short)
            }
        }
    }

    pub fn validate(&self) -> Result<(), InvalidScanConfig> {
        let finite = [
            ("market_cap_floor", self.market_cap_floor),
            ("average_volume_floor", self.average_volume_floor),
            ("trend_strength_floor", self.trend_strength_floor),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(InvalidScanConfig::NotFinite { field, value });
            }
        }
        if let Some(v) = self.relative_volume_floor {
            if !v.is_finite() {
                return Err(InvalidScanConfig::NotFinite {
                    field: "relative_volume_floor",
                    value: v,
                });
            }
        }
        if let Some(v) = self.change_percent_floor {
            if !v.is_finite() {
                return Err(InvalidScanConfig::NotFinite {
                    field: "change_percent_floor",
                    value: v,
                });
            }
        }

        // Oscillators are bounded to [0, 100].
        let bounded = [
            ("pullback_long", self.pullback_long),
            ("pullback_short", self.pullback_short),
            ("trigger_long", self.trigger_long),
            ("trigger_short", self.trigger_short),
            ("trend_strength_floor", self.trend_strength_floor),
        ];
        for (field, value) in bounded {
            if !(0.0..=100.0).contains(&value) {
                return Err(InvalidScanConfig::OutOfRange {
                    field,
                    value,
                    min: 0.0,
                    max: 100.0,
                });
            }
        }

        if self.limit == 0 {
            return Err(InvalidScanConfig::ZeroLimit);
        }
        if self.earnings_window_days == 0 {
            return Err(InvalidScanConfig::ZeroEarningsWindow);
        }
        if self.markets.is_empty() {
            return Err(InvalidScanConfig::NoMarkets);
        }
        if self.exchanges.is_empty() {
            return Err(InvalidScanConfig::NoExchanges);
        }
        for (indicator, period) in [
            ("adx", self.periods.adx),
            ("stoch", self.periods.stoch),
            ("momentum", self.periods.momentum),
        ] {
            if period == 0 {
                return Err(InvalidScanConfig::ZeroPeriod { indicator });
            }
        }
        Ok(())
    }
}
