//! Provider capabilities and wire column names.
//!
//! Not every provider serves every indicator period. The query builder asks
//! for the configured periods and falls back to the provider's default
//! period (with a warning) when a period is not on the supported list.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

use crate::config::IndicatorPeriods;
use crate::domain::Column;

/// Indicators whose period is a provider capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    Adx,
    Stoch,
    Momentum,
}

impl Indicator {
    /// Period the provider uses for the bare column name.
    pub fn provider_default(self) -> u32 {
        14
    }

    fn wire_name(self, period: u32) -> String {
        match (self, period == self.provider_default()) {
            (Indicator::Adx, true) => "ADX".into(),
            (Indicator::Adx, false) => format!("ADX|{period}"),
            (Indicator::Stoch, true) => "Stoch.K".into(),
            (Indicator::Stoch, false) => format!("Stoch.K|{period}"),
            (Indicator::Momentum, true) => "RSI".into(),
            (Indicator::Momentum, false) => format!("RSI{period}"),
        }
    }
}

/// Indicator periods a provider can compute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderCapabilities {
    pub adx_periods: Vec<u32>,
    pub stoch_periods: Vec<u32>,
    pub momentum_periods: Vec<u32>,
}

impl Default for ProviderCapabilities {
    fn default() -> Self {
        Self {
            adx_periods: vec![14],
            stoch_periods: vec![14],
            momentum_periods: vec![2, 7, 14],
        }
    }
}

/// A requested period the provider cannot serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodFallback {
    pub indicator: Indicator,
    pub requested: u32,
    pub used: u32,
}

impl ProviderCapabilities {
    pub fn supports(&self, indicator: Indicator, period: u32) -> bool {
        let list = match indicator {
            Indicator::Adx => &self.adx_periods,
            Indicator::Stoch => &self.stoch_periods,
            Indicator::Momentum => &self.momentum_periods,
        };
        list.contains(&period)
    }

    /// Map requested periods onto supported ones.
    pub fn resolve(&self, requested: IndicatorPeriods) -> (IndicatorPeriods, Vec<PeriodFallback>) {
        let mut fallbacks = Vec::new();
        let mut pick = |indicator: Indicator, period: u32| {
            if self.supports(indicator, period) {
                period
            } else {
                let used = indicator.provider_default();
                fallbacks.push(PeriodFallback {
                    indicator,
                    requested: period,
                    used,
                });
                used
            }
        };
        let resolved = IndicatorPeriods {
            adx: pick(Indicator::Adx, requested.adx),
            stoch: pick(Indicator::Stoch, requested.stoch),
            momentum: pick(Indicator::Momentum, requested.momentum),
        };
        (resolved, fallbacks)
    }
}

/// Wire names for every [`Column`], fixed for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnNames {
    names: BTreeMap<Column, String>,
    periods: IndicatorPeriods,
    fallbacks: Vec<PeriodFallback>,
}

impl ColumnNames {
    /// Resolve names for the requested periods against `caps`.
    pub fn resolve(requested: IndicatorPeriods, caps: &ProviderCapabilities) -> Self {
        let (periods, fallbacks) = caps.resolve(requested);
        for fb in &fallbacks {
            warn!(
                indicator = ?fb.indicator,
                requested = fb.requested,
                used = fb.used,
                "provider does not serve requested indicator period, using its default"
            );
        }

        let momentum = Indicator::Momentum.wire_name(periods.momentum);
        let fixed: [(Column, String); 22] = [
            (Column::Name, "name".into()),
            (Column::Close, "close".into()),
            (Column::Sma200, "SMA200".into()),
            (Column::Ema8, "EMA8".into()),
            (Column::Ema21, "EMA21".into()),
            (Column::Ema34, "EMA34".into()),
            (Column::Ema55, "EMA55".into()),
            (Column::Ema89, "EMA89".into()),
            (Column::Atr, "ATR".into()),
            (Column::Adx, Indicator::Adx.wire_name(periods.adx)),
            (Column::StochK, Indicator::Stoch.wire_name(periods.stoch)),
            (Column::MomentumPrev, format!("{momentum}[1]")),
            (Column::Momentum, momentum),
            (Column::RelativeVolume, "relative_volume_10d_calc".into()),
            (Column::ChangePercent, "change".into()),
            (Column::EarningsNextDate, "earnings_release_next_date".into()),
            (Column::MarketCap, "market_cap_basic".into()),
            (Column::Volume, "volume".into()),
            (Column::AverageVolume30d, "average_volume_30d_calc".into()),
            (Column::Type, "type".into()),
            (Column::Subtype, "subtype".into()),
            (Column::Exchange, "exchange".into()),
        ];

        Self {
            names: fixed.into_iter().collect(),
            periods,
            fallbacks,
        }
    }

    pub fn name(&self, column: Column) -> &str {
        // Every variant is inserted in `resolve`.
        self.names.get(&column).map(String::as_str).unwrap_or_default()
    }

    /// Periods actually requested from the provider.
    pub fn periods(&self) -> IndicatorPeriods {
        self.periods
    }

    pub fn fallbacks(&self) -> &[PeriodFallback] {
        &self.fallbacks
    }
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self::resolve(IndicatorPeriods::default(), &ProviderCapabilities::default())
    }
}
