//! Logical scanner columns.
//!
//! Stages and the enricher address row fields through `Column`, never through
//! provider wire names. The mapping from a `Column` to the name the remote
//! scanner understands lives in [`crate::query::ColumnNames`], because some
//! names depend on which indicator periods the provider can serve.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A field of a candidate row, or a universe attribute used only in predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Name,
    Close,
    Sma200,
    Ema8,
    Ema21,
    Ema34,
    Ema55,
    Ema89,
    /// Average true range: the volatility measure.
    Atr,
    /// Average directional index: the trend-strength indicator.
    Adx,
    /// Stochastic %K: the pullback indicator.
    StochK,
    /// Short-period RSI for the current bar: the momentum trigger.
    Momentum,
    /// Short-period RSI one bar back.
    MomentumPrev,
    RelativeVolume,
    ChangePercent,
    /// Next scheduled earnings release, epoch seconds (UTC).
    EarningsNextDate,
    MarketCap,
    Volume,
    AverageVolume30d,
    Type,
    Subtype,
    Exchange,
}

/// The moving-average stack, shortest period first.
pub const EMA_STACK: [Column; 5] = [
    Column::Ema8,
    Column::Ema21,
    Column::Ema34,
    Column::Ema55,
    Column::Ema89,
];

/// The moving average that targets and the action zone are measured from.
pub const BASELINE: Column = Column::Ema21;

/// The volatility measure used for the zone width and target offsets.
pub const VOLATILITY: Column = Column::Atr;

/// Columns written to sinks, in output order.
pub const OUTPUT_COLUMNS: [Column; 15] = [
    Column::Close,
    Column::Sma200,
    Column::Ema8,
    Column::Ema21,
    Column::Ema34,
    Column::Ema55,
    Column::Ema89,
    Column::Atr,
    Column::Adx,
    Column::StochK,
    Column::Momentum,
    Column::MomentumPrev,
    Column::RelativeVolume,
    Column::ChangePercent,
    Column::EarningsNextDate,
];

impl Column {
    /// Whether values of this column are text rather than numbers.
    pub fn is_text(self) -> bool {
        matches!(
            self,
            Column::Name | Column::Type | Column::Subtype | Column::Exchange
        )
    }

    /// Stable snake_case key, used for CSV headers and logs.
    pub fn key(self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Close => "close",
            Column::Sma200 => "sma200",
            Column::Ema8 => "ema8",
            Column::Ema21 => "ema21",
            Column::Ema34 => "ema34",
            Column::Ema55 => "ema55",
            Column::Ema89 => "ema89",
            Column::Atr => "atr",
            Column::Adx => "adx",
            Column::StochK => "stoch_k",
            Column::Momentum => "momentum",
            Column::MomentumPrev => "momentum_prev",
            Column::RelativeVolume => "relative_volume",
            Column::ChangePercent => "change_percent",
            Column::EarningsNextDate => "earnings_next_date",
            Column::MarketCap => "market_cap",
            Column::Volume => "volume",
            Column::AverageVolume30d => "average_volume_30d",
            Column::Type => "type",
            Column::Subtype => "subtype",
            Column::Exchange => "exchange",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}
