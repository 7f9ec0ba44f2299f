//! Query descriptor and the Bounce 2.0 query builder.
//!
//! Predicates accumulate in a list and are frozen by a single `build` call.
//! Adding a second predicate on a column never replaces the first: the
//! provider receives both, and evaluates the list as a conjunction.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::ScanConfig;
use crate::domain::{Column, CompareOp, Direction, EMA_STACK};

use super::capabilities::{ColumnNames, ProviderCapabilities};
use super::predicate::{Operand, Operation, Predicate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub column: Column,
    pub order: SortOrder,
}

/// Immutable query descriptor handed to a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanQuery {
    markets: Vec<String>,
    predicates: Vec<Predicate>,
    columns: Vec<Column>,
    names: ColumnNames,
    sort: Option<Sort>,
    limit: usize,
}

impl ScanQuery {
    pub fn markets(&self) -> &[String] {
        &self.markets
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// All predicates whose left-hand side is `column`.
    pub fn predicates_on(&self, column: Column) -> Vec<&Predicate> {
        self.predicates
            .iter()
            .filter(|p| p.left == column)
            .collect()
    }

    /// Requested columns, in the order the provider returns them.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn names(&self) -> &ColumnNames {
        &self.names
    }

    pub fn sort(&self) -> Option<Sort> {
        self.sort
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Scanner wire format.
    ///
    /// Provider range bounds are inclusive, so a half-open `[low, high)`
    /// exclusion is sent as `[low, high - 1]` over epoch seconds.
    pub fn to_wire(&self) -> Value {
        let filter: Vec<Value> = self
            .predicates
            .iter()
            .map(|p| {
                let left = self.names.name(p.left);
                match &p.operation {
                    Operation::Compare { op, right } => {
                        let right = match right {
                            Operand::Number(v) => json!(v),
                            Operand::Column(c) => json!(self.names.name(*c)),
                        };
                        json!({ "left": left, "operation": wire_op(*op), "right": right })
                    }
                    Operation::InSet(values) => {
                        json!({ "left": left, "operation": "in_range", "right": values })
                    }
                    Operation::NotInRange { low, high } => json!({
                        "left": left,
                        "operation": "not_in_range",
                        "right": [low, high - 1.0],
                    }),
                }
            })
            .collect();

        let columns: Vec<&str> = self.columns.iter().map(|c| self.names.name(*c)).collect();

        let mut body = json!({
            "markets": self.markets,
            "filter": filter,
            "columns": columns,
            "range": [0, self.limit],
            "options": { "lang": "en" },
        });
        if let Some(sort) = self.sort {
            body["sort"] = json!({
                "sortBy": self.names.name(sort.column),
                "sortOrder": match sort.order {
                    SortOrder::Asc => "asc",
                    SortOrder::Desc => "desc",
                },
            });
        }
        body
    }
}

fn wire_op(op: CompareOp) -> &'static str {
    match op {
        CompareOp::Gt => "greater",
        CompareOp::Ge => "egreater",
        CompareOp::Lt => "less",
        CompareOp::Le => "eless",
    }
}

/// Accumulates predicates and columns; `build` freezes them into a [`ScanQuery`].
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    markets: Vec<String>,
    predicates: Vec<Predicate>,
    columns: Vec<Column>,
    sort: Option<Sort>,
    limit: Option<usize>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn markets<I, S>(mut self, markets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.markets.extend(markets.into_iter().map(Into::into));
        self
    }

    /// Request columns. Duplicates are ignored; first-request order is kept.
    pub fn select<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = Column>,
    {
        for c in columns {
            if !self.columns.contains(&c) {
                self.columns.push(c);
            }
        }
        self
    }

    /// Add a predicate to the conjunction.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn sort_by(mut self, column: Column, order: SortOrder) -> Self {
        self.sort = Some(Sort { column, order });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn build(self, names: ColumnNames) -> ScanQuery {
        ScanQuery {
            markets: self.markets,
            predicates: self.predicates,
            columns: self.columns,
            names,
            sort: self.sort,
            limit: self.limit.unwrap_or(50),
        }
    }
}

/// Columns every Bounce query requests, whether or not they are filtered on.
pub const REQUESTED_COLUMNS: [Column; 19] = [
    Column::Name,
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
    Column::MarketCap,
    Column::Volume,
    Column::AverageVolume30d,
];

/// The earnings blackout `[scan_time, scan_time + days)` in epoch seconds.
pub fn earnings_window(scan_time: DateTime<Utc>, days: u32) -> (f64, f64) {
    let start = scan_time.timestamp();
    let end = (scan_time + Duration::days(i64::from(days))).timestamp();
    (start as f64, end as f64)
}

/// Translate a scan configuration into a remote query.
///
/// Every rule the provider can evaluate is sent as a predicate. Rules that
/// need arithmetic between columns stay local.
pub fn bounce_query(
    cfg: &ScanConfig,
    scan_time: DateTime<Utc>,
    caps: &ProviderCapabilities,
) -> ScanQuery {
    let rules = cfg.rules();
    let names = ColumnNames::resolve(cfg.periods, caps);

    let mut b = QueryBuilder::new()
        .markets(cfg.markets.iter().cloned())
        .select(REQUESTED_COLUMNS)
        .filter(Predicate::in_set(Column::Type, ["stock"]))
        .filter(Predicate::in_set(Column::Subtype, ["common"]))
        .filter(Predicate::in_set(Column::Exchange, cfg.exchanges.iter().cloned()))
        .filter(Predicate::compare(
            Column::MarketCap,
            CompareOp::Gt,
            cfg.market_cap_floor,
        ))
        .filter(Predicate::compare(
            Column::AverageVolume30d,
            CompareOp::Gt,
            cfg.average_volume_floor,
        ))
        .filter(Predicate::compare(
            Column::Adx,
            CompareOp::Ge,
            cfg.trend_strength_floor,
        ));

    if cfg.require_regime {
        b = b.filter(Predicate::compare_columns(
            Column::Close,
            rules.regime_op,
            Column::Sma200,
        ));
    }

    for pair in EMA_STACK.windows(2) {
        b = b.filter(Predicate::compare_columns(pair[0], rules.stack_op, pair[1]));
    }

    let today = rules.trigger_today();
    let prior = rules.trigger_prior();
    b = b
        .filter(Predicate::compare(
            Column::StochK,
            rules.pullback.op,
            rules.pullback.level,
        ))
        .filter(Predicate::compare(Column::Momentum, today.op, today.level))
        .filter(Predicate::compare(
            Column::MomentumPrev,
            prior.op,
            prior.level,
        ));

    if let Some(floor) = cfg.relative_volume_floor {
        b = b.filter(Predicate::compare(
            Column::RelativeVolume,
            CompareOp::Ge,
            floor,
        ));
    }
    if let Some(floor) = cfg.change_percent_floor {
        b = b.filter(match cfg.direction {
            Direction::Long => Predicate::compare(Column::ChangePercent, CompareOp::Ge, floor),
            Direction::Short => Predicate::compare(Column::ChangePercent, CompareOp::Le, -floor),
        });
    }

    let (low, high) = earnings_window(scan_time, cfg.earnings_window_days);
    b.filter(Predicate::not_in_range(Column::EarningsNextDate, low, high))
        .sort_by(Column::MarketCap, SortOrder::Desc)
        .limit(cfg.limit)
        .build(names)
}
