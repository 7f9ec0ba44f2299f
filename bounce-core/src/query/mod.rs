//! Remote query construction.

pub mod builder;
pub mod capabilities;
pub mod predicate;

pub use builder::{
    bounce_query, earnings_window, QueryBuilder, ScanQuery, Sort, SortOrder, REQUESTED_COLUMNS,
};
pub use capabilities::{ColumnNames, Indicator, PeriodFallback, ProviderCapabilities};
pub use predicate::{Operand, Operation, Predicate};
