//! Domain types: columns, rows, direction rules, signals.

pub mod column;
pub mod direction;
pub mod row;
pub mod signal;

pub use column::{Column, BASELINE, EMA_STACK, OUTPUT_COLUMNS, VOLATILITY};
pub use direction::{CompareOp, Direction, DirectionRules, Threshold};
pub use row::{CandidateRow, CandidateTable};
pub use signal::{EnrichedCandidate, Signal};
