//! Structured predicates understood by the remote scanner.
//!
//! A predicate compares one column against a literal, another column, a set of
//! strings, or a numeric range. There is no arithmetic: anything of the form
//! `|a - b| <= c` has to run locally (see [`crate::filter`]).

use serde::{Deserialize, Serialize};

use crate::domain::{CandidateRow, Column, CompareOp};

/// Right-hand side of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Number(f64),
    Column(Column),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Compare { op: CompareOp, right: Operand },
    /// Text membership (`type`, `subtype`, `exchange`).
    InSet(Vec<String>),
    /// Reject values in `[low, high)`. Missing values pass.
    NotInRange { low: f64, high: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub left: Column,
    pub operation: Operation,
}

impl Predicate {
    pub fn compare(left: Column, op: CompareOp, value: f64) -> Self {
        Self {
            left,
            operation: Operation::Compare {
                op,
                right: Operand::Number(value),
            },
        }
    }

    pub fn compare_columns(left: Column, op: CompareOp, right: Column) -> Self {
        Self {
            left,
            operation: Operation::Compare {
                op,
                right: Operand::Column(right),
            },
        }
    }

    pub fn in_set<I, S>(left: Column, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            left,
            operation: Operation::InSet(values.into_iter().map(Into::into).collect()),
        }
    }

    pub fn not_in_range(left: Column, low: f64, high: f64) -> Self {
        Self {
            left,
            operation: Operation::NotInRange { low, high },
        }
    }

    /// Evaluate against a fetched row.
    ///
    /// Returns `None` for text predicates, since rows do not carry universe
    /// attributes. A comparison with a missing operand is `Some(false)`; a
    /// range exclusion with a missing value is `Some(true)`.
    pub fn matches(&self, row: &CandidateRow) -> Option<bool> {
        match &self.operation {
            Operation::InSet(_) => None,
            Operation::Compare { op, right } => {
                let lhs = row.get(self.left);
                let rhs = match right {
                    Operand::Number(v) => Some(*v),
                    Operand::Column(c) => row.get(*c),
                };
                Some(match (lhs, rhs) {
                    (Some(a), Some(b)) => op.holds(a, b),
                    _ => false,
                })
            }
            Operation::NotInRange { low, high } => Some(match row.get(self.left) {
                Some(v) => !(v >= *low && v < *high),
                None => true,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_comparison_reads_both_sides() {
        let p = Predicate::compare_columns(Column::Ema8, CompareOp::Gt, Column::Ema21);
        let row = CandidateRow::new("X")
            .with(Column::Ema8, 11.0)
            .with(Column::Ema21, 10.0);
        assert_eq!(p.matches(&row), Some(true));

        let missing = CandidateRow::new("X").with(Column::Ema8, 11.0);
        assert_eq!(p.matches(&missing), Some(false));
    }

    #[test]
    fn range_exclusion_is_half_open() {
        let p = Predicate::not_in_range(Column::EarningsNextDate, 100.0, 200.0);
        let at = |v: f64| CandidateRow::new("X").with(Column::EarningsNextDate, v);
        assert_eq!(p.matches(&at(99.0)), Some(true));
        assert_eq!(p.matches(&at(100.0)), Some(false));
        assert_eq!(p.matches(&at(199.0)), Some(false));
        assert_eq!(p.matches(&at(200.0)), Some(true));
        assert_eq!(p.matches(&CandidateRow::new("X")), Some(true));
    }

    #[test]
    fn text_predicates_are_remote_only() {
        let p = Predicate::in_set(Column::Exchange, ["NYSE", "NASDAQ"]);
        assert_eq!(p.matches(&CandidateRow::new("X")), None);
    }
}
