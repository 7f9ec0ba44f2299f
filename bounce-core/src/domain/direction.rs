//! Trade direction and the rule set it implies.
//!
//! Long and Short share every stage. What differs is captured here once: the
//! comparison used between adjacent moving averages, the pullback and trigger
//! thresholds, and the sign applied to target offsets. Stages and the query
//! builder consult `DirectionRules` instead of branching on the direction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scan direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Label written to the `signal_direction` field.
    pub fn label(self) -> &'static str {
        match self {
            Direction::Long => "Bullish",
            Direction::Short => "Bearish",
        }
    }

    /// Sign applied to target offsets from the baseline.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "long" | "bullish" => Ok(Direction::Long),
            "short" | "bearish" => Ok(Direction::Short),
            other => Err(format!("unknown direction '{other}' (expected long or short)")),
        }
    }
}

/// Binary comparison between two numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    /// Evaluate `lhs op rhs`. Any NaN operand fails.
    pub fn holds(self, lhs: f64, rhs: f64) -> bool {
        if lhs.is_nan() || rhs.is_nan() {
            return false;
        }
        match self {
            CompareOp::Gt => lhs > rhs,
            CompareOp::Ge => lhs >= rhs,
            CompareOp::Lt => lhs < rhs,
            CompareOp::Le => lhs <= rhs,
        }
    }

    /// The comparison that is true exactly when `self` is false (for non-NaN operands).
    pub fn negate(self) -> CompareOp {
        match self {
            CompareOp::Gt => CompareOp::Le,
            CompareOp::Ge => CompareOp::Lt,
            CompareOp::Lt => CompareOp::Ge,
            CompareOp::Le => CompareOp::Gt,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
        }
    }
}

/// A threshold check of the form `value op level`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub op: CompareOp,
    pub level: f64,
}

impl Threshold {
    pub fn holds(&self, value: f64) -> bool {
        self.op.holds(value, self.level)
    }
}

/// Everything that changes between a Long and a Short scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionRules {
    pub direction: Direction,
    /// Comparison required between each moving average and the next longer one.
    pub stack_op: CompareOp,
    /// Comparison required between close and the long-term regime average.
    pub regime_op: CompareOp,
    /// Pullback indicator condition (Stoch %K).
    pub pullback: Threshold,
    /// Level the momentum oscillator must cross.
    pub trigger_level: f64,
}

impl DirectionRules {
    pub fn new(direction: Direction, pullback_level: f64, trigger_level: f64) -> Self {
        match direction {
            Direction::Long => Self {
                direction,
                stack_op: CompareOp::Gt,
                regime_op: CompareOp::Gt,
                pullback: Threshold {
                    op: CompareOp::Le,
                    level: pullback_level,
                },
                trigger_level,
            },
            Direction::Short => Self {
                direction,
                stack_op: CompareOp::Lt,
                regime_op: CompareOp::Lt,
                pullback: Threshold {
                    op: CompareOp::Ge,
                    level: pullback_level,
                },
                trigger_level,
            },
        }
    }

    /// Condition on today's momentum value.
    pub fn trigger_today(&self) -> Threshold {
        let op = match self.direction {
            Direction::Long => CompareOp::Gt,
            Direction::Short => CompareOp::Lt,
        };
        Threshold {
            op,
            level: self.trigger_level,
        }
    }

    /// Condition on the prior bar's momentum value: it must not have crossed yet.
    pub fn trigger_prior(&self) -> Threshold {
        let today = self.trigger_today();
        Threshold {
            op: today.op.negate(),
            level: today.level,
        }
    }

    /// True when momentum crossed the trigger level between the prior bar and today.
    pub fn trigger_fired(&self, today: f64, prior: f64) -> bool {
        self.trigger_prior().holds(prior) && self.trigger_today().holds(today)
    }

    /// True when every adjacent pair of the stack (shortest period first)
    /// satisfies `stack_op`. An empty or single-element stack holds trivially.
    pub fn stack_holds(&self, stack: &[f64]) -> bool {
        stack.windows(2).all(|w| self.stack_op.holds(w[0], w[1]))
    }

    /// Signed offset of `multiple` volatility units from the baseline.
    pub fn target(&self, baseline: f64, volatility: f64, multiple: f64) -> f64 {
        baseline + self.direction.sign() * multiple * volatility
    }
}
