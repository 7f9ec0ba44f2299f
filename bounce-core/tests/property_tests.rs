//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify, for random candidate tables:
//! 1. Stage counts never grow
//! 2. Every survivor sits inside the action zone
//! 3. Every survivor's moving-average stack is ordered for its direction
//! 4. No survivor has earnings inside the blackout window
//! 5. Targets sit on the direction's side of the baseline, stretch beyond conservative
//! 6. Running twice on the same table gives the same result
//! 7. Rows with a broken stack never survive

use bounce_core::domain::{CandidateRow, CandidateTable, Column, Direction, EMA_STACK};
use bounce_core::{process, ScanConfig};
use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use proptest::strategy::ValueTree;
use proptest::test_runner::TestRunner;

fn scan_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 13, 15, 30, 0).unwrap()
}

/// A permissive config: trigger level in the middle of the momentum range.
fn config(direction: Direction) -> ScanConfig {
    ScanConfig {
        trigger_long: 50.0,
        trigger_short: 50.0,
        ..ScanConfig::for_direction(direction)
    }
}

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Long), Just(Direction::Short)]
}

/// EMA8..EMA89 strictly ordered for `direction`, centred on an EMA21 near 100.
fn arb_ordered_stack(direction: Direction) -> impl Strategy<Value = [f64; 5]> {
    (97.0..103.0_f64, prop::array::uniform4(0.05..1.5_f64)).prop_map(move |(ema21, gaps)| {
        let sign = direction.sign();
        let ema8 = ema21 + sign * gaps[0];
        let ema34 = ema21 - sign * gaps[1];
        let ema55 = ema34 - sign * gaps[2];
        let ema89 = ema55 - sign * gaps[3];
        [ema8, ema21, ema34, ema55, ema89]
    })
}

/// Independent draws; mostly unordered.
fn arb_unordered_stack() -> impl Strategy<Value = [f64; 5]> {
    prop::array::uniform5(96.0..104.0_f64)
}

/// (today, prior) momentum, drawn so the crossing fires for `direction` often.
fn arb_momentum(direction: Direction) -> impl Strategy<Value = (f64, f64)> {
    (40.0..100.0_f64, 0.0..60.0_f64).prop_map(move |(high, low)| match direction {
        Direction::Long => (high, low),
        Direction::Short => (low, high),
    })
}

fn build_row(
    index: usize,
    close: f64,
    stack: [f64; 5],
    atr: f64,
    (today, prior): (f64, f64),
    earnings: Option<i64>,
) -> CandidateRow {
    let mut row = CandidateRow::new(format!("NYSE:T{index}"))
        .with(Column::Close, close)
        .with(Column::Atr, atr)
        .with(Column::Momentum, today)
        .with(Column::MomentumPrev, prior);
    for (col, v) in EMA_STACK.iter().zip(stack) {
        row = row.with(*col, v);
    }
    if let Some(offset) = earnings {
        let at = scan_time() + Duration::seconds(offset);
        row = row.with(Column::EarningsNextDate, at.timestamp() as f64);
    }
    row
}

fn arb_row_with<S>(index: usize, direction: Direction, stack: S) -> impl Strategy<Value = CandidateRow>
where
    S: Strategy<Value = [f64; 5]>,
{
    (
        95.0..105.0_f64,
        stack,
        0.5..5.0_f64,
        arb_momentum(direction),
        prop::option::of(-30i64 * 86_400..45 * 86_400),
    )
        .prop_map(move |(close, stack, atr, momentum, earnings)| {
            build_row(index, close, stack, atr, momentum, earnings)
        })
}

/// A direction and a table of up to 40 rows whose stacks come from `make_stack`.
fn arb_case_with<F, S>(make_stack: F) -> impl Strategy<Value = (Direction, CandidateTable)>
where
    F: Fn(Direction) -> S + Copy + 'static,
    S: Strategy<Value = [f64; 5]> + 'static,
{
    arb_direction().prop_flat_map(move |direction| {
        (0usize..40).prop_flat_map(move |n| {
            let rows = (0..n)
                .map(|i| arb_row_with(i, direction, make_stack(direction)))
                .collect::<Vec<_>>();
            let table = rows.prop_map(|rows| {
                let n = rows.len();
                CandidateTable::new(rows, n)
            });
            (Just(direction), table)
        })
    })
}

/// Stacks ordered for the scanned direction.
fn arb_case() -> impl Strategy<Value = (Direction, CandidateTable)> {
    arb_case_with(arb_ordered_stack)
}

/// Stacks drawn independently of the direction.
fn arb_unordered_case() -> impl Strategy<Value = (Direction, CandidateTable)> {
    arb_case_with(|_| arb_unordered_stack())
}

// ── Invariants ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn stage_counts_never_grow((direction, table) in arb_case()) {
        let out = process(table, &config(direction), scan_time());
        prop_assert!(out.trail.is_monotonic());
        let last = out.trail.entries().last().unwrap();
        prop_assert_eq!(last.after, out.candidates.len());
    }

    #[test]
    fn survivors_are_inside_zone((direction, table) in arb_case()) {
        let out = process(table, &config(direction), scan_time());
        for c in &out.candidates {
            let close = c.row.get(Column::Close).unwrap();
            let gap = (close - c.signal.baseline).abs();
            prop_assert!(gap <= c.signal.volatility + 1e-9, "{} gap {gap}", c.symbol());
        }
    }

    #[test]
    fn survivors_have_ordered_stack((direction, table) in arb_unordered_case()) {
        let out = process(table, &config(direction), scan_time());
        for c in &out.candidates {
            let stack: Vec<f64> = EMA_STACK.iter().map(|col| c.row.get(*col).unwrap()).collect();
            for w in stack.windows(2) {
                match direction {
                    Direction::Long => prop_assert!(w[0] > w[1]),
                    Direction::Short => prop_assert!(w[0] < w[1]),
                }
            }
        }
    }

    #[test]
    fn broken_stack_never_survives(
        (direction, table) in arb_case(),
        swap in 0usize..EMA_STACK.len() - 1,
    ) {
        let rows = table
            .rows()
            .iter()
            .map(|row| {
                let a = row.get(EMA_STACK[swap]).unwrap();
                let b = row.get(EMA_STACK[swap + 1]).unwrap();
                row.clone().with(EMA_STACK[swap], b).with(EMA_STACK[swap + 1], a)
            })
            .collect::<Vec<_>>();
        let n = rows.len();
        let out = process(CandidateTable::new(rows, n), &config(direction), scan_time());
        prop_assert!(out.candidates.is_empty());
    }

    #[test]
    fn survivors_have_no_earnings_in_window((direction, table) in arb_case()) {
        let out = process(table, &config(direction), scan_time());
        let end = scan_time() + Duration::days(14);
        for c in &out.candidates {
            if let Some(date) = c.row.earnings_date() {
                prop_assert!(date < scan_time() || date >= end, "{} reports {date}", c.symbol());
            }
        }
    }

    #[test]
    fn targets_follow_direction((direction, table) in arb_case()) {
        let out = process(table, &config(direction), scan_time());
        for c in &out.candidates {
            let s = &c.signal;
            match direction {
                Direction::Long => {
                    prop_assert!(s.baseline <= s.target_conservative);
                    prop_assert!(s.target_conservative <= s.target_stretch);
                }
                Direction::Short => {
                    prop_assert!(s.baseline >= s.target_conservative);
                    prop_assert!(s.target_conservative >= s.target_stretch);
                }
            }
        }
    }

    #[test]
    fn pipeline_is_idempotent((direction, table) in arb_case()) {
        let cfg = config(direction);
        let first = process(table.clone(), &cfg, scan_time());
        let second = process(table, &cfg, scan_time());
        prop_assert_eq!(first, second);
    }
}

// ── Generator coverage ───────────────────────────────────────────────

/// The survivor properties above are only meaningful if survivors are common.
#[test]
fn ordered_cases_usually_produce_survivors() {
    let mut runner = TestRunner::deterministic();
    let strategy = arb_case();
    let cases = 256;
    let mut with_survivor = 0;
    for _ in 0..cases {
        let (direction, table) = strategy.new_tree(&mut runner).unwrap().current();
        if !process(table, &config(direction), scan_time()).candidates.is_empty() {
            with_survivor += 1;
        }
    }
    assert!(
        with_survivor * 2 >= cases,
        "only {with_survivor}/{cases} cases had a survivor"
    );
}
