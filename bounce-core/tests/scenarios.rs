//! End-to-end scenarios for the local pipeline over hand-built tables.

use bounce_core::domain::{CandidateRow, CandidateTable, Column, Direction};
use bounce_core::filter::zone::DIST_FROM_MEAN;
use bounce_core::{process, ScanConfig};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn scan_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 14, 0, 0).unwrap()
}

/// close=100, EMA21=100, ATR=2, stack ordered for Long, RSI(2) 9 -> 11.
fn long_setup(symbol: &str) -> CandidateRow {
    CandidateRow::new(symbol)
        .with(Column::Close, 100.0)
        .with(Column::Ema8, 101.0)
        .with(Column::Ema21, 100.0)
        .with(Column::Ema34, 99.0)
        .with(Column::Ema55, 98.0)
        .with(Column::Ema89, 97.0)
        .with(Column::Atr, 2.0)
        .with(Column::Momentum, 11.0)
        .with(Column::MomentumPrev, 9.0)
}

fn short_setup(symbol: &str) -> CandidateRow {
    CandidateRow::new(symbol)
        .with(Column::Close, 100.0)
        .with(Column::Ema8, 99.0)
        .with(Column::Ema21, 100.0)
        .with(Column::Ema34, 101.0)
        .with(Column::Ema55, 102.0)
        .with(Column::Ema89, 103.0)
        .with(Column::Atr, 2.0)
        .with(Column::Momentum, 89.0)
        .with(Column::MomentumPrev, 91.0)
}

fn table(rows: Vec<CandidateRow>) -> CandidateTable {
    let n = rows.len();
    CandidateTable::new(rows, n)
}

// ── Required scenarios ───────────────────────────────────────────────

#[test]
fn long_setup_survives_with_targets() {
    let cfg = ScanConfig::for_direction(Direction::Long);
    let out = process(table(vec![long_setup("NYSE:ABC")]), &cfg, scan_time());

    assert_eq!(out.candidates.len(), 1);
    let c = &out.candidates[0];
    assert_eq!(c.symbol(), "NYSE:ABC");
    assert_eq!(c.signal.target_conservative, 104.0);
    assert_eq!(c.signal.target_stretch, 106.0);
    assert_eq!(c.signal.signal_direction, "Bullish");
    assert_eq!(c.row.derived(DIST_FROM_MEAN), Some(0.0));
    assert!(out.integrity_drops.is_empty());
}

#[test]
fn earnings_five_days_out_leaves_no_survivors() {
    let cfg = ScanConfig::for_direction(Direction::Long);
    let row = long_setup("NYSE:ABC").with(
        Column::EarningsNextDate,
        (scan_time() + Duration::days(5)).timestamp() as f64,
    );
    let out = process(table(vec![row]), &cfg, scan_time());

    assert!(out.candidates.is_empty());
    let earnings = out.trail.get("earnings_exclusion").unwrap();
    assert_eq!((earnings.before, earnings.after), (1, 0));
}

#[test]
fn empty_remote_result_is_an_empty_scan() {
    let cfg = ScanConfig::for_direction(Direction::Long);
    let out = process(CandidateTable::empty(), &cfg, scan_time());

    assert!(out.candidates.is_empty());
    assert!(out.integrity_drops.is_empty());
    for entry in out.trail.entries() {
        assert_eq!((entry.before, entry.after), (0, 0), "stage {}", entry.stage);
    }
}

// ── Direction ────────────────────────────────────────────────────────

#[test]
fn short_setup_survives_with_targets_below_baseline() {
    let cfg = ScanConfig::for_direction(Direction::Short);
    let out = process(table(vec![short_setup("NASDAQ:XYZ")]), &cfg, scan_time());

    assert_eq!(out.candidates.len(), 1);
    let s = &out.candidates[0].signal;
    assert_eq!(s.signal_direction, "Bearish");
    assert_eq!(s.target_conservative, 96.0);
    assert_eq!(s.target_stretch, 94.0);
}

#[test]
fn long_setup_fails_a_short_scan() {
    let cfg = ScanConfig::for_direction(Direction::Short);
    let out = process(table(vec![long_setup("NYSE:ABC")]), &cfg, scan_time());
    assert!(out.candidates.is_empty());
    let stack = out.trail.get("stacking_confirmation").unwrap();
    assert_eq!(stack.dropped(), 1);
}

// ── Trail ────────────────────────────────────────────────────────────

#[test]
fn trail_names_each_stage_in_order() {
    let cfg = ScanConfig::default();
    let out = process(table(vec![long_setup("NYSE:A")]), &cfg, scan_time());
    let names: Vec<&str> = out.trail.entries().iter().map(|e| e.stage.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "fetched",
            "earnings_exclusion",
            "stacking_confirmation",
            "zone_membership",
            "trigger_confirmation",
            "enrichment"
        ]
    );
}

#[test]
fn each_stage_reports_its_own_drop() {
    let cfg = ScanConfig::default();
    let rows = vec![
        long_setup("NYSE:KEEP"),
        long_setup("NYSE:EARN").with(
            Column::EarningsNextDate,
            (scan_time() + Duration::days(1)).timestamp() as f64,
        ),
        long_setup("NYSE:STACK").with(Column::Ema8, 98.5),
        long_setup("NYSE:ZONE").with(Column::Close, 103.0),
        long_setup("NYSE:TRIG").with(Column::MomentumPrev, 12.0),
    ];
    let out = process(table(rows), &cfg, scan_time());

    let dropped: Vec<(String, usize)> = out
        .trail
        .entries()
        .iter()
        .map(|e| (e.stage.clone(), e.dropped()))
        .collect();
    assert_eq!(
        dropped,
        vec![
            ("fetched".to_string(), 0),
            ("earnings_exclusion".to_string(), 1),
            ("stacking_confirmation".to_string(), 1),
            ("zone_membership".to_string(), 1),
            ("trigger_confirmation".to_string(), 1),
            ("enrichment".to_string(), 0),
        ]
    );
    assert_eq!(out.candidates.len(), 1);
    assert_eq!(out.candidates[0].symbol(), "NYSE:KEEP");
}

#[test]
fn earnings_after_window_does_not_exclude() {
    let cfg = ScanConfig::default();
    let row = long_setup("NYSE:LATE").with(
        Column::EarningsNextDate,
        (scan_time() + Duration::days(14)).timestamp() as f64,
    );
    let out = process(table(vec![row]), &cfg, scan_time());
    assert_eq!(out.candidates.len(), 1);
}
