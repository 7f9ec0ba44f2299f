//! Criterion benchmarks for the scan hot paths.
//!
//! Benchmarks:
//! 1. Local pipeline (filter stages + enrichment) over synthetic tables
//! 2. Query construction and wire serialization

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use bounce_core::domain::{CandidateRow, CandidateTable, Column, Direction, EMA_STACK};
use bounce_core::query::{bounce_query, ProviderCapabilities};
use bounce_core::{process, ScanConfig};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_table(n: usize) -> CandidateTable {
    let rows = (0..n)
        .map(|i| {
            let base = 100.0 + (i as f64 * 0.37).sin() * 5.0;
            let mut row = CandidateRow::new(format!("NYSE:B{i}"))
                .with(Column::Close, base + (i as f64 * 0.11).cos() * 2.0)
                .with(Column::Atr, 1.5 + (i % 4) as f64 * 0.5)
                .with(Column::Momentum, (i * 7 % 100) as f64)
                .with(Column::MomentumPrev, (i * 13 % 100) as f64);
            for (k, col) in EMA_STACK.iter().enumerate() {
                let step = if i % 3 == 0 { 1.0 } else { -1.0 };
                row = row.with(*col, base + step * k as f64);
            }
            row
        })
        .collect();
    CandidateTable::new(rows, n)
}

// ── 1. Local pipeline ────────────────────────────────────────────────

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let scan_time = Utc.with_ymd_and_hms(2025, 3, 3, 14, 0, 0).unwrap();

    for n in [100usize, 500, 5_000] {
        let table = make_table(n);
        for direction in [Direction::Long, Direction::Short] {
            let cfg = ScanConfig::for_direction(direction);
            group.bench_with_input(
                BenchmarkId::new(direction.as_str(), n),
                &table,
                |b, table| b.iter(|| process(black_box(table.clone()), &cfg, scan_time)),
            );
        }
    }

    group.finish();
}

// ── 2. Query construction ────────────────────────────────────────────

fn bench_query(c: &mut Criterion) {
    let cfg = ScanConfig::default();
    let caps = ProviderCapabilities::default();
    let scan_time = Utc.with_ymd_and_hms(2025, 3, 3, 14, 0, 0).unwrap();

    c.bench_function("bounce_query_to_wire", |b| {
        b.iter(|| bounce_query(black_box(&cfg), scan_time, &caps).to_wire())
    });
}

criterion_group!(benches, bench_pipeline, bench_query);
criterion_main!(benches);
