//! Criterion benchmarks for dojiback hot paths.
//!
//! Benchmarks:
//! 1. Indicator precompute (Heiken-Ashi + EMA single pass)
//! 2. Full backtest over a series with regularly planted entries

use chrono::{Duration, FixedOffset, TimeZone};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use dojiback_core::domain::{Bar, Direction, Outcome};
use dojiback_core::engine::{run_backtest, EngineConfig};
use dojiback_core::indicators::IndicatorSet;
use dojiback_core::scenario::ScenarioBuilder;

// ── Helpers ──────────────────────────────────────────────────────────

/// Roughly `n` bars: a long warm-up trend, then entry/resolve cycles.
fn make_bars(n: usize) -> Vec<Bar> {
    let start = FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2020, 1, 2, 9, 15, 0)
        .unwrap();
    let mut b = ScenarioBuilder::new(start, Duration::minutes(1)).trend(Direction::Long, 150, 1.0);
    let mut win = true;
    while b.len() < n {
        let outcome = if win { Outcome::Win } else { Outcome::Loss };
        b = b
            .entry(Direction::Long)
            .drift(10)
            .resolve(outcome)
            .trend(Direction::Long, 30, 1.0);
        win = !win;
    }
    b.build()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicators");
    for n in [1_000usize, 10_000, 100_000] {
        let bars = make_bars(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &bars, |bench, bars| {
            bench.iter(|| IndicatorSet::compute(black_box(bars), 100))
        });
    }
    group.finish();
}

fn bench_backtest(c: &mut Criterion) {
    let mut group = c.benchmark_group("backtest");
    let config = EngineConfig::default();
    for n in [1_000usize, 10_000, 100_000] {
        let bars = make_bars(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &bars, |bench, bars| {
            bench.iter(|| run_backtest(black_box(bars), &config))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_indicators, bench_backtest);
criterion_main!(benches);
