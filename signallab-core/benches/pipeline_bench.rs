//! Criterion benchmarks for the analysis hot path.
//!
//! Benchmarks:
//! 1. Indicator engine (EMA, RSI, ADX) per indicator and as a frame
//! 2. Signal engine over a precomputed frame
//! 3. Backtest over a signaled series
//! 4. Full pipeline: frame → signals → backtest

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use signallab_core::backtest::run_backtest;
use signallab_core::domain::{Bar, PriceSeries};
use signallab_core::indicators::{Adx, Ema, Indicator, IndicatorFrame, IndicatorParams, Rsi};
use signallab_core::signals::{generate_signals, ExternalSignals, ThresholdConfig};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0 + i as f64 * 0.02;
            let open = close - 0.3;
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 1_000_000 + (i as u64 % 500_000),
            }
        })
        .collect()
}

fn make_series(n: usize) -> PriceSeries {
    PriceSeries::new("BENCH", make_bars(n)).unwrap()
}

const BAR_COUNTS: [usize; 3] = [252, 1260, 2520];

// ── 1. Indicators ────────────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicators");

    for &bar_count in &BAR_COUNTS {
        let bars = make_bars(bar_count);
        let stack: Vec<Box<dyn Indicator>> = vec![
            Box::new(Ema::new(20)),
            Box::new(Rsi::new(14)),
            Box::new(Adx::new(14)),
        ];
        for indicator in &stack {
            group.bench_with_input(
                BenchmarkId::new(indicator.name(), bar_count),
                &bar_count,
                |b, _| b.iter(|| indicator.compute(black_box(&bars))),
            );
        }

        let series = make_series(bar_count);
        group.bench_with_input(BenchmarkId::new("frame", bar_count), &bar_count, |b, _| {
            b.iter(|| IndicatorFrame::compute(black_box(series.clone()), IndicatorParams::default()))
        });
    }

    group.finish();
}

// ── 2–3. Signals and backtest ────────────────────────────────────────

fn bench_signals_and_backtest(c: &mut Criterion) {
    let mut group = c.benchmark_group("signals_backtest");
    let external = ExternalSignals::new(70, 12.0, 1.2);
    let thresholds = ThresholdConfig::default();

    for &bar_count in &BAR_COUNTS {
        let frame = IndicatorFrame::compute(make_series(bar_count), IndicatorParams::default());
        group.bench_with_input(BenchmarkId::new("signals", bar_count), &bar_count, |b, _| {
            b.iter(|| generate_signals(black_box(frame.clone()), &external, &thresholds))
        });

        let signaled = generate_signals(frame.clone(), &external, &thresholds);
        group.bench_with_input(BenchmarkId::new("backtest", bar_count), &bar_count, |b, _| {
            b.iter(|| run_backtest(black_box(&signaled)))
        });
    }

    group.finish();
}

// ── 4. Full pipeline ─────────────────────────────────────────────────

fn bench_full_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let external = ExternalSignals::new(70, 12.0, 1.2);
    let thresholds = ThresholdConfig::default();

    for &bar_count in &BAR_COUNTS {
        let series = make_series(bar_count);
        group.bench_with_input(BenchmarkId::new("full", bar_count), &bar_count, |b, _| {
            b.iter(|| {
                let frame =
                    IndicatorFrame::compute(black_box(series.clone()), IndicatorParams::default());
                let signaled = generate_signals(frame, &external, &thresholds);
                run_backtest(&signaled)
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_indicators,
    bench_signals_and_backtest,
    bench_full_pipeline,
);
criterion_main!(benches);
