//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. Indicator bounds — RSI and ADX stay in [0, 100] where defined
//! 2. Neutral fill — resolved indicators are always finite
//! 3. Warm-up gate — no BUY/SELL before max(ema_span, rsi_period)
//! 4. Backtest lag — position[i] is the position of signal[i-1]
//! 5. Determinism — identical inputs give identical signals and backtests

use chrono::NaiveDate;
use proptest::prelude::*;
use signallab_core::backtest::run_backtest;
use signallab_core::domain::{Bar, PriceSeries, Signal};
use signallab_core::indicators::{IndicatorFrame, IndicatorParams};
use signallab_core::signals::{generate_signals, ExternalSignals, ThresholdConfig};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-0.05..0.05_f64, 1..120).prop_map(|changes| {
        let mut price = 100.0;
        changes
            .into_iter()
            .map(|c| {
                price = (price * (1.0 + c)).max(1.0);
                (price * 100.0).round() / 100.0
            })
            .collect()
    })
}

fn arb_external() -> impl Strategy<Value = ExternalSignals> {
    (
        prop::option::of(0u8..=100),
        prop::option::of(0.0..40.0_f64),
        prop::option::of(0.3..2.5_f64),
    )
        .prop_map(|(ai, vix, pcr)| ExternalSignals {
            ai_sentiment: ai,
            volatility_estimate: vix,
            put_call_ratio: pcr,
        })
}

fn frame(closes: &[f64]) -> IndicatorFrame {
    let base = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) * 1.01,
                low: open.min(close) * 0.99,
                close,
                volume: 1000,
            }
        })
        .collect();
    let series = PriceSeries::new("PROP", bars).unwrap();
    IndicatorFrame::compute(series, IndicatorParams::default())
}

// ── 1–2. Indicators ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn oscillators_bounded(closes in arb_closes()) {
        let f = frame(&closes);
        for &v in f.rsi().iter().chain(f.adx()) {
            prop_assert!(v.is_nan() || (0.0..=100.0).contains(&v), "out of range: {v}");
        }
        prop_assert_eq!(f.ema().len(), closes.len());
    }

    #[test]
    fn resolved_is_finite(closes in arb_closes()) {
        for bar in frame(&closes).resolved() {
            prop_assert!(bar.ema.is_finite());
            prop_assert!(bar.rsi.is_finite());
            prop_assert!(bar.adx.is_finite());
        }
    }
}

// ── 3–5. Signals and backtest ────────────────────────────────────────

proptest! {
    #[test]
    fn warmup_is_hold(closes in arb_closes(), ext in arb_external()) {
        let s = generate_signals(frame(&closes), &ext, &ThresholdConfig::default());
        let warmup = IndicatorParams::default().warmup_bars().min(s.len());
        prop_assert!(s.signals()[..warmup].iter().all(|sig| *sig == Signal::Hold));
        prop_assert_eq!(s.len(), closes.len());
    }

    #[test]
    fn position_lags_signal(closes in arb_closes(), ext in arb_external()) {
        let s = generate_signals(frame(&closes), &ext, &ThresholdConfig::default());
        let r = run_backtest(&s);
        prop_assert_eq!(r.position.len(), s.len());
        prop_assert_eq!(r.position[0], 0);
        if s.len() >= 2 {
            for i in 1..s.len() {
                prop_assert_eq!(r.position[i], s.signals()[i - 1].position());
            }
        } else {
            prop_assert_eq!(r.total_return, 0.0);
        }
    }

    #[test]
    fn pipeline_deterministic(closes in arb_closes(), ext in arb_external()) {
        let thresholds = ThresholdConfig::default();
        let a = generate_signals(frame(&closes), &ext, &thresholds);
        let b = generate_signals(frame(&closes), &ext, &thresholds);
        prop_assert_eq!(a.signals(), b.signals());
        prop_assert_eq!(run_backtest(&a), run_backtest(&b));
    }
}
