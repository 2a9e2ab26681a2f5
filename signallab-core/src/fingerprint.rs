//! Input fingerprinting — a BLAKE3 digest of everything a run depends on.
//!
//! Two runs with the same fingerprint produce identical signals and backtests:
//! the signal engine and backtest are pure functions of these inputs.

use crate::domain::PriceSeries;
use crate::indicators::IndicatorParams;
use crate::signals::{ExternalSignals, ThresholdConfig};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputFingerprint(pub String);

impl InputFingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex characters, for display.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for InputFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn update_opt_f64(hasher: &mut blake3::Hasher, value: Option<f64>) {
    match value {
        Some(v) => {
            hasher.update(&[1]);
            hasher.update(&v.to_bits().to_le_bytes());
        }
        None => {
            hasher.update(&[0]);
        }
    }
}

pub fn fingerprint_inputs(
    series: &PriceSeries,
    params: &IndicatorParams,
    external: &ExternalSignals,
    thresholds: &ThresholdConfig,
) -> InputFingerprint {
    let mut hasher = blake3::Hasher::new();

    hasher.update(series.symbol().as_bytes());
    hasher.update(&(series.len() as u64).to_le_bytes());
    for bar in series.bars() {
        hasher.update(bar.date.to_string().as_bytes());
        for v in [bar.open, bar.high, bar.low, bar.close] {
            hasher.update(&v.to_bits().to_le_bytes());
        }
        hasher.update(&bar.volume.to_le_bytes());
    }

    for p in [params.ema_span, params.rsi_period, params.adx_period] {
        hasher.update(&(p as u64).to_le_bytes());
    }

    update_opt_f64(&mut hasher, external.ai_sentiment.map(f64::from));
    update_opt_f64(&mut hasher, external.volatility_estimate);
    update_opt_f64(&mut hasher, external.put_call_ratio);

    for t in [
        thresholds.ai_threshold,
        thresholds.vix_threshold,
        thresholds.pcr_threshold,
    ] {
        hasher.update(&t.to_bits().to_le_bytes());
    }

    InputFingerprint(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    fn series(closes: &[f64]) -> PriceSeries {
        PriceSeries::new("^NSEI", make_bars(closes)).unwrap()
    }

    #[test]
    fn deterministic() {
        let s = series(&[100.0, 101.0, 102.0]);
        let ext = ExternalSignals::new(70, 12.0, 1.2);
        let a = fingerprint_inputs(&s, &IndicatorParams::default(), &ext, &ThresholdConfig::default());
        let b = fingerprint_inputs(&s, &IndicatorParams::default(), &ext, &ThresholdConfig::default());
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
        assert_eq!(a.short().len(), 12);
    }

    #[test]
    fn sensitive_to_each_input() {
        let s = series(&[100.0, 101.0, 102.0]);
        let params = IndicatorParams::default();
        let ext = ExternalSignals::new(70, 12.0, 1.2);
        let thr = ThresholdConfig::default();
        let base = fingerprint_inputs(&s, &params, &ext, &thr);

        let other_series = series(&[100.0, 101.0, 102.5]);
        assert_ne!(base, fingerprint_inputs(&other_series, &params, &ext, &thr));

        let missing_vix = ExternalSignals {
            volatility_estimate: None,
            ..ext
        };
        assert_ne!(base, fingerprint_inputs(&s, &params, &missing_vix, &thr));

        let thr2 = ThresholdConfig {
            pcr_threshold: 1.1,
            ..thr
        };
        assert_ne!(base, fingerprint_inputs(&s, &params, &ext, &thr2));

        let params2 = IndicatorParams {
            ema_span: 10,
            ..params
        };
        assert_ne!(base, fingerprint_inputs(&s, &params2, &ext, &thr));
    }
}
