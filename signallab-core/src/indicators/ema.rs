//! Exponential Moving Average (EMA).
//!
//! Recursive, no adjustment correction:
//! EMA[0] = close[0]
//! EMA[t] = k * close[t] + (1 - k) * EMA[t-1],  k = 2 / (span + 1)
//! Lookback: 0 (defined from the first bar).

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    name: String,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        assert!(span >= 1, "EMA span must be >= 1");
        Self {
            span,
            name: format!("ema_{span}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        ema_of_series(&closes, self.span)
    }
}

/// EMA of an arbitrary series, seeded by its first finite value.
///
/// A NaN input yields NaN at that position; the recursion resumes from the last
/// defined average on the next finite value.
pub fn ema_of_series(values: &[f64], span: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; values.len()];
    if span == 0 {
        return result;
    }

    let k = 2.0 / (span as f64 + 1.0);
    let mut prev: Option<f64> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        let ema = match prev {
            None => v,
            Some(p) => k * v + (1.0 - k) * p,
        };
        result[i] = ema;
        prev = Some(ema);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn ema_span_1_equals_close() {
        let bars = make_bars(&[100.0, 200.0, 300.0]);
        let result = Ema::new(1).compute(&bars);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // k = 0.5
        // 10 → 10, 11 → 10.5, 12 → 11.25, 13 → 12.125
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0]);
        let result = Ema::new(3).compute(&bars);
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert_approx(result[1], 10.5, DEFAULT_EPSILON);
        assert_approx(result[2], 11.25, DEFAULT_EPSILON);
        assert_approx(result[3], 12.125, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_20_short_series() {
        let bars = make_bars(&[100.0, 102.0, 105.0, 103.0, 101.0]);
        let result = Ema::new(20).compute(&bars);
        let rounded: Vec<f64> = result.iter().map(|v| (v * 100.0).round() / 100.0).collect();
        assert_eq!(rounded, vec![100.0, 100.19, 100.65, 100.87, 100.88]);
    }

    #[test]
    fn ema_constant_series_is_constant() {
        let bars = make_bars(&[42.0; 50]);
        let result = Ema::new(20).compute(&bars);
        for v in result {
            assert_approx(v, 42.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn ema_nan_is_skipped() {
        let values = [10.0, f64::NAN, 12.0];
        let result = ema_of_series(&values, 3);
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert!(result[1].is_nan());
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_lookback() {
        assert_eq!(Ema::new(20).lookback(), 0);
        assert_eq!(Ema::new(20).name(), "ema_20");
    }
}
