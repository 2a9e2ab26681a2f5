//! Relative Strength Index (RSI).
//!
//! Simple rolling mean of gains and losses over the last `period` close changes
//! (not Wilder/exponential smoothing).
//! RSI = 100 - 100 / (1 + mean_gain / mean_loss)
//! Lookback: period.
//! Edge case: mean_loss == 0 → undefined (NaN), resolved to neutral downstream.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        rsi_of_series(&closes, self.period)
    }
}

/// Rolling-mean RSI of an arbitrary series.
pub fn rsi_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period + 1 {
        return result;
    }

    let mut changes = vec![f64::NAN; n];
    for i in 1..n {
        changes[i] = values[i] - values[i - 1];
    }

    for i in period..n {
        let window = &changes[(i + 1 - period)..=i];
        if window.iter().any(|c| c.is_nan()) {
            continue;
        }
        let gain: f64 = window.iter().filter(|&&c| c > 0.0).sum::<f64>() / period as f64;
        let loss: f64 = -window.iter().filter(|&&c| c < 0.0).sum::<f64>() / period as f64;
        result[i] = rsi_from_means(gain, loss);
    }

    result
}

fn rsi_from_means(mean_gain: f64, mean_loss: f64) -> f64 {
    if mean_loss == 0.0 {
        return f64::NAN;
    }
    100.0 - 100.0 / (1.0 + mean_gain / mean_loss)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn rsi_all_gains_is_undefined() {
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = Rsi::new(3).compute(&bars);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let bars = make_bars(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = Rsi::new(3).compute(&bars);
        assert!(result[2].is_nan());
        assert_approx(result[3], 0.0, 1e-9);
        assert_approx(result[5], 0.0, 1e-9);
    }

    #[test]
    fn rsi_mixed_known_value() {
        // Changes: +0.34, -0.25, -0.48, +0.72
        // Window at 3: gains 0.34, losses 0.73 → 100 - 100/(1 + 0.34/0.73)
        // Window at 4: gains 0.72, losses 0.73 → 100 - 100/(1 + 0.72/0.73)
        let bars = make_bars(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let result = Rsi::new(3).compute(&bars);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert_approx(result[3], 100.0 - 100.0 / (1.0 + 0.34 / 0.73), 1e-9);
        assert_approx(result[4], 100.0 - 100.0 / (1.0 + 0.72 / 0.73), 1e-9);
    }

    #[test]
    fn rsi_window_forgets_old_changes() {
        // One loss, then only gains: once the loss leaves the window RSI is undefined again.
        let bars = make_bars(&[10.0, 9.0, 10.0, 11.0, 12.0]);
        let result = Rsi::new(2).compute(&bars);
        assert_approx(result[2], 50.0, 1e-9);
        assert!(result[3].is_nan());
    }

    #[test]
    fn rsi_bounds() {
        let bars = make_bars(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        let result = Rsi::new(3).compute(&bars);
        for (i, &v) in result.iter().enumerate() {
            if !v.is_nan() {
                assert!(
                    (0.0..=100.0).contains(&v),
                    "RSI out of bounds at bar {i}: {v}"
                );
            }
        }
    }

    #[test]
    fn rsi_lookback() {
        assert_eq!(Rsi::new(14).lookback(), 14);
    }
}
