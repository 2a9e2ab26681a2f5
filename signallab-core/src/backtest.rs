//! Backtest Engine — realized returns of a signal column under a one-bar lag.
//!
//! A signal observed at bar i-1 is acted on at bar i:
//! position[i] = map(signal[i-1]), position[0] = 0
//! per_bar_return[i] = close[i] / close[i-1] - 1, per_bar_return[0] = 0
//! strategy_return[i] = per_bar_return[i] * position[i]
//! cumulative_return[i] = Π(1 + strategy_return[j], j <= i) - 1
//!
//! Pure derivation: the input series is only borrowed.

use serde::{Deserialize, Serialize};

use crate::domain::Signal;
use crate::signals::SignaledSeries;

/// Realized returns for a signaled series, plus the buy & hold baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub position: Vec<i8>,
    pub per_bar_return: Vec<f64>,
    pub strategy_return: Vec<f64>,
    pub cumulative_return: Vec<f64>,
    /// Cumulative return with the position fixed at +1 on every bar.
    pub buy_hold_cumulative: Vec<f64>,
    pub total_return: f64,
    pub buy_hold_total_return: f64,
}

impl BacktestResult {
    /// Zeroed result for series too short to trade (fewer than 2 bars).
    pub fn degenerate(len: usize) -> Self {
        Self {
            position: vec![0; len],
            per_bar_return: vec![0.0; len],
            strategy_return: vec![0.0; len],
            cumulative_return: vec![0.0; len],
            buy_hold_cumulative: vec![0.0; len],
            total_return: 0.0,
            buy_hold_total_return: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.position.len()
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    /// Growth of one unit for the strategy (`1 + cumulative_return`).
    pub fn strategy_growth(&self) -> Vec<f64> {
        self.cumulative_return.iter().map(|r| 1.0 + r).collect()
    }

    /// Growth of one unit for buy & hold.
    pub fn buy_hold_growth(&self) -> Vec<f64> {
        self.buy_hold_cumulative.iter().map(|r| 1.0 + r).collect()
    }
}

/// Run the backtest over a signaled series.
pub fn run_backtest(series: &SignaledSeries) -> BacktestResult {
    backtest_closes(&series.closes(), series.signals())
}

/// Backtest over raw closes and signals of equal length.
///
/// Extra elements of the longer slice are ignored.
pub fn backtest_closes(closes: &[f64], signals: &[Signal]) -> BacktestResult {
    let n = closes.len().min(signals.len());
    if n < 2 {
        return BacktestResult::degenerate(n);
    }

    let per_bar_return = pct_change(&closes[..n]);
    let position: Vec<i8> = (0..n)
        .map(|i| if i == 0 { 0 } else { signals[i - 1].position() })
        .collect();
    let strategy_return: Vec<f64> = per_bar_return
        .iter()
        .zip(&position)
        .map(|(r, &p)| r * f64::from(p))
        .collect();

    let cumulative_return = compound(&strategy_return);
    let buy_hold_cumulative = compound(&per_bar_return);
    let total_return = cumulative_return[n - 1];
    let buy_hold_total_return = buy_hold_cumulative[n - 1];

    BacktestResult {
        position,
        per_bar_return,
        strategy_return,
        cumulative_return,
        buy_hold_cumulative,
        total_return,
        buy_hold_total_return,
    }
}

/// Simple percentage change; the first element is 0.
pub fn pct_change(closes: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; closes.len()];
    for i in 1..closes.len() {
        let prev = closes[i - 1];
        out[i] = if prev == 0.0 {
            0.0
        } else {
            (closes[i] - prev) / prev
        };
    }
    out
}

fn compound(returns: &[f64]) -> Vec<f64> {
    let mut growth = 1.0;
    returns
        .iter()
        .map(|r| {
            growth *= 1.0 + r;
            growth - 1.0
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    #[test]
    fn hold_hold_buy_hold() {
        let closes = [100.0, 102.0, 105.0, 103.0];
        let signals = [Signal::Hold, Signal::Hold, Signal::Buy, Signal::Hold];
        let r = backtest_closes(&closes, &signals);

        assert_eq!(r.position, vec![0, 0, 0, 1]);
        assert_approx(r.per_bar_return[1], 0.02, 1e-12);
        assert_approx(r.per_bar_return[2], 3.0 / 102.0, 1e-12);
        assert_approx(r.per_bar_return[3], -2.0 / 105.0, 1e-12);
        assert_eq!(&r.strategy_return[..3], &[0.0, 0.0, 0.0]);
        assert_approx(r.strategy_return[3], -2.0 / 105.0, 1e-12);
        assert_approx(r.total_return, -2.0 / 105.0, 1e-12);
        assert!((r.total_return * 100.0 - (-1.9)).abs() < 0.01);
    }

    #[test]
    fn sell_profits_from_decline() {
        let closes = [100.0, 100.0, 90.0];
        let signals = [Signal::Hold, Signal::Sell, Signal::Hold];
        let r = backtest_closes(&closes, &signals);
        assert_eq!(r.position, vec![0, 0, -1]);
        assert_approx(r.total_return, 0.1, 1e-12);
    }

    #[test]
    fn buy_and_hold_baseline() {
        let closes = [100.0, 110.0, 99.0];
        let r = backtest_closes(&closes, &[Signal::Hold; 3]);
        assert_approx(r.buy_hold_total_return, -0.01, 1e-12);
        assert_approx(r.buy_hold_cumulative[1], 0.1, 1e-12);
        assert_eq!(r.total_return, 0.0);
    }

    #[test]
    fn degenerate_single_bar() {
        let r = backtest_closes(&[100.0], &[Signal::Buy]);
        assert_eq!(r.total_return, 0.0);
        assert_eq!(r.position, vec![0]);
        assert_eq!(r.cumulative_return, vec![0.0]);
    }

    #[test]
    fn degenerate_empty() {
        let r = backtest_closes(&[], &[]);
        assert!(r.is_empty());
        assert_eq!(r.total_return, 0.0);
    }

    #[test]
    fn growth_curves() {
        let r = backtest_closes(&[100.0, 110.0], &[Signal::Buy, Signal::Hold]);
        assert_approx(r.strategy_growth()[1], 1.1, 1e-12);
        assert_approx(r.buy_hold_growth()[1], 1.1, 1e-12);
    }
}
