//! Performance metrics — pure functions that compute strategy statistics.
//!
//! Every metric is a pure function: a return series, growth curve or position
//! column in, scalar out.

use serde::{Deserialize, Serialize};
use signallab_core::backtest::BacktestResult;
use signallab_core::signals::SignalCounts;

/// Trading bars per year used for annualisation.
pub const BARS_PER_YEAR: f64 = 252.0;

/// Aggregate performance metrics for a single backtest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub buy_hold_return: f64,
    /// Strategy minus buy & hold.
    pub excess_return: f64,
    /// Worst peak-to-trough of the strategy growth curve, as a negative fraction.
    pub max_drawdown: f64,
    pub buy_hold_max_drawdown: f64,
    pub sharpe: f64,
    pub sortino: f64,
    /// Fraction of bars holding a non-zero position.
    pub exposure: f64,
    pub buy_signals: usize,
    pub sell_signals: usize,
    pub hold_signals: usize,
    pub bars: usize,
}

impl PerformanceMetrics {
    pub fn compute(backtest: &BacktestResult, counts: SignalCounts) -> Self {
        // Bar 0 never carries a return.
        let returns = backtest.strategy_return.get(1..).unwrap_or(&[]);
        Self {
            total_return: backtest.total_return,
            buy_hold_return: backtest.buy_hold_total_return,
            excess_return: backtest.total_return - backtest.buy_hold_total_return,
            max_drawdown: max_drawdown(&backtest.strategy_growth()),
            buy_hold_max_drawdown: max_drawdown(&backtest.buy_hold_growth()),
            sharpe: sharpe_ratio(returns),
            sortino: sortino_ratio(returns),
            exposure: exposure(&backtest.position),
            buy_signals: counts.buy,
            sell_signals: counts.sell,
            hold_signals: counts.hold,
            bars: backtest.len(),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Annualized Sharpe ratio of per-bar returns (risk-free rate 0).
///
/// Returns 0.0 if variance is zero or there are fewer than 2 returns.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let std = std_dev(returns);
    if std < 1e-15 {
        return 0.0;
    }
    mean_f64(returns) / std * BARS_PER_YEAR.sqrt()
}

/// Annualized Sortino ratio (downside deviation only).
pub fn sortino_ratio(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let downside_sq: f64 = returns.iter().filter(|&&r| r < 0.0).map(|r| r * r).sum();
    if downside_sq == 0.0 {
        return 0.0;
    }
    let downside_std = (downside_sq / returns.len() as f64).sqrt();
    if downside_std < 1e-15 {
        return 0.0;
    }
    mean_f64(returns) / downside_std * BARS_PER_YEAR.sqrt()
}

/// Maximum drawdown as a negative fraction (e.g., -0.15 = 15% drawdown).
///
/// Returns 0.0 if the curve is constant or monotonically increasing.
pub fn max_drawdown(growth: &[f64]) -> f64 {
    let Some(&first) = growth.first() else {
        return 0.0;
    };
    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &g in growth {
        if g > peak {
            peak = g;
        }
        if peak > 0.0 {
            max_dd = max_dd.min((g - peak) / peak);
        }
    }
    max_dd
}

/// Fraction of bars with a non-zero position.
pub fn exposure(position: &[i8]) -> f64 {
    if position.is_empty() {
        return 0.0;
    }
    position.iter().filter(|&&p| p != 0).count() as f64 / position.len() as f64
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
