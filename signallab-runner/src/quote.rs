//! Latest-price quote for the market overview.

use serde::{Deserialize, Serialize};
use signallab_core::domain::PriceSeries;

/// Last price and change against the previous close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub last_price: f64,
    /// `last close - previous close`; 0 with a single bar.
    pub delta: f64,
}

impl QuoteSnapshot {
    pub fn from_series(series: &PriceSeries) -> Self {
        let bars = series.bars();
        let last_price = series.last().close;
        let delta = match bars.len() {
            0 | 1 => 0.0,
            n => last_price - bars[n - 2].close,
        };
        Self { last_price, delta }
    }

    /// Delta as a fraction of the previous close.
    pub fn delta_pct(&self) -> f64 {
        let previous = self.last_price - self.delta;
        if previous == 0.0 {
            0.0
        } else {
            self.delta / previous
        }
    }
}
