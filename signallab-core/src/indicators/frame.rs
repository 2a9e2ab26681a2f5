//! IndicatorFrame — a price series plus its trend, momentum and strength columns.

use serde::{Deserialize, Serialize};

use super::{Adx, Ema, Indicator, Rsi};
use crate::domain::PriceSeries;

/// RSI substituted wherever the rolling RSI is undefined.
pub const NEUTRAL_RSI: f64 = 50.0;

/// ADX substituted wherever the ADX is undefined.
pub const NEUTRAL_ADX: f64 = 20.0;

/// Indicator periods. Defaults match the signal rule: EMA 20, RSI 14, ADX 14.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub ema_span: usize,
    pub rsi_period: usize,
    pub adx_period: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            ema_span: 20,
            rsi_period: 14,
            adx_period: 14,
        }
    }
}

impl IndicatorParams {
    /// Bars before which no BUY/SELL may fire: `max(ema_span, rsi_period)`.
    pub fn warmup_bars(&self) -> usize {
        self.ema_span.max(self.rsi_period)
    }
}

/// Resolved indicator values for one bar, never undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarIndicators {
    pub close: f64,
    pub ema: f64,
    pub rsi: f64,
    pub adx: f64,
}

/// A price series augmented with raw indicator columns.
///
/// Raw columns keep `NaN` for undefined bars so callers can see the warm-up;
/// [`IndicatorFrame::resolved`] produces the neutral-filled view the signal rule
/// consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    series: PriceSeries,
    params: IndicatorParams,
    ema: Vec<f64>,
    rsi: Vec<f64>,
    adx: Vec<f64>,
}

impl IndicatorFrame {
    /// Run the Indicator Engine over a series. Pure; no side effects.
    pub fn compute(series: PriceSeries, params: IndicatorParams) -> Self {
        let bars = series.bars();
        let ema = Ema::new(params.ema_span).compute(bars);
        let rsi = Rsi::new(params.rsi_period).compute(bars);
        let adx = Adx::new(params.adx_period).compute(bars);
        Self {
            series,
            params,
            ema,
            rsi,
            adx,
        }
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn params(&self) -> IndicatorParams {
        self.params
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn ema(&self) -> &[f64] {
        &self.ema
    }

    pub fn rsi(&self) -> &[f64] {
        &self.rsi
    }

    pub fn adx(&self) -> &[f64] {
        &self.adx
    }

    /// Number of bars whose RSI or ADX was undefined and will be neutral-filled.
    pub fn undefined_bars(&self) -> usize {
        self.rsi
            .iter()
            .zip(&self.adx)
            .filter(|(r, a)| r.is_nan() || a.is_nan())
            .count()
    }

    /// Neutral-filled per-bar values.
    ///
    /// RSI → 50, ADX → 20, EMA → forward fill then backward fill; a column with
    /// no defined value at all falls back to the bar's own close.
    pub fn resolved(&self) -> Vec<BarIndicators> {
        let ema = fill_forward_backward(&self.ema);
        self.series
            .bars()
            .iter()
            .enumerate()
            .map(|(i, bar)| BarIndicators {
                close: bar.close,
                ema: if ema[i].is_nan() { bar.close } else { ema[i] },
                rsi: or_neutral(self.rsi[i], NEUTRAL_RSI),
                adx: or_neutral(self.adx[i], NEUTRAL_ADX),
            })
            .collect()
    }
}

fn or_neutral(value: f64, neutral: f64) -> f64 {
    if value.is_nan() {
        neutral
    } else {
        value
    }
}

fn fill_forward_backward(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    let mut last = f64::NAN;
    for v in out.iter_mut() {
        if v.is_nan() {
            *v = last;
        } else {
            last = *v;
        }
    }
    let mut next = f64::NAN;
    for v in out.iter_mut().rev() {
        if v.is_nan() {
            *v = next;
        } else {
            next = *v;
        }
    }
    out
}
