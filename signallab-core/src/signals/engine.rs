//! Signal Engine — per-bar BUY/SELL/HOLD from indicators plus external readings.
//!
//! Each bar is classified independently from its own neutral-filled indicator
//! values and the run's constant readings and thresholds. The rule is a pure
//! function: identical inputs always produce identical output.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::external::{ExternalSignals, ResolvedSignals};
use super::thresholds::ThresholdConfig;
use crate::domain::{PriceSeries, Signal};
use crate::indicators::{BarIndicators, IndicatorFrame};

/// RSI level a BUY must exceed.
pub const RSI_BUY_LEVEL: f64 = 55.0;
/// RSI level a SELL must stay below.
pub const RSI_SELL_LEVEL: f64 = 45.0;
/// ADX level both sides must exceed.
pub const ADX_TREND_LEVEL: f64 = 20.0;
/// Distance sentiment must clear its threshold by.
pub const SENTIMENT_MARGIN: f64 = 5.0;

/// Classify one bar.
///
/// The ADX gate applies to BUY and SELL alike: it is a trend-strength filter,
/// not a directional one, so both sides are suppressed in ranging markets.
pub fn classify(bar: &BarIndicators, external: &ResolvedSignals, thresholds: &ThresholdConfig) -> Signal {
    let trending = bar.adx > ADX_TREND_LEVEL;

    let buy = bar.close > bar.ema
        && bar.rsi > RSI_BUY_LEVEL
        && trending
        && external.ai_sentiment > thresholds.ai_threshold + SENTIMENT_MARGIN
        && external.put_call_ratio > thresholds.pcr_threshold
        && external.volatility_estimate < thresholds.vix_threshold;
    if buy {
        return Signal::Buy;
    }

    let sell = bar.close < bar.ema
        && bar.rsi < RSI_SELL_LEVEL
        && trending
        && external.ai_sentiment < thresholds.ai_threshold - SENTIMENT_MARGIN
        && external.put_call_ratio < thresholds.pcr_threshold
        && external.volatility_estimate > thresholds.vix_threshold;
    if sell {
        return Signal::Sell;
    }

    Signal::Hold
}

/// Run the rule over every bar of a frame.
///
/// Bar 0 and every bar before the indicator warm-up (`max(ema_span, rsi_period)`)
/// are HOLD.
pub fn generate_signals(
    frame: IndicatorFrame,
    external: &ExternalSignals,
    thresholds: &ThresholdConfig,
) -> SignaledSeries {
    let resolved_external = external.resolve();
    let indicators = frame.resolved();
    let warmup = frame.params().warmup_bars().max(1);

    let signals: Vec<Signal> = indicators
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i < warmup {
                Signal::Hold
            } else {
                classify(bar, &resolved_external, thresholds)
            }
        })
        .collect();

    let series = SignaledSeries {
        frame,
        indicators,
        signals,
        external: resolved_external,
        thresholds: *thresholds,
    };
    let counts = series.counts();
    debug!(
        symbol = series.series().symbol(),
        bars = series.len(),
        buy = counts.buy,
        sell = counts.sell,
        hold = counts.hold,
        "signals generated"
    );
    series
}

/// Tally of signals over a series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalCounts {
    pub buy: usize,
    pub sell: usize,
    pub hold: usize,
}

/// An indicator frame with one signal per bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignaledSeries {
    frame: IndicatorFrame,
    indicators: Vec<BarIndicators>,
    signals: Vec<Signal>,
    external: ResolvedSignals,
    thresholds: ThresholdConfig,
}

impl SignaledSeries {
    pub fn frame(&self) -> &IndicatorFrame {
        &self.frame
    }

    pub fn series(&self) -> &PriceSeries {
        self.frame.series()
    }

    /// Neutral-filled values the rule was evaluated against.
    pub fn indicators(&self) -> &[BarIndicators] {
        &self.indicators
    }

    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn external(&self) -> &ResolvedSignals {
        &self.external
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.series().closes()
    }

    pub fn counts(&self) -> SignalCounts {
        let mut counts = SignalCounts::default();
        for s in &self.signals {
            match s {
                Signal::Buy => counts.buy += 1,
                Signal::Sell => counts.sell += 1,
                Signal::Hold => counts.hold += 1,
            }
        }
        counts
    }

    /// Test/backfill constructor: attach an explicit signal column to a frame.
    ///
    /// Returns `None` if the column length differs from the frame.
    pub fn with_signals(frame: IndicatorFrame, signals: Vec<Signal>) -> Option<Self> {
        if signals.len() != frame.len() {
            return None;
        }
        let indicators = frame.resolved();
        Some(Self {
            frame,
            indicators,
            signals,
            external: ExternalSignals::unavailable().resolve(),
            thresholds: ThresholdConfig::default(),
        })
    }
}
