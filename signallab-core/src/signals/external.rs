//! Per-run external readings and their neutral defaults.
//!
//! External readings are scalars, constant across every bar of a run. A missing
//! reading resolves to a fixed neutral constant chosen to bias the rule toward
//! HOLD.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const NEUTRAL_SENTIMENT: f64 = 50.0;
pub const NEUTRAL_VOLATILITY: f64 = 15.0;
pub const NEUTRAL_PUT_CALL_RATIO: f64 = 1.0;

/// Identifies one of the three external inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalField {
    AiSentiment,
    VolatilityEstimate,
    PutCallRatio,
}

impl SignalField {
    pub fn neutral(self) -> f64 {
        match self {
            SignalField::AiSentiment => NEUTRAL_SENTIMENT,
            SignalField::VolatilityEstimate => NEUTRAL_VOLATILITY,
            SignalField::PutCallRatio => NEUTRAL_PUT_CALL_RATIO,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SignalField::AiSentiment => "AI sentiment",
            SignalField::VolatilityEstimate => "volatility estimate",
            SignalField::PutCallRatio => "put/call ratio",
        }
    }
}

impl fmt::Display for SignalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw external readings for one run. `None` means the source was unavailable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalSignals {
    pub ai_sentiment: Option<u8>,
    pub volatility_estimate: Option<f64>,
    pub put_call_ratio: Option<f64>,
}

impl ExternalSignals {
    pub fn new(ai_sentiment: u8, volatility_estimate: f64, put_call_ratio: f64) -> Self {
        Self {
            ai_sentiment: Some(ai_sentiment),
            volatility_estimate: Some(volatility_estimate),
            put_call_ratio: Some(put_call_ratio),
        }
    }

    /// All three sources unavailable.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Substitute neutral defaults for missing or malformed readings.
    ///
    /// Sentiment above 100, and negative or non-finite volatility/PCR values,
    /// count as malformed.
    pub fn resolve(&self) -> ResolvedSignals {
        let mut defaulted = Vec::new();

        let ai_sentiment = match self.ai_sentiment {
            Some(v) if v <= 100 => f64::from(v),
            _ => {
                defaulted.push(SignalField::AiSentiment);
                NEUTRAL_SENTIMENT
            }
        };
        let volatility_estimate = non_negative(self.volatility_estimate).unwrap_or_else(|| {
            defaulted.push(SignalField::VolatilityEstimate);
            NEUTRAL_VOLATILITY
        });
        let put_call_ratio = non_negative(self.put_call_ratio).unwrap_or_else(|| {
            defaulted.push(SignalField::PutCallRatio);
            NEUTRAL_PUT_CALL_RATIO
        });

        ResolvedSignals {
            ai_sentiment,
            volatility_estimate,
            put_call_ratio,
            defaulted,
        }
    }
}

fn non_negative(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

/// External readings with every field defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedSignals {
    pub ai_sentiment: f64,
    pub volatility_estimate: f64,
    pub put_call_ratio: f64,
    /// Fields that fell back to their neutral constant.
    pub defaulted: Vec<SignalField>,
}

impl ResolvedSignals {
    pub fn is_defaulted(&self, field: SignalField) -> bool {
        self.defaulted.contains(&field)
    }

    /// Same values regardless of which fields were defaulted.
    pub fn same_values(&self, other: &ResolvedSignals) -> bool {
        self.ai_sentiment == other.ai_sentiment
            && self.volatility_estimate == other.volatility_estimate
            && self.put_call_ratio == other.put_call_ratio
    }
}
