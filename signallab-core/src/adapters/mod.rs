//! External signal adapters.
//!
//! Each adapter answers one scalar question (sentiment, volatility estimate,
//! put/call ratio) or reports [`Unavailable`]. Transport and parse failures are
//! [`AdapterError`]s internally and never cross the adapter boundary as
//! anything else, so the signal engine only ever sees a number or a marker it
//! replaces with the neutral default.

pub mod fixed;
pub mod gemini;
pub mod option_chain;

pub use fixed::FixedSource;
pub use gemini::{parse_sentiment, parse_volatility, GeminiClient, GeminiSettings};
pub use option_chain::{
    put_call_ratio_from_chain, underlying_for, OptionChainClient, OptionChainSettings,
};

use crate::signals::{ExternalSignals, SignalField};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures inside an adapter. Converted to [`Unavailable`] at the boundary.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("no API key configured")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("no number in reply: {reply:?}")]
    NoNumber { reply: String },

    #[error("total call open interest is zero")]
    ZeroCallOpenInterest,
}

impl AdapterError {
    pub fn unavailable(self, field: SignalField) -> Unavailable {
        Unavailable {
            field,
            reason: self.to_string(),
        }
    }
}

/// An adapter could not produce its reading.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{field} unavailable: {reason}")]
pub struct Unavailable {
    pub field: SignalField,
    pub reason: String,
}

impl Unavailable {
    pub fn new(field: SignalField, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Investor sentiment for a subject, 0–100.
pub trait SentimentSource: Send + Sync {
    fn sentiment(&self, subject: &str) -> Result<u8, Unavailable>;
}

/// Global volatility index estimate.
pub trait VolatilitySource: Send + Sync {
    fn volatility(&self) -> Result<f64, Unavailable>;
}

/// Put/call open-interest ratio for the underlying that matches a subject.
pub trait PutCallSource: Send + Sync {
    fn put_call_ratio(&self, subject: &str) -> Result<f64, Unavailable>;
}

/// The three adapters used for one run.
#[derive(Clone, Copy)]
pub struct SignalSources<'a> {
    pub sentiment: &'a dyn SentimentSource,
    pub volatility: &'a dyn VolatilitySource,
    pub put_call: &'a dyn PutCallSource,
}

/// One reading per adapter, as returned.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterReadings {
    pub ai_sentiment: Result<u8, Unavailable>,
    pub volatility_estimate: Result<f64, Unavailable>,
    pub put_call_ratio: Result<f64, Unavailable>,
}

impl AdapterReadings {
    pub fn to_external(&self) -> ExternalSignals {
        ExternalSignals {
            ai_sentiment: self.ai_sentiment.as_ref().ok().copied(),
            volatility_estimate: self.volatility_estimate.as_ref().ok().copied(),
            put_call_ratio: self.put_call_ratio.as_ref().ok().copied(),
        }
    }

    pub fn failures(&self) -> Vec<&Unavailable> {
        [
            self.ai_sentiment.as_ref().err(),
            self.volatility_estimate.as_ref().err(),
            self.put_call_ratio.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_map_failures_to_none() {
        let readings = AdapterReadings {
            ai_sentiment: Ok(70),
            volatility_estimate: Err(Unavailable::new(
                SignalField::VolatilityEstimate,
                "timeout",
            )),
            put_call_ratio: Ok(1.2),
        };
        let ext = readings.to_external();
        assert_eq!(ext.ai_sentiment, Some(70));
        assert_eq!(ext.volatility_estimate, None);
        assert_eq!(ext.put_call_ratio, Some(1.2));
        assert_eq!(readings.failures().len(), 1);
    }

    #[test]
    fn adapter_error_becomes_unavailable() {
        let u = AdapterError::ZeroCallOpenInterest.unavailable(SignalField::PutCallRatio);
        assert_eq!(u.field, SignalField::PutCallRatio);
        assert!(u.to_string().contains("zero"));
    }
}
