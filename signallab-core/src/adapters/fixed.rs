//! Fixed-value adapter for overrides and offline runs.

use super::{PutCallSource, SentimentSource, Unavailable, VolatilitySource};
use crate::signals::SignalField;

/// Adapter returning preset readings. `None` reports the field unavailable.
///
/// Used for operator overrides, offline runs and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedSource {
    pub ai_sentiment: Option<u8>,
    pub volatility_estimate: Option<f64>,
    pub put_call_ratio: Option<f64>,
}

impl FixedSource {
    pub fn new(
        ai_sentiment: Option<u8>,
        volatility_estimate: Option<f64>,
        put_call_ratio: Option<f64>,
    ) -> Self {
        Self {
            ai_sentiment,
            volatility_estimate,
            put_call_ratio,
        }
    }

    pub fn offline() -> Self {
        Self::default()
    }
}

fn missing(field: SignalField) -> Unavailable {
    Unavailable::new(field, "no fixed value")
}

impl SentimentSource for FixedSource {
    fn sentiment(&self, _subject: &str) -> Result<u8, Unavailable> {
        self.ai_sentiment
            .ok_or_else(|| missing(SignalField::AiSentiment))
    }
}

impl VolatilitySource for FixedSource {
    fn volatility(&self) -> Result<f64, Unavailable> {
        self.volatility_estimate
            .ok_or_else(|| missing(SignalField::VolatilityEstimate))
    }
}

impl PutCallSource for FixedSource {
    fn put_call_ratio(&self, _subject: &str) -> Result<f64, Unavailable> {
        self.put_call_ratio
            .ok_or_else(|| missing(SignalField::PutCallRatio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_is_all_unavailable() {
        let src = FixedSource::offline();
        assert!(src.sentiment("SENSEX").is_err());
        assert!(src.volatility().is_err());
        assert_eq!(
            src.put_call_ratio("SENSEX").unwrap_err().field,
            SignalField::PutCallRatio
        );
    }

    #[test]
    fn returns_preset_values() {
        let src = FixedSource::new(Some(70), Some(12.0), Some(1.2));
        assert_eq!(src.sentiment("x"), Ok(70));
        assert_eq!(src.volatility(), Ok(12.0));
        assert_eq!(src.put_call_ratio("x"), Ok(1.2));
    }
}
