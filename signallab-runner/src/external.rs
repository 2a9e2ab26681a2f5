//! Adapter wiring and concurrent fetch of the three external readings.

use signallab_core::adapters::{
    AdapterReadings, FixedSource, GeminiClient, OptionChainClient, PutCallSource,
    SentimentSource, SignalSources, Unavailable, VolatilitySource,
};
use signallab_core::signals::SignalField;
use tracing::{debug, warn};

use crate::config::SessionConfig;

/// Adapter that always reports the same reason for being unavailable.
#[derive(Debug, Clone)]
pub struct Disabled {
    reason: String,
}

impl Disabled {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl SentimentSource for Disabled {
    fn sentiment(&self, _subject: &str) -> Result<u8, Unavailable> {
        Err(Unavailable::new(SignalField::AiSentiment, self.reason.clone()))
    }
}

impl VolatilitySource for Disabled {
    fn volatility(&self) -> Result<f64, Unavailable> {
        Err(Unavailable::new(
            SignalField::VolatilityEstimate,
            self.reason.clone(),
        ))
    }
}

impl PutCallSource for Disabled {
    fn put_call_ratio(&self, _subject: &str) -> Result<f64, Unavailable> {
        Err(Unavailable::new(SignalField::PutCallRatio, self.reason.clone()))
    }
}

/// Operator-supplied readings that replace individual adapters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReadingOverrides {
    pub ai_sentiment: Option<u8>,
    pub volatility_estimate: Option<f64>,
    pub put_call_ratio: Option<f64>,
}

/// Owned set of the three adapters for a session.
pub struct SourceSet {
    sentiment: Box<dyn SentimentSource>,
    volatility: Box<dyn VolatilitySource>,
    put_call: Box<dyn PutCallSource>,
}

impl SourceSet {
    pub fn new(
        sentiment: Box<dyn SentimentSource>,
        volatility: Box<dyn VolatilitySource>,
        put_call: Box<dyn PutCallSource>,
    ) -> Self {
        Self {
            sentiment,
            volatility,
            put_call,
        }
    }

    /// Network-backed adapters from the session config.
    ///
    /// A missing API key or a client that cannot be built disables the affected
    /// adapters; it never fails the session.
    pub fn live(config: &SessionConfig) -> Self {
        let (sentiment, volatility): (Box<dyn SentimentSource>, Box<dyn VolatilitySource>) =
            match (
                GeminiClient::new(config.gemini_settings()),
                GeminiClient::new(config.gemini_settings()),
            ) {
                (Ok(s), Ok(v)) => (Box::new(s), Box::new(v)),
                (Err(e), _) | (_, Err(e)) => {
                    warn!(error = %e, "generative adapters disabled");
                    let disabled = Disabled::new(e.to_string());
                    (Box::new(disabled.clone()), Box::new(disabled))
                }
            };

        let put_call: Box<dyn PutCallSource> = match OptionChainClient::new(&config.option_chain) {
            Ok(client) => Box::new(client),
            Err(e) => {
                warn!(error = %e, "option-chain adapter disabled");
                Box::new(Disabled::new(e.to_string()))
            }
        };

        Self {
            sentiment,
            volatility,
            put_call,
        }
    }

    /// No network: every adapter is unavailable.
    pub fn offline() -> Self {
        let src = FixedSource::offline();
        Self {
            sentiment: Box::new(src),
            volatility: Box::new(src),
            put_call: Box::new(src),
        }
    }

    /// Replace adapters for which an override value is given.
    pub fn with_overrides(mut self, overrides: ReadingOverrides) -> Self {
        if let Some(ai) = overrides.ai_sentiment {
            self.sentiment = Box::new(FixedSource::new(Some(ai), None, None));
        }
        if let Some(vix) = overrides.volatility_estimate {
            self.volatility = Box::new(FixedSource::new(None, Some(vix), None));
        }
        if let Some(pcr) = overrides.put_call_ratio {
            self.put_call = Box::new(FixedSource::new(None, None, Some(pcr)));
        }
        self
    }

    pub fn sources(&self) -> SignalSources<'_> {
        SignalSources {
            sentiment: self.sentiment.as_ref(),
            volatility: self.volatility.as_ref(),
            put_call: self.put_call.as_ref(),
        }
    }
}

/// Fetch all three readings concurrently. Each adapter bounds its own latency.
pub fn fetch_readings(subject: &str, sources: SignalSources<'_>) -> AdapterReadings {
    let (ai_sentiment, (volatility_estimate, put_call_ratio)) = rayon::join(
        || sources.sentiment.sentiment(subject),
        || {
            rayon::join(
                || sources.volatility.volatility(),
                || sources.put_call.put_call_ratio(subject),
            )
        },
    );
    let readings = AdapterReadings {
        ai_sentiment,
        volatility_estimate,
        put_call_ratio,
    };
    debug!(subject, failures = readings.failures().len(), "external readings fetched");
    readings
}
