//! Gemini `generateContent` client for sentiment and volatility estimates.
//!
//! The reply is free text; only the first number in it is used.

use super::{AdapterError, SentimentSource, Unavailable, VolatilitySource};
use crate::signals::SignalField;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Model names and timeout for the generative client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub api_key: String,
    pub model_sentiment: String,
    pub model_signals: String,
    pub timeout_secs: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model_sentiment: "gemini-pro-latest".into(),
            model_signals: "gemini-flash-latest".into(),
            timeout_secs: 30,
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ReplyPart>,
}

#[derive(Debug, Deserialize)]
struct ReplyPart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().map(|p| p.text).collect();
        Some(text)
    }
}

pub struct GeminiClient {
    client: reqwest::blocking::Client,
    settings: GeminiSettings,
    base_url: String,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Result<Self, AdapterError> {
        if settings.api_key.trim().is_empty() {
            return Err(AdapterError::MissingApiKey);
        }
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            settings,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }

    /// Send one prompt and return the concatenated reply text.
    pub fn generate(&self, model: &str, prompt: &str) -> Result<String, AdapterError> {
        let body = GenerateRequest {
            contents: [Content {
                parts: [Part { text: prompt }],
            }],
        };
        let resp = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", &self.settings.api_key)
            .json(&body)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
            });
        }
        let parsed: GenerateResponse = resp
            .json()
            .map_err(|e| AdapterError::Malformed(e.to_string()))?;
        let text = parsed
            .text()
            .ok_or_else(|| AdapterError::Malformed("reply has no candidates".into()))?;
        debug!(model, reply = %text, "generateContent reply");
        Ok(text)
    }
}

fn integer_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-?\d+").ok()).as_ref()
}

fn decimal_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").ok()).as_ref()
}

/// First integer in the reply, clamped to 0–100.
pub fn parse_sentiment(reply: &str) -> Option<u8> {
    let m = integer_pattern()?.find(reply)?;
    let value: f64 = m.as_str().parse().ok()?;
    Some(value.clamp(0.0, 100.0) as u8)
}

/// First decimal number in the reply.
pub fn parse_volatility(reply: &str) -> Option<f64> {
    decimal_pattern()?
        .find(reply)
        .and_then(|m| m.as_str().parse().ok())
}

fn sentiment_prompt(subject: &str) -> String {
    format!(
        "Rate current investor sentiment for {subject} on a scale from 0 (very bearish) \
         to 100 (very bullish). Reply with the number only."
    )
}

const VOLATILITY_PROMPT: &str =
    "Estimate the current India VIX volatility index. Reply with the number only.";

impl SentimentSource for GeminiClient {
    fn sentiment(&self, subject: &str) -> Result<u8, Unavailable> {
        let field = SignalField::AiSentiment;
        let reply = self
            .generate(&self.settings.model_sentiment, &sentiment_prompt(subject))
            .map_err(|e| e.unavailable(field))?;
        parse_sentiment(&reply).ok_or_else(|| AdapterError::NoNumber { reply }.unavailable(field))
    }
}

impl VolatilitySource for GeminiClient {
    fn volatility(&self) -> Result<f64, Unavailable> {
        let field = SignalField::VolatilityEstimate;
        let reply = self
            .generate(&self.settings.model_signals, VOLATILITY_PROMPT)
            .map_err(|e| e.unavailable(field))?;
        parse_volatility(&reply).ok_or_else(|| AdapterError::NoNumber { reply }.unavailable(field))
    }
}
