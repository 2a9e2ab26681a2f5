//! NSE option-chain snapshot → put/call open-interest ratio.

use super::{AdapterError, PutCallSource, Unavailable};
use crate::signals::SignalField;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_OPTION_CHAIN_URL: &str = "https://www.nseindia.com";

#[derive(Debug, Deserialize)]
struct OptionChain {
    records: Records,
}

#[derive(Debug, Deserialize)]
struct Records {
    #[serde(default)]
    data: Vec<StrikeRow>,
}

#[derive(Debug, Deserialize)]
struct StrikeRow {
    #[serde(rename = "CE")]
    call: Option<Leg>,
    #[serde(rename = "PE")]
    put: Option<Leg>,
}

#[derive(Debug, Deserialize)]
struct Leg {
    #[serde(rename = "openInterest", default)]
    open_interest: f64,
}

/// Index whose option chain stands in for a subject.
pub fn underlying_for(subject: &str) -> &'static str {
    if subject.to_ascii_uppercase().contains("BANK") {
        "BANKNIFTY"
    } else {
        "NIFTY"
    }
}

/// Σ put OI / Σ call OI over every strike, rounded to 2 decimals.
pub fn put_call_ratio_from_chain(json: &str) -> Result<f64, AdapterError> {
    let chain: OptionChain =
        serde_json::from_str(json).map_err(|e| AdapterError::Malformed(e.to_string()))?;
    let (calls, puts) = chain
        .records
        .data
        .iter()
        .fold((0.0, 0.0), |(c, p), row| {
            (
                c + row.call.as_ref().map_or(0.0, |l| l.open_interest),
                p + row.put.as_ref().map_or(0.0, |l| l.open_interest),
            )
        });
    if calls <= 0.0 {
        return Err(AdapterError::ZeroCallOpenInterest);
    }
    Ok((puts / calls * 100.0).round() / 100.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionChainSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for OptionChainSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPTION_CHAIN_URL.into(),
            timeout_secs: 15,
        }
    }
}

pub struct OptionChainClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl OptionChainClient {
    pub fn new(settings: &OptionChainSettings) -> Result<Self, AdapterError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn chain_url(&self, underlying: &str) -> String {
        format!(
            "{}/api/option-chain-indices?symbol={underlying}",
            self.base_url
        )
    }

    fn fetch_ratio(&self, underlying: &str) -> Result<f64, AdapterError> {
        let resp = self
            .client
            .get(self.chain_url(underlying))
            .header("accept", "application/json")
            .send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
            });
        }
        let body = resp.text()?;
        let ratio = put_call_ratio_from_chain(&body)?;
        debug!(underlying, ratio, "option chain fetched");
        Ok(ratio)
    }
}

impl PutCallSource for OptionChainClient {
    fn put_call_ratio(&self, subject: &str) -> Result<f64, Unavailable> {
        self.fetch_ratio(underlying_for(subject))
            .map_err(|e| e.unavailable(SignalField::PutCallRatio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_sums_all_strikes() {
        let json = r#"{"records":{"data":[
            {"strikePrice":47000,"CE":{"openInterest":100},"PE":{"openInterest":150}},
            {"strikePrice":47100,"CE":{"openInterest":200}},
            {"strikePrice":47200,"PE":{"openInterest":90}}
        ]}}"#;
        // 240 / 300
        assert_eq!(put_call_ratio_from_chain(json).unwrap(), 0.8);
    }

    #[test]
    fn ratio_rounds_to_two_decimals() {
        let json = r#"{"records":{"data":[
            {"CE":{"openInterest":3},"PE":{"openInterest":4}}
        ]}}"#;
        assert_eq!(put_call_ratio_from_chain(json).unwrap(), 1.33);
    }

    #[test]
    fn zero_calls_is_an_error() {
        let json = r#"{"records":{"data":[{"PE":{"openInterest":10}}]}}"#;
        assert!(matches!(
            put_call_ratio_from_chain(json),
            Err(AdapterError::ZeroCallOpenInterest)
        ));
        let empty = r#"{"records":{}}"#;
        assert!(put_call_ratio_from_chain(empty).is_err());
    }

    #[test]
    fn missing_records_is_malformed() {
        assert!(matches!(
            put_call_ratio_from_chain("{}"),
            Err(AdapterError::Malformed(_))
        ));
        assert!(put_call_ratio_from_chain("<html>").is_err());
    }

    #[test]
    fn underlying_selection() {
        assert_eq!(underlying_for("BANK NIFTY"), "BANKNIFTY");
        assert_eq!(underlying_for("HDFC Bank"), "BANKNIFTY");
        assert_eq!(underlying_for("NIFTY 50"), "NIFTY");
        assert_eq!(underlying_for("Infosys"), "NIFTY");
    }

    #[test]
    fn chain_url_format() {
        let client = OptionChainClient::new(&OptionChainSettings {
            base_url: "http://localhost/".into(),
            timeout_secs: 1,
        })
        .unwrap();
        assert_eq!(
            client.chain_url("NIFTY"),
            "http://localhost/api/option-chain-indices?symbol=NIFTY"
        );
    }
}
