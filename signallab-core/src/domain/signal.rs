//! Categorical per-bar trading signal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete decision for a single bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl Signal {
    /// Position held on the bar *after* this signal is observed.
    pub fn position(self) -> i8 {
        match self {
            Signal::Buy => 1,
            Signal::Sell => -1,
            Signal::Hold => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_mapping() {
        assert_eq!(Signal::Buy.position(), 1);
        assert_eq!(Signal::Sell.position(), -1);
        assert_eq!(Signal::Hold.position(), 0);
    }

    #[test]
    fn serializes_as_upper_case_label() {
        assert_eq!(serde_json::to_string(&Signal::Buy).unwrap(), "\"BUY\"");
        let s: Signal = serde_json::from_str("\"SELL\"").unwrap();
        assert_eq!(s, Signal::Sell);
        assert_eq!(Signal::Hold.to_string(), "HOLD");
    }
}
