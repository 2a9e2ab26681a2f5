//! Operator-configured thresholds for the signal rule.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ThresholdError {
    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f64 },

    #[error("{name} must be within {min}..={max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Thresholds the external readings are compared against.
///
/// Set once per session; immutable for the duration of one signal pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Sentiment threshold, 0–100.
    pub ai_threshold: f64,
    /// Volatility threshold, 0–40.
    pub vix_threshold: f64,
    /// Put/call ratio threshold, 0.5–2.0.
    pub pcr_threshold: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            ai_threshold: 50.0,
            vix_threshold: 17.0,
            pcr_threshold: 1.0,
        }
    }
}

impl ThresholdConfig {
    pub fn validate(&self) -> Result<(), ThresholdError> {
        check("ai_threshold", self.ai_threshold, 0.0, 100.0)?;
        check("vix_threshold", self.vix_threshold, 0.0, 40.0)?;
        check("pcr_threshold", self.pcr_threshold, 0.5, 2.0)?;
        Ok(())
    }
}

fn check(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), ThresholdError> {
    if !value.is_finite() {
        return Err(ThresholdError::NotFinite { name, value });
    }
    if value < min || value > max {
        return Err(ThresholdError::OutOfRange {
            name,
            value,
            min,
            max,
        });
    }
    Ok(())
}
