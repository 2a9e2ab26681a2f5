//! Session configuration loaded from TOML.
//!
//! ```toml
//! [thresholds]
//! ai_threshold = 50.0
//! vix_threshold = 17.0
//! pcr_threshold = 1.0
//!
//! [indicators]
//! ema_span = 20
//! rsi_period = 14
//! adx_period = 14
//!
//! [gemini]
//! api_key = ""
//! model_sentiment = "gemini-pro-latest"
//! model_signals = "gemini-flash-latest"
//! timeout_secs = 30
//!
//! [option_chain]
//! base_url = "https://www.nseindia.com"
//! timeout_secs = 15
//! ```
//!
//! Missing sections take their defaults.

use serde::{Deserialize, Serialize};
use signallab_core::adapters::{GeminiSettings, OptionChainSettings};
use signallab_core::indicators::IndicatorParams;
use signallab_core::signals::{ThresholdConfig, ThresholdError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable consulted when `[gemini].api_key` is empty.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "signallab.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid threshold: {0}")]
    Threshold(#[from] ThresholdError),

    #[error("{name} must be at least 1")]
    ZeroPeriod { name: &'static str },

    #[error("{name} must be at least 1 second")]
    ZeroTimeout { name: &'static str },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub thresholds: ThresholdConfig,
    pub indicators: IndicatorParams,
    pub gemini: GeminiSettings,
    pub option_chain: OptionChainSettings,
}

impl SessionConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn write_file(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;
        for (name, period) in [
            ("indicators.ema_span", self.indicators.ema_span),
            ("indicators.rsi_period", self.indicators.rsi_period),
            ("indicators.adx_period", self.indicators.adx_period),
        ] {
            if period == 0 {
                return Err(ConfigError::ZeroPeriod { name });
            }
        }
        if self.gemini.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout {
                name: "gemini.timeout_secs",
            });
        }
        if self.option_chain.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout {
                name: "option_chain.timeout_secs",
            });
        }
        Ok(())
    }

    /// Same config with thresholds replaced. Used for per-run overrides.
    pub fn with_thresholds(&self, thresholds: ThresholdConfig) -> Self {
        Self {
            thresholds,
            ..self.clone()
        }
    }

    /// Gemini settings with the API key taken from the environment when the file leaves it empty.
    pub fn gemini_settings(&self) -> GeminiSettings {
        let mut settings = self.gemini.clone();
        if settings.api_key.trim().is_empty() {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                settings.api_key = key;
            }
        }
        settings
    }
}
