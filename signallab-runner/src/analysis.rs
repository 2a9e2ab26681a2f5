//! Analysis pipeline — one run from symbol to backtest.
//!
//! load series → FatalInput check → indicators → concurrent adapters →
//! neutral defaults → signals → backtest → metrics.
//!
//! Only a missing or empty price series aborts a run. Every other failure is
//! soft: it is logged, recorded in `warnings`, and replaced by a default.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use signallab_core::adapters::{SignalSources, Unavailable};
use signallab_core::backtest::{run_backtest, BacktestResult};
use signallab_core::data::{DataProvider, DataSource};
use signallab_core::fingerprint::{fingerprint_inputs, InputFingerprint};
use signallab_core::indicators::{IndicatorFrame, IndicatorParams};
use signallab_core::signals::{
    generate_signals, ExternalSignals, ResolvedSignals, SignaledSeries, ThresholdConfig,
    ThresholdError,
};

use crate::catalog::Instrument;
use crate::config::SessionConfig;
use crate::data_loader::{load_series, LoadError, LoadOptions};
use crate::external::fetch_readings;
use crate::metrics::PerformanceMetrics;
use crate::quote::QuoteSnapshot;

/// Current schema version for exported results.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No usable price data: the only hard stop of a run.
    #[error("no price data for '{symbol}' between {start} and {end}")]
    NoData {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("data error: {0}")]
    Load(LoadError),

    #[error("invalid thresholds: {0}")]
    Thresholds(#[from] ThresholdError),

    #[error("{name} must be at least 1")]
    ZeroPeriod { name: &'static str },
}

impl From<LoadError> for AnalysisError {
    fn from(e: LoadError) -> Self {
        match e {
            LoadError::NoData { symbol, start, end } => Self::NoData { symbol, start, end },
            other => Self::Load(other),
        }
    }
}

/// Inputs of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisContext {
    pub symbol: String,
    /// Human-readable subject passed to the sentiment and option-chain adapters.
    pub subject: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub thresholds: ThresholdConfig,
    pub indicators: IndicatorParams,
    /// Fall back to synthetic bars when no real data can be loaded.
    pub allow_synthetic: bool,
}

impl AnalysisContext {
    pub fn new(instrument: &Instrument, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbol: instrument.ticker.clone(),
            subject: instrument.name.clone(),
            start,
            end,
            thresholds: ThresholdConfig::default(),
            indicators: IndicatorParams::default(),
            allow_synthetic: false,
        }
    }

    /// Thresholds and indicator periods from the session config.
    pub fn with_config(mut self, config: &SessionConfig) -> Self {
        self.thresholds = config.thresholds;
        self.indicators = config.indicators;
        self
    }

    pub fn with_synthetic(mut self, allow: bool) -> Self {
        self.allow_synthetic = allow;
        self
    }

    fn validate(&self) -> Result<(), AnalysisError> {
        self.thresholds.validate()?;
        for (name, period) in [
            ("ema_span", self.indicators.ema_span),
            ("rsi_period", self.indicators.rsi_period),
            ("adx_period", self.indicators.adx_period),
        ] {
            if period == 0 {
                return Err(AnalysisError::ZeroPeriod { name });
            }
        }
        Ok(())
    }
}

/// Complete result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub context: AnalysisContext,
    pub source: DataSource,
    pub has_synthetic: bool,
    /// Readings as returned; `None` where the adapter was unavailable.
    pub readings: ExternalSignals,
    pub unavailable: Vec<Unavailable>,
    /// Readings after neutral defaults; `resolved.defaulted` lists substituted fields.
    pub resolved: ResolvedSignals,
    pub signaled: SignaledSeries,
    pub backtest: BacktestResult,
    pub metrics: PerformanceMetrics,
    pub quote: QuoteSnapshot,
    pub fingerprint: InputFingerprint,
    pub generated_at: NaiveDateTime,
    pub summary: String,
    pub warnings: Vec<String>,
    /// False when the series is too short for a meaningful backtest.
    pub trusted: bool,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl AnalysisResult {
    pub fn bar_count(&self) -> usize {
        self.signaled.len()
    }
}

/// Run one analysis, stamped with the local wall-clock time.
pub fn run_analysis(
    ctx: &AnalysisContext,
    provider: Option<&dyn DataProvider>,
    sources: SignalSources<'_>,
) -> Result<AnalysisResult, AnalysisError> {
    run_analysis_at(ctx, provider, sources, chrono::Local::now().naive_local())
}

/// Run one analysis with an explicit timestamp. Pure apart from provider and adapter I/O.
pub fn run_analysis_at(
    ctx: &AnalysisContext,
    provider: Option<&dyn DataProvider>,
    sources: SignalSources<'_>,
    now: NaiveDateTime,
) -> Result<AnalysisResult, AnalysisError> {
    ctx.validate()?;

    let opts = LoadOptions {
        start: ctx.start,
        end: ctx.end,
        synthetic: ctx.allow_synthetic,
    };
    let loaded = load_series(&ctx.symbol, provider, &opts)?;
    let mut warnings = loaded.warnings;
    let series = loaded.series;
    debug!(symbol = %ctx.symbol, bars = series.len(), source = ?loaded.source, "series ready");

    let quote = QuoteSnapshot::from_series(&series);
    let frame = IndicatorFrame::compute(series, ctx.indicators);
    let undefined = frame.undefined_bars();
    if undefined > 0 {
        debug!(undefined, "bars with undefined RSI/ADX will be neutral-filled");
    }

    let readings = fetch_readings(&ctx.subject, sources);
    let unavailable: Vec<Unavailable> = readings.failures().into_iter().cloned().collect();
    let external = readings.to_external();

    let signaled = generate_signals(frame, &external, &ctx.thresholds);
    let resolved = signaled.external().clone();
    for field in &resolved.defaulted {
        let reason = unavailable
            .iter()
            .find(|u| u.field == *field)
            .map(|u| u.reason.clone())
            .unwrap_or_else(|| "out of range".to_string());
        let msg = format!(
            "{field} unavailable ({reason}); using default value {}",
            field.neutral()
        );
        warn!("{msg}");
        warnings.push(msg);
    }

    let backtest = run_backtest(&signaled);
    let trusted = signaled.len() >= 2;
    if !trusted {
        let msg = format!(
            "only {} bar(s) for {}; backtest is degenerate",
            signaled.len(),
            ctx.symbol
        );
        warn!("{msg}");
        warnings.push(msg);
    }

    let metrics = PerformanceMetrics::compute(&backtest, signaled.counts());
    let fingerprint = fingerprint_inputs(
        signaled.series(),
        &ctx.indicators,
        &external,
        &ctx.thresholds,
    );
    let summary = format!(
        "Analysis generated for {} at {}",
        ctx.subject,
        now.format("%H:%M:%S")
    );
    info!(
        symbol = %ctx.symbol,
        total_return = backtest.total_return,
        buy_hold = backtest.buy_hold_total_return,
        fingerprint = fingerprint.short(),
        "{summary}"
    );

    Ok(AnalysisResult {
        schema_version: SCHEMA_VERSION,
        context: ctx.clone(),
        source: loaded.source,
        has_synthetic: loaded.has_synthetic,
        readings: external,
        unavailable,
        resolved,
        signaled,
        backtest,
        metrics,
        quote,
        fingerprint,
        generated_at: now,
        summary,
        warnings,
        trusted,
    })
}

/// Session state: the active config and the most recent result.
///
/// A value type: updates return a new cache and the latest write wins.
#[derive(Debug, Clone, Default)]
pub struct SessionCache {
    config: SessionConfig,
    last_result: Option<Arc<AnalysisResult>>,
}

impl SessionCache {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            last_result: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn last_result(&self) -> Option<&AnalysisResult> {
        self.last_result.as_deref()
    }

    pub fn with_result(&self, result: AnalysisResult) -> Self {
        Self {
            config: self.config.clone(),
            last_result: Some(Arc::new(result)),
        }
    }

    /// New config; the cached result is kept until the next run replaces it.
    pub fn with_config(&self, config: SessionConfig) -> Self {
        Self {
            config,
            last_result: self.last_result.clone(),
        }
    }
}
