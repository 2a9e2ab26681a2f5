//! Artifact export — per-bar CSV, JSON manifest, and a Markdown report.
//!
//! A run directory `{symbol}_{timestamp}/` holds:
//! - `signals.csv` — one row per bar with indicators, signal, position and growth
//! - `result.json` — metrics, external readings, fingerprint and warnings
//! - `report.md` — human-readable summary
//!
//! `result.json` carries a `schema_version`; newer versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use signallab_core::adapters::Unavailable;
use signallab_core::data::DataSource;
use signallab_core::signals::{ExternalSignals, ResolvedSignals, SignalCounts, ThresholdConfig};

use crate::analysis::{AnalysisContext, AnalysisResult, SCHEMA_VERSION};
use crate::metrics::PerformanceMetrics;
use crate::quote::QuoteSnapshot;

/// Everything in an [`AnalysisResult`] except the per-bar columns.
///
/// Per-bar data goes to `signals.csv`; raw indicator columns hold `NaN` during
/// warm-up, which JSON cannot represent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultManifest {
    pub schema_version: u32,
    pub context: AnalysisContext,
    pub source: DataSource,
    pub has_synthetic: bool,
    pub first_date: chrono::NaiveDate,
    pub last_date: chrono::NaiveDate,
    pub bars: usize,
    pub readings: ExternalSignals,
    pub unavailable: Vec<Unavailable>,
    pub resolved: ResolvedSignals,
    pub thresholds: ThresholdConfig,
    pub counts: SignalCounts,
    pub metrics: PerformanceMetrics,
    pub quote: QuoteSnapshot,
    pub fingerprint: String,
    pub generated_at: NaiveDateTime,
    pub summary: String,
    pub warnings: Vec<String>,
    pub trusted: bool,
}

impl ResultManifest {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let series = result.signaled.series();
        Self {
            schema_version: result.schema_version,
            context: result.context.clone(),
            source: result.source,
            has_synthetic: result.has_synthetic,
            first_date: series.first_date(),
            last_date: series.last_date(),
            bars: result.bar_count(),
            readings: result.readings,
            unavailable: result.unavailable.clone(),
            resolved: result.resolved.clone(),
            thresholds: *result.signaled.thresholds(),
            counts: result.signaled.counts(),
            metrics: result.metrics.clone(),
            quote: result.quote,
            fingerprint: result.fingerprint.as_str().to_string(),
            generated_at: result.generated_at,
            summary: result.summary.clone(),
            warnings: result.warnings.clone(),
            trusted: result.trusted,
        }
    }
}

// ─── JSON ───────────────────────────────────────────────────────────

pub fn export_json(result: &AnalysisResult) -> Result<String> {
    serde_json::to_string_pretty(&ResultManifest::from_result(result))
        .context("failed to serialize result manifest to JSON")
}

/// Parse a manifest, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<ResultManifest> {
    let manifest: ResultManifest =
        serde_json::from_str(json).context("failed to deserialize result manifest")?;
    if manifest.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}

// ─── CSV ────────────────────────────────────────────────────────────

/// Per-bar table. Indicator columns are the neutral-filled values the rule saw.
///
/// Columns: date, close, ema{span}, rsi{period}, adx{period}, signal, position,
/// strategy_growth, buy_hold_growth
pub fn export_signals_csv(result: &AnalysisResult) -> Result<String> {
    let signaled = &result.signaled;
    let params = signaled.frame().params();
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "date".to_string(),
        "close".to_string(),
        format!("ema{}", params.ema_span),
        format!("rsi{}", params.rsi_period),
        format!("adx{}", params.adx_period),
        "signal".to_string(),
        "position".to_string(),
        "strategy_growth".to_string(),
        "buy_hold_growth".to_string(),
    ])?;

    let strategy = result.backtest.strategy_growth();
    let buy_hold = result.backtest.buy_hold_growth();
    let rows = signaled
        .series()
        .bars()
        .iter()
        .zip(signaled.indicators())
        .zip(signaled.signals())
        .enumerate();
    for (i, ((bar, ind), signal)) in rows {
        wtr.write_record([
            bar.date.to_string(),
            format!("{:.4}", bar.close),
            format!("{:.4}", ind.ema),
            format!("{:.4}", ind.rsi),
            format!("{:.4}", ind.adx),
            signal.as_str().to_string(),
            result.backtest.position[i].to_string(),
            format!("{:.6}", strategy[i]),
            format!("{:.6}", buy_hold[i]),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Write `signals.csv`, `result.json` and `report.md` into a new run directory
/// under `output_dir` and return its path.
pub fn save_artifacts(result: &AnalysisResult, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        sanitize(&result.context.symbol),
        result.generated_at.format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("signals.csv"), export_signals_csv(result)?)?;
    std::fs::write(run_dir.join("result.json"), export_json(result)?)?;
    std::fs::write(run_dir.join("report.md"), generate_report(result))?;

    Ok(run_dir)
}

pub fn load_manifest(dir: &Path) -> Result<ResultManifest> {
    let path = dir.join("result.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

/// Tickers like `^NSEI` or `RELIANCE.NS` become `NSEI` / `RELIANCE_NS`.
fn sanitize(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| *c != '^')
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

// ─── Markdown ───────────────────────────────────────────────────────

pub fn generate_report(result: &AnalysisResult) -> String {
    let mut md = String::with_capacity(2048);
    let ctx = &result.context;
    let series = result.signaled.series();

    md.push_str(&format!("# {}\n\n", result.summary));

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Subject | {} |\n", ctx.subject));
    md.push_str(&format!("| Ticker | {} |\n", ctx.symbol));
    md.push_str(&format!(
        "| Period | {} to {} |\n",
        series.first_date(),
        series.last_date()
    ));
    md.push_str(&format!("| Bars | {} |\n", result.bar_count()));
    md.push_str(&format!("| Fingerprint | {} |\n", result.fingerprint));
    if result.has_synthetic {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    if !result.trusted {
        md.push_str("| Backtest | **UNTRUSTED** |\n");
    }
    md.push('\n');

    md.push_str("## Market Overview\n\n");
    md.push_str("| Input | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!(
        "| Last Price | {:.2} ({:+.2}) |\n",
        result.quote.last_price, result.quote.delta
    ));
    md.push_str(&format!(
        "| AI Sentiment | {} |\n",
        reading(result.readings.ai_sentiment.map(f64::from), 0)
    ));
    md.push_str(&format!(
        "| Volatility (VIX) | {} |\n",
        reading(result.readings.volatility_estimate, 2)
    ));
    md.push_str(&format!(
        "| Put/Call Ratio | {} |\n",
        reading(result.readings.put_call_ratio, 2)
    ));
    md.push('\n');

    let m = &result.metrics;
    md.push_str("## Performance Summary\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Strategy Return | {:.2}% |\n", m.total_return * 100.0));
    md.push_str(&format!("| Buy & Hold Return | {:.2}% |\n", m.buy_hold_return * 100.0));
    md.push_str(&format!("| Excess Return | {:.2}% |\n", m.excess_return * 100.0));
    md.push_str(&format!("| Max Drawdown | {:.2}% |\n", m.max_drawdown * 100.0));
    md.push_str(&format!("| Sharpe | {:.3} |\n", m.sharpe));
    md.push_str(&format!("| Sortino | {:.3} |\n", m.sortino));
    md.push_str(&format!("| Exposure | {:.1}% |\n", m.exposure * 100.0));
    md.push_str(&format!(
        "| Signals | {} buy / {} sell / {} hold |\n",
        m.buy_signals, m.sell_signals, m.hold_signals
    ));
    md.push('\n');

    if !result.warnings.is_empty() {
        md.push_str("## Warnings\n\n");
        for w in &result.warnings {
            md.push_str(&format!("- {w}\n"));
        }
        md.push('\n');
    }

    md
}

fn reading(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{v:.decimals$}"),
        None => "N/A".to_string(),
    }
}
