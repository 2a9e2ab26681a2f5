//! Price loading for one analysis run.
//!
//! Fallback policy:
//! 1. If a provider is given and available → fetch and ingest
//! 2. If that yields nothing and `synthetic` is set → generate synthetic bars (tagged)
//! 3. Otherwise → fail with a clear error
//!
//! Synthetic data is a developer-only debug mode. Results produced on it are
//! tagged so they are never mistaken for market data.

use chrono::{Datelike, NaiveDate};
use signallab_core::data::{ingest, DataError, DataProvider, DataSource, RawBar};
use signallab_core::domain::PriceSeries;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no price data for '{symbol}' between {start} and {end}")]
    NoData {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("no price provider for '{symbol}' (use --synthetic for synthetic data)")]
    NoProvider { symbol: String },

    #[error("fetching '{symbol}' failed: {source}")]
    Fetch { symbol: String, source: DataError },

    #[error("start date {start} is after end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// Options controlling how bars are loaded.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Generate synthetic bars when real data is unavailable.
    pub synthetic: bool,
}

/// Result of loading, including provenance.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub series: PriceSeries,
    pub source: DataSource,
    pub has_synthetic: bool,
    pub warnings: Vec<String>,
}

/// Load a validated series for one symbol.
pub fn load_series(
    symbol: &str,
    provider: Option<&dyn DataProvider>,
    opts: &LoadOptions,
) -> Result<LoadedData, LoadError> {
    if opts.start > opts.end {
        return Err(LoadError::InvertedRange {
            start: opts.start,
            end: opts.end,
        });
    }

    let mut warnings = Vec::new();
    let failure = match provider {
        Some(prov) if prov.is_available() => {
            match fetch_and_ingest(prov, symbol, opts) {
                Ok((series, source, mut ingest_warnings)) => {
                    warnings.append(&mut ingest_warnings);
                    debug!(symbol, bars = series.len(), provider = prov.name(), "series loaded");
                    return Ok(LoadedData {
                        series,
                        source,
                        has_synthetic: false,
                        warnings,
                    });
                }
                Err(e) => e,
            }
        }
        Some(prov) => LoadError::Fetch {
            symbol: symbol.to_string(),
            source: DataError::Other(format!("provider {} is unavailable", prov.name())),
        },
        None => LoadError::NoProvider {
            symbol: symbol.to_string(),
        },
    };

    if !opts.synthetic {
        return Err(failure);
    }

    let msg = format!("{failure}; using synthetic data for {symbol}");
    warn!("{msg}");
    warnings.push(msg);

    let raw = generate_synthetic_bars(symbol, opts.start, opts.end);
    let ingested = ingest(symbol, raw, opts.start, opts.end).map_err(|_| LoadError::NoData {
        symbol: symbol.to_string(),
        start: opts.start,
        end: opts.end,
    })?;
    Ok(LoadedData {
        series: ingested.series,
        source: DataSource::Synthetic,
        has_synthetic: true,
        warnings,
    })
}

fn fetch_and_ingest(
    provider: &dyn DataProvider,
    symbol: &str,
    opts: &LoadOptions,
) -> Result<(PriceSeries, DataSource, Vec<String>), LoadError> {
    let fetched = provider
        .fetch(symbol, opts.start, opts.end)
        .map_err(|e| classify(symbol, opts, e))?;
    let ingested =
        ingest(symbol, fetched.bars, opts.start, opts.end).map_err(|e| classify(symbol, opts, e))?;
    Ok((ingested.series, fetched.source, ingested.warnings))
}

fn classify(symbol: &str, opts: &LoadOptions, err: DataError) -> LoadError {
    match err {
        DataError::NoData { .. } | DataError::SymbolNotFound { .. } => LoadError::NoData {
            symbol: symbol.to_string(),
            start: opts.start,
            end: opts.end,
        },
        source => LoadError::Fetch {
            symbol: symbol.to_string(),
            source,
        },
    }
}

/// Generate synthetic weekday bars for testing/development.
///
/// Random walk from 100.0, seeded from the symbol name so the same symbol and
/// range always give the same bars.
pub fn generate_synthetic_bars(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<RawBar> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut bars = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;

    while current <= end {
        let weekday = current.weekday();
        if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
            current += chrono::Duration::days(1);
            continue;
        }

        let daily_return: f64 = rng.gen_range(-0.03..0.03);
        let open = price;
        let close = price * (1.0 + daily_return);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
        let volume = rng.gen_range(500_000..5_000_000u64);

        bars.push(RawBar {
            date: current,
            open,
            high,
            low,
            close,
            volume,
        });

        price = close;
        current += chrono::Duration::days(1);
    }

    bars
}
