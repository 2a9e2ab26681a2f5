//! Ingest — raw provider bars to a validated [`PriceSeries`].
//!
//! Steps: keep bars inside the requested range, drop bars without a usable
//! close, fill blank open/high/low from the close, sort by date, collapse
//! duplicate dates (last one wins). Every dropped or repaired class is reported
//! as a warning.

use chrono::NaiveDate;
use tracing::warn;

use super::provider::{DataError, RawBar};
use crate::domain::{Bar, PriceSeries};

/// Validated series plus what was discarded on the way.
#[derive(Debug, Clone)]
pub struct IngestResult {
    pub series: PriceSeries,
    pub dropped_missing_close: usize,
    pub dropped_duplicates: usize,
    pub dropped_out_of_range: usize,
    pub repaired_bars: usize,
    pub insane_bars: usize,
    pub warnings: Vec<String>,
}

pub fn ingest(
    symbol: &str,
    raw: Vec<RawBar>,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<IngestResult, DataError> {
    let total = raw.len();
    let in_range: Vec<RawBar> = raw
        .into_iter()
        .filter(|b| b.date >= start && b.date <= end)
        .collect();
    let dropped_out_of_range = total - in_range.len();

    let before_close = in_range.len();
    let mut bars: Vec<Bar> = in_range
        .into_iter()
        .filter(|b| b.close.is_finite())
        .map(|b| Bar {
            date: b.date,
            open: b.open,
            high: b.high,
            low: b.low,
            close: b.close,
            volume: b.volume,
        })
        .collect();
    let dropped_missing_close = before_close - bars.len();

    let repaired_bars = bars.iter_mut().map(|b| repair_blank_ohlc(b)).filter(|r| *r).count();

    // Stable sort keeps provider order among equal dates, so the last one wins below.
    bars.sort_by_key(|b| b.date);
    let before_dedup = bars.len();
    let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match deduped.last_mut() {
            Some(last) if last.date == bar.date => *last = bar,
            _ => deduped.push(bar),
        }
    }
    let dropped_duplicates = before_dedup - deduped.len();

    if deduped.is_empty() {
        return Err(DataError::NoData {
            symbol: symbol.to_string(),
            start,
            end,
        });
    }

    let insane_bars = deduped.iter().filter(|b| !b.is_void() && !b.is_sane()).count();

    let mut warnings = Vec::new();
    if dropped_missing_close > 0 {
        warnings.push(format!(
            "{symbol}: dropped {dropped_missing_close} bar(s) with no close"
        ));
    }
    if repaired_bars > 0 {
        warnings.push(format!(
            "{symbol}: repaired {repaired_bars} bar(s) with blank OHLC"
        ));
    }
    if dropped_duplicates > 0 {
        warnings.push(format!(
            "{symbol}: collapsed {dropped_duplicates} duplicate date(s)"
        ));
    }
    if insane_bars > 0 {
        warnings.push(format!(
            "{symbol}: {insane_bars} bar(s) fail the OHLC sanity check"
        ));
    }
    for w in &warnings {
        warn!("{w}");
    }

    let series = PriceSeries::new(symbol, deduped)
        .map_err(|e| DataError::Other(format!("ingest produced an invalid series: {e}")))?;

    Ok(IngestResult {
        series,
        dropped_missing_close,
        dropped_duplicates,
        dropped_out_of_range,
        repaired_bars,
        insane_bars,
        warnings,
    })
}

/// Fill non-finite open/high/low from the close. Returns true if anything changed.
///
/// A blank high or low would otherwise poison true range and the Wilder
/// smoothing behind ADX for every later bar.
fn repair_blank_ohlc(bar: &mut Bar) -> bool {
    let mut repaired = false;
    if !bar.open.is_finite() {
        bar.open = bar.close;
        repaired = true;
    }
    if !bar.high.is_finite() {
        bar.high = bar.open.max(bar.close);
        repaired = true;
    }
    if !bar.low.is_finite() {
        bar.low = bar.open.min(bar.close);
        repaired = true;
    }
    repaired
}
