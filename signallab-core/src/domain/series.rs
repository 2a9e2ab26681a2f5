//! PriceSeries — validated, time-ordered bar history for one symbol.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Bar;

/// Reasons a bar list cannot become a [`PriceSeries`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("price series for '{symbol}' is empty")]
    Empty { symbol: String },

    #[error("bar {index} ({date}) is not after the previous bar")]
    NotIncreasing { index: usize, date: NaiveDate },

    #[error("bar {index} ({date}) has no usable close")]
    MissingClose { index: usize, date: NaiveDate },
}

/// Time-ordered bars for a single symbol.
///
/// Invariants (checked in [`PriceSeries::new`]):
/// - at least one bar
/// - dates strictly increasing, so no duplicates
/// - every close is finite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();
        if bars.is_empty() {
            return Err(SeriesError::Empty { symbol });
        }
        for (i, bar) in bars.iter().enumerate() {
            if !bar.close.is_finite() {
                return Err(SeriesError::MissingClose {
                    index: i,
                    date: bar.date,
                });
            }
            if i > 0 && bar.date <= bars[i - 1].date {
                return Err(SeriesError::NotIncreasing {
                    index: i,
                    date: bar.date,
                });
            }
        }
        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; present for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.bars[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.bars[self.bars.len() - 1].date
    }

    pub fn last(&self) -> &Bar {
        &self.bars[self.bars.len() - 1]
    }
}
